//! Snapshot collection over an abstract filesystem.
//!
//! Two collectors cover the proc filesystem (`SystemCollector` for
//! host-wide files, `ProcessCollector` for `/proc/<pid>`), both generic
//! over the [`FileSystem`] trait so tests can substitute [`MockFs`] and run
//! anywhere. Hosts without a proc filesystem go through the counter-query
//! adapter in [`counters`] instead.

pub mod counters;
pub mod error;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use counters::{CounterAdapter, CounterSource};
pub use error::CollectError;
pub use mock::MockFs;
pub use procfs::{ProcessCollector, SystemCollector};
pub use traits::{FileSystem, RealFs, read_lines};
