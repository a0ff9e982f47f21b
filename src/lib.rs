//! hoststat — host telemetry sampling core.
//!
//! Decodes the Linux proc filesystem into typed snapshots:
//! - `model` — the snapshot value types (CPU, memory, disks, network,
//!   processes), all serde-serializable
//! - `collector` — the `SystemCollector`/`ProcessCollector` pair over an
//!   abstract `FileSystem`, plus the counter-query adapter for hosts
//!   without `/proc`
//! - `sampler` — a background thread turning raw CPU counters into
//!   per-interval deltas
//! - `config` — filesystem roots and tick/boot-time constants
//!
//! Everything is fetch-on-demand; the library holds no caches and spawns no
//! threads except the explicit sampler.

pub mod collector;
pub mod config;
pub mod model;
pub mod sampler;

pub use collector::{
    CollectError, CounterAdapter, CounterSource, FileSystem, MockFs, ProcessCollector, RealFs,
    SystemCollector,
};
pub use config::ProbeConfig;
pub use sampler::collect_cpu_samples;
