//! Decoders and collectors for the proc filesystem.

pub mod net;
pub mod parser;
pub mod process;
pub mod system;

pub use parser::ParseError;
pub use process::ProcessCollector;
pub use system::SystemCollector;
