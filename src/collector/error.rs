//! Error types shared by all collectors.

use std::error::Error;
use std::fmt;
use std::io;

/// Failure while fetching a snapshot.
#[derive(Debug)]
pub enum CollectError {
    /// The underlying file could not be read.
    Io(io::Error),
    /// The file was read but its content did not match the expected shape.
    Parse(String),
    /// A per-pid file vanished mid-read; the process exited.
    ProcessGone(u32),
    /// The operation has no implementation on this data source.
    Unsupported(&'static str),
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::Io(err) => write!(f, "io error: {err}"),
            CollectError::Parse(message) => write!(f, "parse error: {message}"),
            CollectError::ProcessGone(pid) => write!(f, "process {pid} no longer exists"),
            CollectError::Unsupported(what) => write!(f, "unsupported operation: {what}"),
        }
    }
}

impl Error for CollectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CollectError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CollectError {
    fn from(err: io::Error) -> Self {
        CollectError::Io(err)
    }
}

impl From<crate::collector::procfs::parser::ParseError> for CollectError {
    fn from(err: crate::collector::procfs::parser::ParseError) -> Self {
        CollectError::Parse(err.message)
    }
}

impl CollectError {
    /// Wraps an io error for pid-scoped reads. `NotFound` means the
    /// process exited between enumeration and read.
    pub fn for_pid(err: io::Error, pid: u32) -> CollectError {
        if err.kind() == io::ErrorKind::NotFound {
            CollectError::ProcessGone(pid)
        } else {
            CollectError::Io(err)
        }
    }
}
