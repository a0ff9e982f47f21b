//! Per-process snapshot types decoded from `/proc/<pid>`.

use serde::{Deserialize, Serialize};

/// Scheduler state letter from field 3 of `/proc/<pid>/stat`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub enum RunState {
    Running,
    Sleeping,
    /// Uninterruptible disk sleep.
    DiskSleep,
    Stopped,
    Zombie,
    #[default]
    Unknown,
}

impl RunState {
    pub fn from_letter(letter: char) -> RunState {
        match letter {
            'R' => RunState::Running,
            'S' => RunState::Sleeping,
            'D' => RunState::DiskSleep,
            'T' => RunState::Stopped,
            'Z' => RunState::Zombie,
            _ => RunState::Unknown,
        }
    }
}

/// Identity and scheduling snapshot from `/proc/<pid>/stat`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct ProcState {
    pub pid: u32,
    /// Command name, without the surrounding parentheses.
    pub name: String,
    pub state: RunState,
    pub ppid: u32,
    /// Controlling terminal device number; -1 when none.
    pub tty: i64,
    pub priority: i64,
    pub nice: i64,
    /// CPU the task last ran on.
    pub processor: u64,
}

/// Memory snapshot combining `/proc/<pid>/statm` and fault counters from
/// `/proc/<pid>/stat`. Sizes are bytes.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct ProcMem {
    pub size: u64,
    pub resident: u64,
    pub share: u64,
    pub minor_faults: u64,
    pub major_faults: u64,
    /// `minor_faults + major_faults`.
    pub page_faults: u64,
}

/// CPU time snapshot from `/proc/<pid>/stat`, in milliseconds.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct ProcTime {
    /// Process start, milliseconds since the Unix epoch.
    pub start_time: u64,
    pub user: u64,
    pub sys: u64,
    /// `user + sys`.
    pub total: u64,
}

/// Accumulated I/O counters from `/proc/<pid>/io`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct ProcIo {
    pub read_ops: u64,
    pub write_ops: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Executable path and key directories resolved from `/proc/<pid>` symlinks.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct ProcExe {
    pub name: String,
    pub cwd: String,
    pub root: String,
}
