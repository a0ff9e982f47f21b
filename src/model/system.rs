//! System-wide counter snapshots decoded from `/proc` and `/etc`.
//!
//! Every type here is an immutable value snapshot: one fetch call builds one
//! value, and nothing is cached between calls.

use serde::{Deserialize, Serialize};

/// Aggregate or per-core CPU time counters from `/proc/stat`.
///
/// All fields are cumulative clock ticks since boot. On platforms backed by
/// rate counters they count from counter reset instead; either way the fields
/// only make sense relative to another sample from the same source.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct Cpu {
    /// Time spent in user mode.
    pub user: u64,
    /// Time spent in user mode at low priority.
    pub nice: u64,
    /// Time spent in kernel mode.
    pub sys: u64,
    /// Time spent idle.
    pub idle: u64,
    /// Time waiting for I/O completion.
    pub wait: u64,
    /// Time servicing hardware interrupts.
    pub irq: u64,
    /// Time servicing software interrupts.
    pub softirq: u64,
    /// Time stolen by the hypervisor.
    pub stolen: u64,
    /// Time running a guest OS. Only reported by 2.6+ kernels; zero elsewhere.
    pub guest: u64,
}

impl Cpu {
    /// Sum of all counter fields. Wraps rather than panics on garbled
    /// counter values.
    pub fn total(&self) -> u64 {
        [
            self.user,
            self.nice,
            self.sys,
            self.idle,
            self.wait,
            self.irq,
            self.softirq,
            self.stolen,
            self.guest,
        ]
        .iter()
        .fold(0u64, |acc, field| acc.wrapping_add(*field))
    }

    /// Field-wise subtraction of `other` from `self`.
    ///
    /// Only meaningful when `other` was taken from the same source, earlier
    /// in time. Subtracting a later sample from an earlier one wraps instead
    /// of failing; ordering is the caller's responsibility.
    pub fn delta(&self, other: &Cpu) -> Cpu {
        Cpu {
            user: self.user.wrapping_sub(other.user),
            nice: self.nice.wrapping_sub(other.nice),
            sys: self.sys.wrapping_sub(other.sys),
            idle: self.idle.wrapping_sub(other.idle),
            wait: self.wait.wrapping_sub(other.wait),
            irq: self.irq.wrapping_sub(other.irq),
            softirq: self.softirq.wrapping_sub(other.softirq),
            stolen: self.stolen.wrapping_sub(other.stolen),
            guest: self.guest.wrapping_sub(other.guest),
        }
    }
}

/// Physical memory summary from `/proc/meminfo`, in bytes.
///
/// `actual_free`/`actual_used` net out reclaimable kernel buffer and page
/// cache memory, which the kernel will hand back under pressure.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct Mem {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    /// `free + buffers + cached`.
    pub actual_free: u64,
    /// `used - (buffers + cached)`.
    pub actual_used: u64,
}

/// Swap summary from `/proc/meminfo`, in bytes. `used + free == total`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct Swap {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

/// Load averages from `/proc/loadavg`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

/// Per-device I/O counters from `/proc/diskstats`.
///
/// Byte counts are already scaled from 512-byte sectors. Time counters are
/// milliseconds spent on the respective operation class.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct DiskIo {
    pub read_ops: u64,
    pub read_bytes: u64,
    pub read_time_ms: u64,
    pub write_ops: u64,
    pub write_bytes: u64,
    pub write_time_ms: u64,
    /// Total time the device had I/O in flight.
    pub io_time_ms: u64,
}

impl DiskIo {
    /// Field-wise subtraction; same ordering caveat as [`Cpu::delta`].
    pub fn delta(&self, other: &DiskIo) -> DiskIo {
        DiskIo {
            read_ops: self.read_ops.wrapping_sub(other.read_ops),
            read_bytes: self.read_bytes.wrapping_sub(other.read_bytes),
            read_time_ms: self.read_time_ms.wrapping_sub(other.read_time_ms),
            write_ops: self.write_ops.wrapping_sub(other.write_ops),
            write_bytes: self.write_bytes.wrapping_sub(other.write_bytes),
            write_time_ms: self.write_time_ms.wrapping_sub(other.write_time_ms),
            io_time_ms: self.io_time_ms.wrapping_sub(other.io_time_ms),
        }
    }
}

/// One mounted filesystem row from `/etc/mtab`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct MountEntry {
    pub dev_name: String,
    pub dir_name: String,
    pub sys_type_name: String,
    pub options: String,
}

/// OS distribution description from the release files under `/etc`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct Distribution {
    pub description: String,
}
