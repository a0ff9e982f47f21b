//! Counter-query adapter for hosts without a proc filesystem.
//!
//! The native counter facility (PDH on Windows) is modeled as a black box
//! behind [`CounterSource`]: hand it query strings, get raw `u64` counter
//! values back. The adapter owns the mapping from query results onto the
//! same snapshot types the proc collectors produce, so it stays pure and
//! testable without the native facility.

use std::collections::HashMap;

use crate::collector::error::CollectError;
use crate::model::{Cpu, DiskIo, Swap};

/// Black-box access to the platform's counter facility.
pub trait CounterSource {
    /// Resolves each query to its current raw counter value, in query order.
    fn query_raw(&self, queries: &[&str]) -> Result<Vec<u64>, CollectError>;

    /// Resolves wildcard queries per instance: instance name to the raw
    /// values of each query, in query order.
    fn query_raw_instances(
        &self,
        queries: &[&str],
    ) -> Result<HashMap<String, Vec<u64>>, CollectError>;
}

const CPU_QUERIES: [&str; 4] = [
    r"\Processor(_Total)\% Idle Time",
    r"\Processor(_Total)\% User Time",
    r"\Processor(_Total)\% Privileged Time",
    r"\Processor(_Total)\% Interrupt Time",
];

const CPU_CORE_QUERIES: [&str; 4] = [
    r"\Processor(*)\% Idle Time",
    r"\Processor(*)\% User Time",
    r"\Processor(*)\% Privileged Time",
    r"\Processor(*)\% Interrupt Time",
];

const SWAP_QUERIES: [&str; 2] = [r"\Memory\Committed Bytes", r"\Memory\Commit Limit"];

const DISK_QUERIES: [&str; 6] = [
    r"\PhysicalDisk(*)\Disk Reads/sec",
    r"\PhysicalDisk(*)\Disk Read Bytes/sec",
    r"\PhysicalDisk(*)\% Disk Read Time",
    r"\PhysicalDisk(*)\Disk Writes/sec",
    r"\PhysicalDisk(*)\Disk Write Bytes/sec",
    r"\PhysicalDisk(*)\% Disk Write Time",
];

// Raw time counters come back in 100ns units.
const HUNDRED_NS_PER_MS: u64 = 10_000;

/// Maps counter queries onto the proc-shaped snapshot types.
pub struct CounterAdapter<C: CounterSource> {
    source: C,
}

impl<C: CounterSource> CounterAdapter<C> {
    pub fn new(source: C) -> Self {
        Self { source }
    }

    fn expect_len(values: &[u64], want: usize, what: &str) -> Result<(), CollectError> {
        if values.len() < want {
            return Err(CollectError::Parse(format!(
                "{what}: expected {want} counter values, got {}",
                values.len()
            )));
        }
        Ok(())
    }

    /// Aggregate CPU time counters. Only the idle, user, kernel and
    /// interrupt buckets exist here; the remaining fields stay zero.
    pub fn collect_cpu(&self) -> Result<Cpu, CollectError> {
        let values = self.source.query_raw(&CPU_QUERIES)?;
        Self::expect_len(&values, CPU_QUERIES.len(), "cpu")?;
        Ok(Cpu {
            idle: values[0],
            user: values[1],
            sys: values[2],
            irq: values[3],
            ..Cpu::default()
        })
    }

    /// Per-core CPU time counters.
    ///
    /// Instance names are core indices plus a `_Total` aggregate; the
    /// aggregate and any non-numeric instance are skipped.
    pub fn collect_cpu_list(&self) -> Result<Vec<Cpu>, CollectError> {
        let instances = self.source.query_raw_instances(&CPU_CORE_QUERIES)?;

        let mut cpus = Vec::new();
        for (instance, values) in &instances {
            let Ok(index) = instance.parse::<usize>() else {
                continue;
            };
            Self::expect_len(values, CPU_CORE_QUERIES.len(), "cpu core")?;
            if cpus.len() <= index {
                cpus.resize(index + 1, Cpu::default());
            }
            cpus[index] = Cpu {
                idle: values[0],
                user: values[1],
                sys: values[2],
                irq: values[3],
                ..Cpu::default()
            };
        }
        Ok(cpus)
    }

    /// Swap summary from the commit charge counters.
    pub fn collect_swap(&self) -> Result<Swap, CollectError> {
        let values = self.source.query_raw(&SWAP_QUERIES)?;
        Self::expect_len(&values, SWAP_QUERIES.len(), "swap")?;
        let used = values[0];
        let total = values[1];
        Ok(Swap {
            total,
            used,
            free: total.wrapping_sub(used),
        })
    }

    /// Per-disk I/O counters keyed by instance name.
    pub fn collect_disk_io(&self) -> Result<HashMap<String, DiskIo>, CollectError> {
        let instances = self.source.query_raw_instances(&DISK_QUERIES)?;

        let mut disks = HashMap::new();
        for (instance, values) in &instances {
            if instance == "_Total" {
                continue;
            }
            Self::expect_len(values, DISK_QUERIES.len(), "disk")?;
            let read_time_ms = values[2] / HUNDRED_NS_PER_MS;
            let write_time_ms = values[5] / HUNDRED_NS_PER_MS;
            disks.insert(
                instance.clone(),
                DiskIo {
                    read_ops: values[0],
                    read_bytes: values[1],
                    read_time_ms,
                    write_ops: values[3],
                    write_bytes: values[4],
                    write_time_ms,
                    io_time_ms: values[2].wrapping_add(values[5]) / HUNDRED_NS_PER_MS,
                },
            );
        }
        Ok(disks)
    }

    /// The counter facility has no connection table surface.
    pub fn collect_connections(&self) -> Result<Vec<crate::model::NetConn>, CollectError> {
        Err(CollectError::Unsupported("connection tables"))
    }
}
