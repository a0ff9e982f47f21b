//! Per-process collector over `/proc/<pid>`.

use std::path::PathBuf;

use crate::collector::error::CollectError;
use crate::collector::procfs::parser::{
    STAT_MAJFLT, STAT_MINFLT, STAT_NICE, STAT_PPID, STAT_PRIORITY, STAT_PROCESSOR, STAT_STARTTIME,
    STAT_STIME, STAT_TTY, STAT_UTIME, StatRecord, parse_cmdline, parse_proc_io, parse_stat_record,
    parse_statm,
};
use crate::collector::traits::FileSystem;
use crate::config::ProbeConfig;
use crate::model::{ProcExe, ProcIo, ProcMem, ProcState, ProcTime, RunState};

/// Fetches per-pid snapshots through a [`FileSystem`].
///
/// Processes exit at any time; a pid-scoped read that comes back `NotFound`
/// surfaces as [`CollectError::ProcessGone`] so callers can drop the pid
/// instead of treating it as a host failure.
pub struct ProcessCollector<F: FileSystem> {
    fs: F,
    config: ProbeConfig,
}

impl<F: FileSystem> ProcessCollector<F> {
    pub fn new(fs: F, config: ProbeConfig) -> Self {
        Self { fs, config }
    }

    /// Enumerates the numeric entries of the proc root, sorted.
    pub fn collect_pids(&self) -> Result<Vec<u32>, CollectError> {
        let mut pids: Vec<u32> = self
            .fs
            .read_dir(&self.config.proc_root)?
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    fn pid_path(&self, pid: u32, name: &str) -> PathBuf {
        self.config.proc_root.join(pid.to_string()).join(name)
    }

    fn read_pid_file(&self, pid: u32, name: &str) -> Result<String, CollectError> {
        self.fs
            .read_to_string(&self.pid_path(pid, name))
            .map_err(|err| CollectError::for_pid(err, pid))
    }

    fn stat_record(&self, pid: u32) -> Result<StatRecord, CollectError> {
        let content = self.read_pid_file(pid, "stat")?;
        Ok(parse_stat_record(&content)?)
    }

    /// Identity and scheduling snapshot from `/proc/<pid>/stat`.
    pub fn collect_state(&self, pid: u32) -> Result<ProcState, CollectError> {
        let record = self.stat_record(pid)?;
        Ok(ProcState {
            pid: record.pid,
            state: RunState::from_letter(record.state_letter()),
            ppid: record.field_u64(STAT_PPID) as u32,
            tty: record.field_i64(STAT_TTY),
            priority: record.field_i64(STAT_PRIORITY),
            nice: record.field_i64(STAT_NICE),
            processor: record.field_u64(STAT_PROCESSOR),
            name: record.name,
        })
    }

    /// Memory snapshot from `/proc/<pid>/statm` plus the fault counters of
    /// `/proc/<pid>/stat`.
    pub fn collect_memory(&self, pid: u32) -> Result<ProcMem, CollectError> {
        let statm = self.read_pid_file(pid, "statm")?;
        let (size, resident, share) = parse_statm(&statm)?;

        let record = self.stat_record(pid)?;
        let minor_faults = record.field_u64(STAT_MINFLT);
        let major_faults = record.field_u64(STAT_MAJFLT);

        Ok(ProcMem {
            size,
            resident,
            share,
            minor_faults,
            major_faults,
            page_faults: minor_faults.wrapping_add(major_faults),
        })
    }

    /// CPU time snapshot in milliseconds.
    ///
    /// Tick counters scale by `1000 / clock_ticks`; start time anchors on
    /// the boot time carried in the configuration.
    pub fn collect_time(&self, pid: u32) -> Result<ProcTime, CollectError> {
        let record = self.stat_record(pid)?;
        let ticks_to_ms = 1000 / self.config.clock_ticks;

        let user = record.field_u64(STAT_UTIME).wrapping_mul(ticks_to_ms);
        let sys = record.field_u64(STAT_STIME).wrapping_mul(ticks_to_ms);
        let start_time = (record.field_u64(STAT_STARTTIME) / self.config.clock_ticks)
            .wrapping_add(self.config.boot_time)
            .wrapping_mul(1000);

        Ok(ProcTime {
            start_time,
            user,
            sys,
            total: user.wrapping_add(sys),
        })
    }

    /// Command line arguments from `/proc/<pid>/cmdline`.
    pub fn collect_args(&self, pid: u32) -> Result<Vec<String>, CollectError> {
        let content = self.read_pid_file(pid, "cmdline")?;
        Ok(parse_cmdline(&content))
    }

    /// Executable, working directory and root paths from the `/proc/<pid>`
    /// symlinks. Any unresolvable link fails the whole fetch.
    pub fn collect_exe(&self, pid: u32) -> Result<ProcExe, CollectError> {
        let resolve = |name: &str| -> Result<String, CollectError> {
            self.fs
                .read_link(&self.pid_path(pid, name))
                .map(|target| target.to_string_lossy().into_owned())
                .map_err(|err| CollectError::for_pid(err, pid))
        };

        Ok(ProcExe {
            name: resolve("exe")?,
            cwd: resolve("cwd")?,
            root: resolve("root")?,
        })
    }

    /// Accumulated I/O counters from `/proc/<pid>/io`.
    pub fn collect_io(&self, pid: u32) -> Result<ProcIo, CollectError> {
        let content = self.read_pid_file(pid, "io")?;
        Ok(parse_proc_io(&content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    const WATCHDOG_STAT: &str = "10 (watchdog/1) S 2 0 0 11 -1 4194304 0 64 0 256 100 142 0 0 -100 0 1 0 40000 0 0 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 1 99 1 0 0";

    fn collector(fs: MockFs) -> ProcessCollector<MockFs> {
        ProcessCollector::new(fs, ProbeConfig::default())
    }

    #[test]
    fn collect_pids_keeps_numeric_entries() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/10/stat", WATCHDOG_STAT);
        fs.add_file("/proc/2/stat", "x");
        fs.add_file("/proc/stat", "cpu 1 2 3\n");
        fs.add_dir("/proc/sys");
        let pids = collector(fs).collect_pids().unwrap();
        assert_eq!(pids, vec![2, 10]);
    }

    #[test]
    fn collect_state_fixture() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/10/stat", WATCHDOG_STAT);
        let state = collector(fs).collect_state(10).unwrap();
        assert_eq!(state.pid, 10);
        assert_eq!(state.name, "watchdog/1");
        assert_eq!(state.state, RunState::Sleeping);
        assert_eq!(state.ppid, 2);
        assert_eq!(state.tty, 11);
        assert_eq!(state.priority, -100);
        assert_eq!(state.nice, 0);
        assert_eq!(state.processor, 1);
    }

    #[test]
    fn collect_memory_combines_statm_and_stat() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/10/stat", WATCHDOG_STAT);
        fs.add_file("/proc/10/statm", "63831 465 293 421 0 33156 0");
        let mem = collector(fs).collect_memory(10).unwrap();
        assert_eq!(mem.size, 261451776);
        assert_eq!(mem.resident, 1904640);
        assert_eq!(mem.share, 1200128);
        assert_eq!(mem.minor_faults, 64);
        assert_eq!(mem.major_faults, 256);
        assert_eq!(mem.page_faults, 320);
    }

    #[test]
    fn collect_time_scales_ticks_to_ms() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/10/stat", WATCHDOG_STAT);
        let config = ProbeConfig {
            boot_time: 1_700_000_000,
            ..ProbeConfig::default()
        };
        let collector = ProcessCollector::new(fs, config);

        let time = collector.collect_time(10).unwrap();
        assert_eq!(time.user, 1000);
        assert_eq!(time.sys, 1420);
        assert_eq!(time.total, 2420);
        assert_eq!(time.start_time, (40000 / 100 + 1_700_000_000) * 1000);
    }

    #[test]
    fn collect_args_splits_on_nul() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/10/cmdline", "/usr/sbin/sshd\0-D\0");
        let args = collector(fs).collect_args(10).unwrap();
        assert_eq!(args, vec!["/usr/sbin/sshd".to_string(), "-D".to_string()]);
    }

    #[test]
    fn collect_exe_resolves_all_links() {
        let mut fs = MockFs::new();
        fs.add_symlink("/proc/10/exe", "/usr/sbin/sshd");
        fs.add_symlink("/proc/10/cwd", "/");
        fs.add_symlink("/proc/10/root", "/");
        let exe = collector(fs).collect_exe(10).unwrap();
        assert_eq!(exe.name, "/usr/sbin/sshd");
        assert_eq!(exe.cwd, "/");
        assert_eq!(exe.root, "/");
    }

    #[test]
    fn collect_exe_fails_when_any_link_is_missing() {
        let mut fs = MockFs::new();
        fs.add_symlink("/proc/10/exe", "/usr/sbin/sshd");
        assert!(matches!(
            collector(fs).collect_exe(10),
            Err(CollectError::ProcessGone(10))
        ));
    }

    #[test]
    fn collect_io_fixture() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/10/io",
            "rchar: 9\nwchar: 8\nsyscr: 100\nsyscw: 50\nread_bytes: 4096\nwrite_bytes: 2048\n",
        );
        let io = collector(fs).collect_io(10).unwrap();
        assert_eq!(io.read_ops, 100);
        assert_eq!(io.write_ops, 50);
        assert_eq!(io.read_bytes, 4096);
        assert_eq!(io.write_bytes, 2048);
    }

    #[test]
    fn gone_process_maps_to_process_gone() {
        let fs = MockFs::new();
        assert!(matches!(
            collector(fs).collect_state(999),
            Err(CollectError::ProcessGone(999))
        ));
    }
}
