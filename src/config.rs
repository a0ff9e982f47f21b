//! Collector configuration: filesystem roots and process-wide constants.

use std::path::{Path, PathBuf};

use crate::collector::procfs::parser::read_uint;
use crate::collector::traits::{FileSystem, read_lines};

/// Where the collectors look and how they scale tick counters.
///
/// Production code uses [`ProbeConfig::default`]; tests point the roots at a
/// fixture tree instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Root of the proc filesystem, normally `/proc`.
    pub proc_root: PathBuf,
    /// Root of the sys filesystem, normally `/sys`.
    pub sys_root: PathBuf,
    /// Root for host configuration files, normally `/etc`.
    pub etc_root: PathBuf,
    /// Kernel clock ticks per second (`sysconf(_SC_CLK_TCK)`), used to turn
    /// tick counters into milliseconds.
    pub clock_ticks: u64,
    /// Boot time in seconds since the epoch. Zero until loaded with
    /// [`ProbeConfig::load_boot_time`].
    pub boot_time: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        ProbeConfig {
            proc_root: PathBuf::from("/proc"),
            sys_root: PathBuf::from("/sys"),
            etc_root: PathBuf::from("/etc"),
            clock_ticks: 100,
            boot_time: 0,
        }
    }
}

impl ProbeConfig {
    /// Configuration with all three roots relocated under `base`.
    pub fn with_roots(base: &Path) -> Self {
        ProbeConfig {
            proc_root: base.join("proc"),
            sys_root: base.join("sys"),
            etc_root: base.join("etc"),
            ..ProbeConfig::default()
        }
    }

    /// Reads the `btime` record from `<proc_root>/stat` into `boot_time`.
    ///
    /// A missing or malformed record leaves boot time at zero; only an
    /// unreadable stat file is an error.
    pub fn load_boot_time<F: FileSystem>(&mut self, fs: &F) -> std::io::Result<()> {
        let path = self.proc_root.join("stat");
        let mut boot_time = 0;
        read_lines(fs, &path, |line| {
            if let Some(rest) = line.strip_prefix("btime") {
                boot_time = rest
                    .split_whitespace()
                    .find_map(|tok| read_uint(tok).ok())
                    .unwrap_or(0);
                return false;
            }
            true
        })?;
        self.boot_time = boot_time;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn default_points_at_system_roots() {
        let cfg = ProbeConfig::default();
        assert_eq!(cfg.proc_root, PathBuf::from("/proc"));
        assert_eq!(cfg.sys_root, PathBuf::from("/sys"));
        assert_eq!(cfg.etc_root, PathBuf::from("/etc"));
        assert_eq!(cfg.clock_ticks, 100);
        assert_eq!(cfg.boot_time, 0);
    }

    #[test]
    fn load_boot_time_reads_btime() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/stat",
            "cpu  25 1 2 3 4 5 6 7\nbtime 1700000000\nprocesses 12345\n",
        );
        let mut cfg = ProbeConfig::default();
        cfg.load_boot_time(&fs).unwrap();
        assert_eq!(cfg.boot_time, 1700000000);
    }

    #[test]
    fn load_boot_time_tolerates_separator_noise() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/stat", "btime: 1700000001\n");
        let mut cfg = ProbeConfig::default();
        cfg.load_boot_time(&fs).unwrap();
        assert_eq!(cfg.boot_time, 1700000001);
    }

    #[test]
    fn load_boot_time_without_record_is_zero() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/stat", "cpu  25 1 2 3 4 5 6 7\n");
        let mut cfg = ProbeConfig::default();
        cfg.boot_time = 99;
        cfg.load_boot_time(&fs).unwrap();
        assert_eq!(cfg.boot_time, 0);
    }
}
