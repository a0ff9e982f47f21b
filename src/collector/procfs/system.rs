//! System-wide collector: CPU, memory, disks, interfaces, connection
//! tables, protocol counters, mounts and distribution info.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::debug;

use crate::collector::error::CollectError;
use crate::collector::procfs::net::{parse_conn_table, parse_net_snmp, parse_net_snmp6};
use crate::collector::procfs::parser::{
    capture_meminfo, is_whole_disk, parse_cpu_line, parse_diskstats, parse_loadavg,
    parse_lsb_description, parse_mtab, parse_net_dev, parse_partitions, read_uint,
};
use crate::collector::traits::{FileSystem, read_lines};
use crate::config::ProbeConfig;
use crate::model::{
    ConnProto, Cpu, Distribution, DiskIo, LinkStatus, LoadAverage, Mem, MountEntry, NetConn,
    NetIfaceMap, NetProtoStats, Swap,
};

/// Fetches system-wide snapshots through a [`FileSystem`].
///
/// Stateless apart from configuration; every method reads the source files
/// fresh and decodes them into a value.
pub struct SystemCollector<F: FileSystem> {
    fs: F,
    config: ProbeConfig,
}

impl<F: FileSystem> SystemCollector<F> {
    pub fn new(fs: F, config: ProbeConfig) -> Self {
        Self { fs, config }
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    fn proc_path(&self, name: &str) -> PathBuf {
        self.config.proc_root.join(name)
    }

    /// Aggregate CPU counters from the `cpu` line of `/proc/stat`.
    pub fn collect_cpu(&self) -> Result<Cpu, CollectError> {
        let mut cpu = Cpu::default();
        read_lines(&self.fs, &self.proc_path("stat"), |line| {
            if line.starts_with("cpu ") {
                cpu = parse_cpu_line(line);
                return false;
            }
            true
        })?;
        Ok(cpu)
    }

    /// Per-core CPU counters from the `cpuN` lines of `/proc/stat`.
    pub fn collect_cpu_list(&self) -> Result<Vec<Cpu>, CollectError> {
        let mut cpus = Vec::new();
        read_lines(&self.fs, &self.proc_path("stat"), |line| {
            let is_core_line = line
                .strip_prefix("cpu")
                .and_then(|rest| rest.chars().next())
                .is_some_and(|c| c.is_ascii_digit());
            if is_core_line {
                cpus.push(parse_cpu_line(line));
            }
            true
        })?;
        Ok(cpus)
    }

    /// Physical memory summary from `/proc/meminfo`.
    pub fn collect_memory(&self) -> Result<Mem, CollectError> {
        let content = self.fs.read_to_string(&self.proc_path("meminfo"))?;
        let mut mem = Mem::default();
        let mut buffers = 0;
        let mut cached = 0;
        capture_meminfo(
            &content,
            &mut [
                ("MemTotal", &mut mem.total),
                ("MemFree", &mut mem.free),
                ("Buffers", &mut buffers),
                ("Cached", &mut cached),
            ],
        );
        // Derived fields wrap rather than panic when the kernel reports
        // inconsistent counters (the rows are sampled non-atomically).
        let kern = buffers.wrapping_add(cached);
        mem.used = mem.total.wrapping_sub(mem.free);
        mem.actual_free = mem.free.wrapping_add(kern);
        mem.actual_used = mem.used.wrapping_sub(kern);
        Ok(mem)
    }

    /// Swap summary from `/proc/meminfo`.
    pub fn collect_swap(&self) -> Result<Swap, CollectError> {
        let content = self.fs.read_to_string(&self.proc_path("meminfo"))?;
        let mut swap = Swap::default();
        capture_meminfo(
            &content,
            &mut [
                ("SwapTotal", &mut swap.total),
                ("SwapFree", &mut swap.free),
            ],
        );
        swap.used = swap.total.wrapping_sub(swap.free);
        Ok(swap)
    }

    /// Load averages from `/proc/loadavg`.
    pub fn collect_load_average(&self) -> Result<LoadAverage, CollectError> {
        let content = self.fs.read_to_string(&self.proc_path("loadavg"))?;
        Ok(parse_loadavg(&content)?)
    }

    /// Per-whole-disk I/O counters.
    ///
    /// `/proc/partitions` supplies the device list, the classification
    /// helper drops partitions, and `/proc/diskstats` supplies the counters
    /// for what remains.
    pub fn collect_disk_io(&self) -> Result<std::collections::HashMap<String, DiskIo>, CollectError>
    {
        let partitions = self.fs.read_to_string(&self.proc_path("partitions"))?;
        let allowed: HashSet<String> = parse_partitions(&partitions)
            .into_iter()
            .filter(|(major, minor, _)| is_whole_disk(*major, *minor))
            .map(|(_, _, name)| name)
            .collect();

        let diskstats = self.fs.read_to_string(&self.proc_path("diskstats"))?;
        Ok(parse_diskstats(&diskstats, &allowed))
    }

    /// Interface counters from `/proc/net/dev`, enriched with mtu, mac and
    /// link status from sysfs where readable.
    pub fn collect_ifaces(&self) -> Result<NetIfaceMap, CollectError> {
        let content = self.fs.read_to_string(&self.proc_path("net/dev"))?;
        let mut map = NetIfaceMap::new();
        for mut iface in parse_net_dev(&content) {
            self.enrich_iface(&mut iface);
            map.insert(iface.name.clone(), iface);
        }
        Ok(map)
    }

    /// Sysfs attributes are best-effort: interfaces can disappear between
    /// the table read and here, and some types lack a carrier file.
    fn enrich_iface(&self, iface: &mut crate::model::NetIface) {
        let base = self.config.sys_root.join("class/net").join(&iface.name);

        match self.fs.read_to_string(&base.join("mtu")) {
            Ok(content) => iface.mtu = read_uint(&content).unwrap_or(0),
            Err(err) => debug!(iface = %iface.name, %err, "mtu attribute unreadable"),
        }
        if let Ok(content) = self.fs.read_to_string(&base.join("address")) {
            iface.mac = content.trim().to_string();
        }
        if let Ok(content) = self.fs.read_to_string(&base.join("carrier")) {
            iface.link_status = match content.trim() {
                "0" => LinkStatus::Down,
                "1" => LinkStatus::Up,
                _ => LinkStatus::Unknown,
            };
        }
    }

    fn conn_table(
        &self,
        file: &str,
        proto: ConnProto,
        addr_bytes: usize,
    ) -> Result<Vec<NetConn>, CollectError> {
        let content = self.fs.read_to_string(&self.proc_path(file))?;
        Ok(parse_conn_table(&content, proto, addr_bytes))
    }

    pub fn collect_tcp_connections(&self) -> Result<Vec<NetConn>, CollectError> {
        self.conn_table("net/tcp", ConnProto::Tcp, 4)
    }

    pub fn collect_tcp6_connections(&self) -> Result<Vec<NetConn>, CollectError> {
        self.conn_table("net/tcp6", ConnProto::Tcp, 16)
    }

    pub fn collect_udp_connections(&self) -> Result<Vec<NetConn>, CollectError> {
        self.conn_table("net/udp", ConnProto::Udp, 4)
    }

    pub fn collect_udp6_connections(&self) -> Result<Vec<NetConn>, CollectError> {
        self.conn_table("net/udp6", ConnProto::Udp, 16)
    }

    pub fn collect_raw_connections(&self) -> Result<Vec<NetConn>, CollectError> {
        self.conn_table("net/raw", ConnProto::Raw, 4)
    }

    pub fn collect_raw6_connections(&self) -> Result<Vec<NetConn>, CollectError> {
        self.conn_table("net/raw6", ConnProto::Raw, 16)
    }

    /// IPv4 protocol counters from `/proc/net/snmp`.
    pub fn collect_proto_v4(&self) -> Result<NetProtoStats, CollectError> {
        let content = self.fs.read_to_string(&self.proc_path("net/snmp"))?;
        Ok(parse_net_snmp(&content))
    }

    /// IPv6 protocol counters from `/proc/net/snmp6`, mapped onto the same
    /// shape as the v4 snapshot.
    pub fn collect_proto_v6(&self) -> Result<NetProtoStats, CollectError> {
        let content = self.fs.read_to_string(&self.proc_path("net/snmp6"))?;
        Ok(parse_net_snmp6(&content))
    }

    /// Mounted filesystems from `/etc/mtab`.
    pub fn collect_filesystems(&self) -> Result<Vec<MountEntry>, CollectError> {
        let content = self.fs.read_to_string(&self.config.etc_root.join("mtab"))?;
        Ok(parse_mtab(&content))
    }

    /// Distribution description, preferring `/etc/redhat-release` and
    /// falling back to the `lsb-release` description.
    pub fn collect_distribution(&self) -> Result<Distribution, CollectError> {
        if let Ok(content) = self
            .fs
            .read_to_string(&self.config.etc_root.join("redhat-release"))
        {
            return Ok(Distribution {
                description: content.trim().to_string(),
            });
        }

        let content = self
            .fs
            .read_to_string(&self.config.etc_root.join("lsb-release"))?;
        Ok(Distribution {
            description: parse_lsb_description(&content).unwrap_or_default(),
        })
    }
}
