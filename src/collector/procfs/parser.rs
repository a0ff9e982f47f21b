//! Decoders for `/proc` and `/etc` file content.
//!
//! These are pure functions over string content so they can be tested with
//! string fixtures, without touching a real filesystem.

use std::collections::{HashMap, HashSet};

use crate::model::{Cpu, DiskIo, LoadAverage, MountEntry, NetIface, ProcIo};

/// Error type for decoding failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parses one whitespace-trimmed token as an unsigned decimal integer.
///
/// Negative or otherwise non-numeric input is an error, never a panic.
/// Callers decide per field whether a failure means zero or a hard error.
pub fn read_uint(token: &str) -> Result<u64, ParseError> {
    token
        .trim()
        .parse()
        .map_err(|_| ParseError::new(format!("not an unsigned integer: {token:?}")))
}

/// Decodes one `cpu`/`cpuN` line from `/proc/stat`.
///
/// Fields are user, nice, sys, idle, wait, irq, softirq, stolen, with guest
/// appended by 2.6+ kernels. Missing or malformed fields decode as zero so a
/// short line from an old kernel still yields a usable sample.
pub fn parse_cpu_line(line: &str) -> Cpu {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let get_val = |idx: usize| -> u64 {
        parts
            .get(idx)
            .and_then(|tok| read_uint(tok).ok())
            .unwrap_or(0)
    };

    Cpu {
        user: get_val(1),
        nice: get_val(2),
        sys: get_val(3),
        idle: get_val(4),
        wait: get_val(5),
        irq: get_val(6),
        softirq: get_val(7),
        stolen: get_val(8),
        guest: get_val(9),
    }
}

/// Captures selected `/proc/meminfo` rows into caller-supplied slots.
///
/// Each slot names a key (without the colon); matching rows store the value
/// scaled from kB to bytes. Keys absent from the content leave their slot
/// untouched.
pub fn capture_meminfo(content: &str, slots: &mut [(&str, &mut u64)]) {
    for line in content.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        for (slot_key, value) in slots.iter_mut() {
            if *slot_key == key {
                **value = rest
                    .split_whitespace()
                    .next()
                    .and_then(|tok| read_uint(tok).ok())
                    .unwrap_or(0)
                    .wrapping_mul(1024);
            }
        }
    }
}

// Offsets into the tail of `/proc/<pid>/stat`, counted after the pid and the
// parenthesized command name have been excised.
pub const STAT_STATE: usize = 0;
pub const STAT_PPID: usize = 1;
pub const STAT_TTY: usize = 4;
pub const STAT_MINFLT: usize = 8;
pub const STAT_MAJFLT: usize = 10;
pub const STAT_UTIME: usize = 11;
pub const STAT_STIME: usize = 12;
pub const STAT_PRIORITY: usize = 15;
pub const STAT_NICE: usize = 16;
pub const STAT_STARTTIME: usize = 19;
pub const STAT_PROCESSOR: usize = 36;

/// Split form of `/proc/<pid>/stat`: pid, command name, and the numeric tail.
#[derive(Debug, Clone, Default)]
pub struct StatRecord {
    pub pid: u32,
    pub name: String,
    fields: Vec<String>,
}

impl StatRecord {
    /// First character of the tail field, `?` when empty.
    pub fn state_letter(&self) -> char {
        self.fields
            .get(STAT_STATE)
            .and_then(|tok| tok.chars().next())
            .unwrap_or('?')
    }

    /// Unsigned tail field; malformed values decode as zero.
    pub fn field_u64(&self, idx: usize) -> u64 {
        self.fields
            .get(idx)
            .and_then(|tok| read_uint(tok).ok())
            .unwrap_or(0)
    }

    /// Signed tail field; malformed values decode as zero.
    pub fn field_i64(&self, idx: usize) -> i64 {
        self.fields
            .get(idx)
            .and_then(|tok| tok.parse().ok())
            .unwrap_or(0)
    }
}

/// Decodes `/proc/<pid>/stat`.
///
/// The command name sits between the first `(` and the last `)` and may
/// itself contain spaces and parentheses, so the line cannot be split on
/// whitespace directly. Everything after the closing parenthesis is the
/// numeric tail addressed by the `STAT_*` offsets.
pub fn parse_stat_record(content: &str) -> Result<StatRecord, ParseError> {
    let content = content.trim();

    let open_paren = content
        .find('(')
        .ok_or_else(|| ParseError::new("missing '(' in stat"))?;
    let close_paren = content
        .rfind(')')
        .ok_or_else(|| ParseError::new("missing ')' in stat"))?;
    if close_paren <= open_paren {
        return Err(ParseError::new("invalid parentheses in stat"));
    }

    let pid = read_uint(&content[..open_paren])
        .map_err(|_| ParseError::new("invalid pid in stat"))? as u32;
    let name = content[open_paren + 1..close_paren].to_string();

    let fields: Vec<String> = content[close_paren + 1..]
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if fields.len() < 37 {
        return Err(ParseError::new(format!(
            "not enough fields in stat: expected 37+, got {}",
            fields.len()
        )));
    }

    Ok(StatRecord { pid, name, fields })
}

/// Decodes `/proc/<pid>/statm` into (size, resident, share) in bytes.
///
/// The kernel reports pages; values are shifted by the 4 KiB page size.
pub fn parse_statm(content: &str) -> Result<(u64, u64, u64), ParseError> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(ParseError::new("not enough fields in statm"));
    }
    let size = read_uint(parts[0])? << 12;
    let resident = read_uint(parts[1])? << 12;
    let share = read_uint(parts[2])? << 12;
    Ok((size, resident, share))
}

/// Decodes NUL-separated `/proc/<pid>/cmdline` into argv.
///
/// The kernel terminates the last argument with a NUL too; no empty
/// trailing argument is produced.
pub fn parse_cmdline(content: &str) -> Vec<String> {
    content.split_terminator('\0').map(str::to_string).collect()
}

/// Decodes `/proc/<pid>/io` syscall and block-layer counters.
pub fn parse_proc_io(content: &str) -> ProcIo {
    let mut io = ProcIo::default();
    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = read_uint(value).unwrap_or(0);
        match key.trim() {
            "syscr" => io.read_ops = value,
            "syscw" => io.write_ops = value,
            "read_bytes" => io.read_bytes = value,
            "write_bytes" => io.write_bytes = value,
            _ => {}
        }
    }
    io
}

/// Decodes the first three fields of `/proc/loadavg`.
pub fn parse_loadavg(content: &str) -> Result<LoadAverage, ParseError> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(ParseError::new("not enough fields in loadavg"));
    }
    let parse_load = |tok: &str| -> Result<f64, ParseError> {
        tok.parse()
            .map_err(|_| ParseError::new(format!("invalid load value: {tok:?}")))
    };
    Ok(LoadAverage {
        one: parse_load(parts[0])?,
        five: parse_load(parts[1])?,
        fifteen: parse_load(parts[2])?,
    })
}

/// True when a (major, minor) pair addresses a whole disk rather than a
/// partition of one.
///
/// IDE majors carve 64 minors per disk, SCSI majors 16. Anything outside
/// those tables has no partition sub-numbering the kernel documents, so it
/// counts as a whole device.
pub fn is_whole_disk(major: u32, minor: u32) -> bool {
    const IDE_MAJORS: [u32; 10] = [3, 22, 33, 34, 56, 57, 88, 89, 90, 91];
    if IDE_MAJORS.contains(&major) {
        return minor & 0x3F == 0;
    }
    let scsi = major == 8 || (65..=71).contains(&major) || (128..=135).contains(&major);
    if scsi {
        return minor & 0x0F == 0;
    }
    true
}

/// Decodes `/proc/partitions` rows into (major, minor, name) triples.
/// Header and short rows are skipped.
pub fn parse_partitions(content: &str) -> Vec<(u32, u32, String)> {
    let mut devices = Vec::new();
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }
        let Ok(major) = read_uint(parts[0]) else {
            continue;
        };
        let Ok(minor) = read_uint(parts[1]) else {
            continue;
        };
        devices.push((major as u32, minor as u32, parts[3].to_string()));
    }
    devices
}

/// Decodes `/proc/diskstats`, keeping only devices named in `allowed`.
///
/// Sector counts scale to bytes at 512 bytes per sector regardless of the
/// device's real sector size; that is the unit the kernel reports in.
pub fn parse_diskstats(content: &str, allowed: &HashSet<String>) -> HashMap<String, DiskIo> {
    let mut disks = HashMap::new();
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 13 {
            continue;
        }
        let name = parts[2];
        if !allowed.contains(name) {
            continue;
        }
        let get_val = |idx: usize| -> u64 {
            parts
                .get(idx)
                .and_then(|tok| read_uint(tok).ok())
                .unwrap_or(0)
        };
        disks.insert(
            name.to_string(),
            DiskIo {
                read_ops: get_val(3),
                read_bytes: get_val(5).wrapping_mul(512),
                read_time_ms: get_val(6),
                write_ops: get_val(7),
                write_bytes: get_val(9).wrapping_mul(512),
                write_time_ms: get_val(10),
                io_time_ms: get_val(12),
            },
        );
    }
    disks
}

/// Decodes `/proc/net/dev` interface counter rows.
///
/// A data row has exactly 17 fields with the interface name (colon-suffixed)
/// first; the two header rows fail that test and are skipped. Sysfs
/// attributes (mtu, mac, link status) are left at their zero values for the
/// collector to fill in.
pub fn parse_net_dev(content: &str) -> Vec<NetIface> {
    let mut ifaces = Vec::new();
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 17 || !parts[0].ends_with(':') {
            continue;
        }
        let get_val = |idx: usize| -> u64 {
            parts
                .get(idx)
                .and_then(|tok| read_uint(tok).ok())
                .unwrap_or(0)
        };
        ifaces.push(NetIface {
            name: parts[0].trim_end_matches(':').to_string(),
            recv_bytes: get_val(1),
            recv_packets: get_val(2),
            recv_errs: get_val(3),
            recv_drop: get_val(4),
            recv_fifo: get_val(5),
            recv_frame: get_val(6),
            recv_compressed: get_val(7),
            recv_multicast: get_val(8),
            send_bytes: get_val(9),
            send_packets: get_val(10),
            send_errs: get_val(11),
            send_drop: get_val(12),
            send_fifo: get_val(13),
            send_colls: get_val(14),
            send_carrier: get_val(15),
            send_compressed: get_val(16),
            ..NetIface::default()
        });
    }
    ifaces
}

/// Decodes `/etc/mtab` rows. Short rows are skipped.
pub fn parse_mtab(content: &str) -> Vec<MountEntry> {
    let mut mounts = Vec::new();
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            continue;
        }
        mounts.push(MountEntry {
            dev_name: parts[0].to_string(),
            dir_name: parts[1].to_string(),
            sys_type_name: parts[2].to_string(),
            options: parts[3].to_string(),
        });
    }
    mounts
}

/// Extracts `DISTRIB_DESCRIPTION` from `/etc/lsb-release` content, with
/// surrounding quotes stripped. Returns `None` when the key is absent.
pub fn parse_lsb_description(content: &str) -> Option<String> {
    for line in content.lines() {
        if let Some(value) = line.strip_prefix("DISTRIB_DESCRIPTION=") {
            return Some(value.trim().trim_matches('"').to_string());
        }
    }
    None
}
