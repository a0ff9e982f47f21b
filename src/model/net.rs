//! Network snapshot types: interface counters, connection table rows and
//! protocol-level counters.

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

/// Physical link state reported by `/sys/class/net/<iface>/carrier`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub enum LinkStatus {
    Up,
    Down,
    #[default]
    Unknown,
}

/// Per-interface traffic counters from `/proc/net/dev`, enriched with
/// `/sys/class/net` attributes when available.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct NetIface {
    pub name: String,
    pub recv_bytes: u64,
    pub recv_packets: u64,
    pub recv_errs: u64,
    pub recv_drop: u64,
    pub recv_fifo: u64,
    pub recv_frame: u64,
    pub recv_compressed: u64,
    pub recv_multicast: u64,
    pub send_bytes: u64,
    pub send_packets: u64,
    pub send_errs: u64,
    pub send_drop: u64,
    pub send_fifo: u64,
    pub send_colls: u64,
    pub send_carrier: u64,
    pub send_compressed: u64,
    /// 0 when the sysfs attribute is unreadable.
    pub mtu: u64,
    /// Empty when the sysfs attribute is unreadable.
    pub mac: String,
    pub link_status: LinkStatus,
}

/// Transport protocol of a connection table.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum ConnProto {
    Tcp,
    Udp,
    Raw,
}

impl fmt::Display for ConnProto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnProto::Tcp => "tcp",
            ConnProto::Udp => "udp",
            ConnProto::Raw => "raw",
        };
        f.write_str(name)
    }
}

/// TCP socket state as encoded in the `st` column of `/proc/net/tcp`.
///
/// Codes the kernel does not document today are carried through as
/// `Other` so a newer kernel never makes rows disappear.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum ConnState {
    Established,
    SynSent,
    SynRecv,
    FinWait1,
    FinWait2,
    TimeWait,
    Close,
    CloseWait,
    LastAck,
    Listen,
    Closing,
    Other(u8),
}

impl ConnState {
    /// Maps the kernel's numeric state code.
    pub fn from_code(code: u8) -> ConnState {
        match code {
            1 => ConnState::Established,
            2 => ConnState::SynSent,
            3 => ConnState::SynRecv,
            4 => ConnState::FinWait1,
            5 => ConnState::FinWait2,
            6 => ConnState::TimeWait,
            7 => ConnState::Close,
            8 => ConnState::CloseWait,
            9 => ConnState::LastAck,
            10 => ConnState::Listen,
            11 => ConnState::Closing,
            other => ConnState::Other(other),
        }
    }

    /// Inverse of [`ConnState::from_code`].
    pub fn code(&self) -> u8 {
        match self {
            ConnState::Established => 1,
            ConnState::SynSent => 2,
            ConnState::SynRecv => 3,
            ConnState::FinWait1 => 4,
            ConnState::FinWait2 => 5,
            ConnState::TimeWait => 6,
            ConnState::Close => 7,
            ConnState::CloseWait => 8,
            ConnState::LastAck => 9,
            ConnState::Listen => 10,
            ConnState::Closing => 11,
            ConnState::Other(other) => *other,
        }
    }
}

impl fmt::Display for ConnState {
    /// Lower-case underscore-separated state name.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnState::Established => f.write_str("established"),
            ConnState::SynSent => f.write_str("syn_sent"),
            ConnState::SynRecv => f.write_str("syn_recv"),
            ConnState::FinWait1 => f.write_str("fin_wait1"),
            ConnState::FinWait2 => f.write_str("fin_wait2"),
            ConnState::TimeWait => f.write_str("time_wait"),
            ConnState::Close => f.write_str("close"),
            ConnState::CloseWait => f.write_str("close_wait"),
            ConnState::LastAck => f.write_str("last_ack"),
            ConnState::Listen => f.write_str("listen"),
            ConnState::Closing => f.write_str("closing"),
            ConnState::Other(code) => write!(f, "unknown({code})"),
        }
    }
}

/// One row of a kernel connection table.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct NetConn {
    pub proto: ConnProto,
    pub local_addr: IpAddr,
    pub local_port: u16,
    pub remote_addr: IpAddr,
    pub remote_port: u16,
    pub state: ConnState,
    pub send_queue: u32,
    pub recv_queue: u32,
}

impl fmt::Display for NetConn {
    /// Listening sockets and unconnected sockets (all-zero remote
    /// endpoint) render local-only.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.state == ConnState::Listen {
            write!(f, "Listen {} {}:{}", self.proto, self.local_addr, self.local_port)
        } else if self.remote_addr.is_unspecified() && self.remote_port == 0 {
            write!(f, "{} {}:{}", self.proto, self.local_addr, self.local_port)
        } else {
            write!(
                f,
                "{} {}:{} <-> {}:{}",
                self.proto, self.local_addr, self.local_port, self.remote_addr, self.remote_port
            )
        }
    }
}

/// IP layer counters from the `Ip:` section of `/proc/net/snmp`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct IpStats {
    pub in_receives: u64,
    pub in_hdr_errors: u64,
    pub in_addr_errors: u64,
    pub forw_datagrams: u64,
    pub in_unknown_protos: u64,
    pub in_discards: u64,
    pub in_delivers: u64,
    pub out_requests: u64,
    pub out_discards: u64,
    pub out_no_routes: u64,
}

/// ICMP counters from the `Icmp:` section of `/proc/net/snmp`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct IcmpStats {
    pub in_msgs: u64,
    pub in_errors: u64,
    pub in_dest_unreachs: u64,
    pub out_msgs: u64,
    pub out_errors: u64,
    pub out_dest_unreachs: u64,
}

/// TCP counters from the `Tcp:` section of `/proc/net/snmp`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct TcpStats {
    pub active_opens: u64,
    pub passive_opens: u64,
    pub attempt_fails: u64,
    pub estab_resets: u64,
    pub curr_estab: u64,
    pub in_segs: u64,
    pub out_segs: u64,
    pub retrans_segs: u64,
    pub in_errs: u64,
    pub out_rsts: u64,
}

/// UDP counters from the `Udp:` section of `/proc/net/snmp`.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct UdpStats {
    pub in_datagrams: u64,
    pub no_ports: u64,
    pub in_errors: u64,
    pub out_datagrams: u64,
    pub rcvbuf_errors: u64,
    pub sndbuf_errors: u64,
}

/// Combined protocol counters for one address family.
///
/// The v6 snapshot uses the same shape; counters the kernel does not
/// export for v6 stay zero.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Default)]
pub struct NetProtoStats {
    pub ip: IpStats,
    pub icmp: IcmpStats,
    pub tcp: TcpStats,
    pub udp: UdpStats,
}

/// Name-keyed interface map, as returned by the interface fetch.
pub type NetIfaceMap = HashMap<String, NetIface>;
