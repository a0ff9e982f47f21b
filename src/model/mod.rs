//! Snapshot value types produced by the collectors.

mod net;
mod process;
mod system;

pub use net::{
    ConnProto, ConnState, IcmpStats, IpStats, LinkStatus, NetConn, NetIface, NetIfaceMap,
    NetProtoStats, TcpStats, UdpStats,
};
pub use process::{ProcExe, ProcIo, ProcMem, ProcState, ProcTime, RunState};
pub use system::{Cpu, DiskIo, Distribution, LoadAverage, Mem, MountEntry, Swap};
