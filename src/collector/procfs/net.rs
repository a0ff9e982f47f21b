//! Decoders for the `/proc/net` connection tables and protocol counters.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::collector::procfs::parser::ParseError;
use crate::model::{ConnProto, ConnState, NetConn, NetProtoStats};

/// Reverses the bytes of each 32-bit word in place.
///
/// The kernel prints connection addresses as hex dumps of in-memory words,
/// so on little-endian hosts every 4-byte group comes out reversed relative
/// to network order. Applying the swap twice restores the input, which makes
/// this both the decoder and the encoder.
fn swap_words(bytes: &mut [u8]) {
    for chunk in bytes.chunks_mut(4) {
        chunk.reverse();
    }
}

/// Decodes a kernel hex address of `addr_bytes` bytes (4 for v4, 16 for v6).
pub fn decode_conn_addr(hex: &str, addr_bytes: usize) -> Result<IpAddr, ParseError> {
    if hex.len() != addr_bytes * 2 {
        return Err(ParseError::new(format!(
            "address hex length {} does not match {addr_bytes}-byte address",
            hex.len()
        )));
    }

    let mut bytes = vec![0u8; addr_bytes];
    for (i, byte) in bytes.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .map_err(|_| ParseError::new(format!("invalid address hex: {hex:?}")))?;
    }
    swap_words(&mut bytes);

    match addr_bytes {
        4 => {
            let octets: [u8; 4] = bytes
                .try_into()
                .map_err(|_| ParseError::new("bad v4 address length"))?;
            Ok(IpAddr::V4(Ipv4Addr::from(octets)))
        }
        16 => {
            let octets: [u8; 16] = bytes
                .try_into()
                .map_err(|_| ParseError::new("bad v6 address length"))?;
            Ok(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        _ => Err(ParseError::new("unsupported address length")),
    }
}

/// Decodes an `ADDR:PORT` endpoint field. The port is 16-bit hex.
fn decode_endpoint(field: &str, addr_bytes: usize) -> Result<(IpAddr, u16), ParseError> {
    let (addr_hex, port_hex) = field
        .rsplit_once(':')
        .ok_or_else(|| ParseError::new(format!("missing port in endpoint: {field:?}")))?;
    let addr = decode_conn_addr(addr_hex, addr_bytes)?;
    let port = u16::from_str_radix(port_hex, 16)
        .map_err(|_| ParseError::new(format!("invalid port hex: {port_hex:?}")))?;
    Ok((addr, port))
}

fn expected_fields(proto: ConnProto) -> usize {
    match proto {
        ConnProto::Tcp => 17,
        ConnProto::Udp | ConnProto::Raw => 13,
    }
}

/// Decodes one connection table row, or `None` for headers and rows that do
/// not fit the expected shape.
fn parse_conn_row(line: &str, proto: ConnProto, addr_bytes: usize) -> Option<NetConn> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != expected_fields(proto) || !parts[0].ends_with(':') {
        return None;
    }

    let (local_addr, local_port) = decode_endpoint(parts[1], addr_bytes).ok()?;
    let (remote_addr, remote_port) = decode_endpoint(parts[2], addr_bytes).ok()?;
    let state = u8::from_str_radix(parts[3], 16).ok()?;

    // Queue sizes are plain hex, no word swapping.
    let (send_hex, recv_hex) = parts[4].split_once(':')?;
    let send_queue = u32::from_str_radix(send_hex, 16).ok()?;
    let recv_queue = u32::from_str_radix(recv_hex, 16).ok()?;

    Some(NetConn {
        proto,
        local_addr,
        local_port,
        remote_addr,
        remote_port,
        state: ConnState::from_code(state),
        send_queue,
        recv_queue,
    })
}

/// Decodes a whole connection table. Malformed rows are dropped silently,
/// matching how the kernel table can shift under the reader.
pub fn parse_conn_table(content: &str, proto: ConnProto, addr_bytes: usize) -> Vec<NetConn> {
    content
        .lines()
        .filter_map(|line| parse_conn_row(line, proto, addr_bytes))
        .collect()
}

/// Decodes `/proc/net/snmp`.
///
/// Each protocol section is a pair of lines sharing a prefix: first the
/// column names, then the values.
pub fn parse_net_snmp(content: &str) -> NetProtoStats {
    let mut stats = NetProtoStats::default();
    let lines: Vec<&str> = content.lines().collect();

    let mut i = 0;
    while i + 1 < lines.len() {
        let key_parts: Vec<&str> = lines[i].split_whitespace().collect();
        let val_parts: Vec<&str> = lines[i + 1].split_whitespace().collect();

        if key_parts.is_empty() || val_parts.is_empty() || key_parts[0] != val_parts[0] {
            i += 1;
            continue;
        }

        let prefix = key_parts[0].trim_end_matches(':');
        for (key, val) in key_parts[1..].iter().zip(val_parts[1..].iter()) {
            let value: u64 = val.parse().unwrap_or(0);
            apply_snmp_counter(&mut stats, prefix, key, value);
        }
        i += 2;
    }

    stats
}

fn apply_snmp_counter(stats: &mut NetProtoStats, prefix: &str, key: &str, value: u64) {
    match (prefix, key) {
        ("Ip", "InReceives") => stats.ip.in_receives = value,
        ("Ip", "InHdrErrors") => stats.ip.in_hdr_errors = value,
        ("Ip", "InAddrErrors") => stats.ip.in_addr_errors = value,
        ("Ip", "ForwDatagrams") => stats.ip.forw_datagrams = value,
        ("Ip", "InUnknownProtos") => stats.ip.in_unknown_protos = value,
        ("Ip", "InDiscards") => stats.ip.in_discards = value,
        ("Ip", "InDelivers") => stats.ip.in_delivers = value,
        ("Ip", "OutRequests") => stats.ip.out_requests = value,
        ("Ip", "OutDiscards") => stats.ip.out_discards = value,
        ("Ip", "OutNoRoutes") => stats.ip.out_no_routes = value,
        ("Icmp", "InMsgs") => stats.icmp.in_msgs = value,
        ("Icmp", "InErrors") => stats.icmp.in_errors = value,
        ("Icmp", "InDestUnreachs") => stats.icmp.in_dest_unreachs = value,
        ("Icmp", "OutMsgs") => stats.icmp.out_msgs = value,
        ("Icmp", "OutErrors") => stats.icmp.out_errors = value,
        ("Icmp", "OutDestUnreachs") => stats.icmp.out_dest_unreachs = value,
        ("Tcp", "ActiveOpens") => stats.tcp.active_opens = value,
        ("Tcp", "PassiveOpens") => stats.tcp.passive_opens = value,
        ("Tcp", "AttemptFails") => stats.tcp.attempt_fails = value,
        ("Tcp", "EstabResets") => stats.tcp.estab_resets = value,
        ("Tcp", "CurrEstab") => stats.tcp.curr_estab = value,
        ("Tcp", "InSegs") => stats.tcp.in_segs = value,
        ("Tcp", "OutSegs") => stats.tcp.out_segs = value,
        ("Tcp", "RetransSegs") => stats.tcp.retrans_segs = value,
        ("Tcp", "InErrs") => stats.tcp.in_errs = value,
        ("Tcp", "OutRsts") => stats.tcp.out_rsts = value,
        ("Udp", "InDatagrams") => stats.udp.in_datagrams = value,
        ("Udp", "NoPorts") => stats.udp.no_ports = value,
        ("Udp", "InErrors") => stats.udp.in_errors = value,
        ("Udp", "OutDatagrams") => stats.udp.out_datagrams = value,
        ("Udp", "RcvbufErrors") => stats.udp.rcvbuf_errors = value,
        ("Udp", "SndbufErrors") => stats.udp.sndbuf_errors = value,
        _ => {}
    }
}

/// Decodes `/proc/net/snmp6`, which is flat `key value` lines.
///
/// Counters map onto the same shape as the v4 snapshot. The kernel exports
/// no Tcp6 section (TCP counters are family-agnostic) and no Icmp6OutErrors
/// or Udp6 buffer-error counters; those fields stay zero.
pub fn parse_net_snmp6(content: &str) -> NetProtoStats {
    let mut stats = NetProtoStats::default();

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
            continue;
        };
        let value: u64 = val.parse().unwrap_or(0);
        match key {
            "Ip6InReceives" => stats.ip.in_receives = value,
            "Ip6InHdrErrors" => stats.ip.in_hdr_errors = value,
            "Ip6InAddrErrors" => stats.ip.in_addr_errors = value,
            "Ip6OutForwDatagrams" => stats.ip.forw_datagrams = value,
            "Ip6InUnknownProtos" => stats.ip.in_unknown_protos = value,
            "Ip6InDiscards" => stats.ip.in_discards = value,
            "Ip6InDelivers" => stats.ip.in_delivers = value,
            "Ip6OutRequests" => stats.ip.out_requests = value,
            "Ip6OutDiscards" => stats.ip.out_discards = value,
            "Ip6OutNoRoutes" => stats.ip.out_no_routes = value,
            "Icmp6InMsgs" => stats.icmp.in_msgs = value,
            "Icmp6InErrors" => stats.icmp.in_errors = value,
            "Icmp6InDestUnreachs" => stats.icmp.in_dest_unreachs = value,
            "Icmp6OutMsgs" => stats.icmp.out_msgs = value,
            "Icmp6OutDestUnreachs" => stats.icmp.out_dest_unreachs = value,
            "Udp6InDatagrams" => stats.udp.in_datagrams = value,
            "Udp6NoPorts" => stats.udp.no_ports = value,
            "Udp6InErrors" => stats.udp.in_errors = value,
            "Udp6OutDatagrams" => stats.udp.out_datagrams = value,
            _ => {}
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_words_is_an_involution() {
        let original = [
            0x0F, 0x02, 0x00, 0x0A, 0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06,
            0x07, 0x08,
        ];
        let mut bytes = original;
        swap_words(&mut bytes);
        assert_ne!(bytes, original);
        swap_words(&mut bytes);
        assert_eq!(bytes, original);
    }

    #[test]
    fn test_decode_v4_addr() {
        assert_eq!(
            decode_conn_addr("0F02000A", 4).unwrap(),
            IpAddr::V4(Ipv4Addr::new(10, 0, 2, 15))
        );
        assert_eq!(
            decode_conn_addr("0202000A", 4).unwrap(),
            IpAddr::V4(Ipv4Addr::new(10, 0, 2, 2))
        );
        assert_eq!(
            decode_conn_addr("00000000", 4).unwrap(),
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        );
    }

    #[test]
    fn test_decode_v6_addr() {
        assert_eq!(
            decode_conn_addr("00000000000000000000000001000000", 16).unwrap(),
            IpAddr::V6(Ipv6Addr::LOCALHOST)
        );
        assert_eq!(
            decode_conn_addr("00000000000000000000000000000000", 16).unwrap(),
            IpAddr::V6(Ipv6Addr::UNSPECIFIED)
        );
    }

    #[test]
    fn test_decode_addr_rejects_wrong_length() {
        assert!(decode_conn_addr("0F02000A", 16).is_err());
        assert!(decode_conn_addr("0F02", 4).is_err());
        assert!(decode_conn_addr("ZZ02000A", 4).is_err());
    }

    #[test]
    fn test_decode_endpoint() {
        let (addr, port) = decode_endpoint("0F02000A:0016", 4).unwrap();
        assert_eq!(addr, IpAddr::V4(Ipv4Addr::new(10, 0, 2, 15)));
        assert_eq!(port, 22);

        let (addr, port) = decode_endpoint("0202000A:E78C", 4).unwrap();
        assert_eq!(addr, IpAddr::V4(Ipv4Addr::new(10, 0, 2, 2)));
        assert_eq!(port, 59276);
    }

    const TCP_TABLE: &str = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 00000000:0016 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 12345 1 0000000000000000 100 0 0 10 0
   1: 0F02000A:0016 0202000A:E78C 01 00000001:00000002 00:00000000 00000000     0        0 12346 1 0000000000000000 100 0 0 10 0
   2: garbage
";

    #[test]
    fn test_parse_tcp_table() {
        let conns = parse_conn_table(TCP_TABLE, ConnProto::Tcp, 4);
        assert_eq!(conns.len(), 2);

        assert_eq!(conns[0].state, ConnState::Listen);
        assert_eq!(conns[0].local_port, 22);
        assert_eq!(conns[0].to_string(), "Listen tcp 0.0.0.0:22");

        assert_eq!(conns[1].state, ConnState::Established);
        assert_eq!(conns[1].send_queue, 1);
        assert_eq!(conns[1].recv_queue, 2);
        assert_eq!(conns[1].to_string(), "tcp 10.0.2.15:22 <-> 10.0.2.2:59276");
    }

    #[test]
    fn test_parse_udp_table_has_13_fields() {
        let content = "\
  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode ref pointer drops
   1: 00000000:0044 00000000:0000 07 00000000:00000000 00:00000000 00000000 0 0 12346 2 0000000000000000 0
";
        let conns = parse_conn_table(content, ConnProto::Udp, 4);
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].local_port, 0x44);
        assert_eq!(conns[0].state, ConnState::Close);
        assert_eq!(conns[0].proto, ConnProto::Udp);
    }

    #[test]
    fn test_parse_tcp6_table() {
        let content = "\
  sl  local_address                         remote_address                        st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode
   0: 00000000000000000000000000000000:006F 00000000000000000000000000000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 111 1 0000000000000000 100 0 0 10 0
   1: 00000000000000000000000001000000:9E32 00000000000000000000000001000000:006F 06 00000000:00000000 00:00000000 00000000     0        0 112 1 0000000000000000 100 0 0 10 0
";
        let conns = parse_conn_table(content, ConnProto::Tcp, 16);
        assert_eq!(conns.len(), 2);
        assert_eq!(conns[0].to_string(), "Listen tcp :::111");
        assert_eq!(conns[1].to_string(), "tcp ::1:40498 <-> ::1:111");
    }

    #[test]
    fn test_unknown_state_is_preserved() {
        let content = "   0: 00000000:0016 00000000:0000 F3 00000000:00000000 00:00000000 00000000     0        0 12345 1 0000000000000000 100 0 0 10 0\n";
        let conns = parse_conn_table(content, ConnProto::Tcp, 4);
        assert_eq!(conns.len(), 1);
        assert_eq!(conns[0].state, ConnState::Other(0xF3));
    }

    #[test]
    fn test_wrong_address_width_rows_are_skipped() {
        // v4-width addresses in a table read as v6 must not produce rows.
        let conns = parse_conn_table(TCP_TABLE, ConnProto::Tcp, 16);
        assert!(conns.is_empty());
    }

    #[test]
    fn test_parse_net_snmp() {
        let content = "\
Ip: Forwarding DefaultTTL InReceives InHdrErrors InAddrErrors ForwDatagrams InUnknownProtos InDiscards InDelivers OutRequests OutDiscards OutNoRoutes
Ip: 1 64 1000 1 2 3 4 5 990 800 6 7
Icmp: InMsgs InErrors InDestUnreachs OutMsgs OutErrors OutDestUnreachs
Icmp: 50 1 40 60 2 55
Tcp: RtoAlgorithm ActiveOpens PassiveOpens AttemptFails EstabResets CurrEstab InSegs OutSegs RetransSegs InErrs OutRsts
Tcp: 1 100 200 10 5 42 5000 4800 20 3 8
Udp: InDatagrams NoPorts InErrors OutDatagrams RcvbufErrors SndbufErrors
Udp: 700 11 1 650 2 3
";
        let stats = parse_net_snmp(content);
        assert_eq!(stats.ip.in_receives, 1000);
        assert_eq!(stats.ip.forw_datagrams, 3);
        assert_eq!(stats.ip.out_no_routes, 7);
        assert_eq!(stats.icmp.in_dest_unreachs, 40);
        assert_eq!(stats.icmp.out_errors, 2);
        assert_eq!(stats.tcp.active_opens, 100);
        assert_eq!(stats.tcp.curr_estab, 42);
        assert_eq!(stats.tcp.out_rsts, 8);
        assert_eq!(stats.udp.in_datagrams, 700);
        assert_eq!(stats.udp.sndbuf_errors, 3);
    }

    #[test]
    fn test_parse_net_snmp6() {
        let content = "\
Ip6InReceives                   \t2000
Ip6InHdrErrors                  \t1
Ip6OutForwDatagrams             \t9
Ip6OutRequests                  \t1500
Icmp6InMsgs                     \t80
Icmp6OutMsgs                    \t90
Icmp6InDestUnreachs             \t4
Udp6InDatagrams                 \t300
Udp6OutDatagrams                \t280
Udp6NoPorts                     \t2
";
        let stats = parse_net_snmp6(content);
        assert_eq!(stats.ip.in_receives, 2000);
        assert_eq!(stats.ip.forw_datagrams, 9);
        assert_eq!(stats.ip.out_requests, 1500);
        assert_eq!(stats.icmp.in_msgs, 80);
        assert_eq!(stats.icmp.in_dest_unreachs, 4);
        assert_eq!(stats.udp.in_datagrams, 300);
        assert_eq!(stats.udp.no_ports, 2);
        // No v6 counterparts exist for these.
        assert_eq!(stats.tcp, Default::default());
        assert_eq!(stats.icmp.out_errors, 0);
        assert_eq!(stats.udp.rcvbuf_errors, 0);
    }
}
