use std::net::{IpAddr, Ipv4Addr};

/// Loopback, RFC 1918, IPv6 link-local and unique-local addresses.
pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_loopback() || v4.is_private(),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_private_ip(IpAddr::V4(v4)),
            None => {
                let first = v6.segments()[0];
                v6.is_loopback() || (first & 0xffc0) == 0xfe80 || (first & 0xfe00) == 0xfc00
            }
        },
    }
}

/// Address to advertise in a PASV reply.
///
/// Peers on a private network get the interface address their control
/// connection arrived on, everybody else gets the public address.
pub fn pasv_reply_ip(peer: IpAddr, local: IpAddr, public_ip: Ipv4Addr) -> Ipv4Addr {
    if !is_private_ip(peer) {
        return public_ip;
    }
    let local = match local {
        IpAddr::V4(v4) => Some(v4),
        IpAddr::V6(v6) => v6.to_ipv4_mapped(),
    };
    match local {
        Some(v4) if !v4.is_unspecified() => v4,
        _ => public_ip,
    }
}

/// `(h1,h2,h3,h4,p1,p2)` with `p1 = port / 256` and `p2 = port % 256`.
pub fn encode_pasv_address(ip: Ipv4Addr, port: u16) -> String {
    let [h1, h2, h3, h4] = ip.octets();
    format!("({},{},{},{},{},{})", h1, h2, h3, h4, port / 256, port % 256)
}
