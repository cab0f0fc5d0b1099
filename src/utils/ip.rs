//! IP 地址处理工具
//!
//! - 私有 / 本地地址检测
//! - 隐私泛化：IPv4 → /24，IPv6 → /64

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// 检查 IP 是否为私有地址、loopback 或 link-local
pub fn is_private_or_local(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_or_local_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => is_private_or_local_v4(&v4),
            None => is_private_or_local_v6(v6),
        },
    }
}

fn is_private_or_local_v4(v4: &Ipv4Addr) -> bool {
    v4.is_private() || v4.is_loopback() || v4.is_link_local() || v4.is_unspecified()
}

fn is_private_or_local_v6(v6: &Ipv6Addr) -> bool {
    // - fc00::/7 (ULA, RFC 4193)
    // - fe80::/10 (Link-local)
    // - ::1 (Loopback)
    v6.is_loopback()
        || v6.is_unspecified()
        || (v6.segments()[0] & 0xfe00) == 0xfc00
        || (v6.segments()[0] & 0xffc0) == 0xfe80
}

/// 解析 IP，兼容 `ip:port`、`[v6]:port` 以及 IPv4-mapped IPv6（`::ffff:1.2.3.4`）
fn parse_ip(raw: &str) -> Option<IpAddr> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let ip = raw
        .parse::<IpAddr>()
        .ok()
        .or_else(|| raw.parse::<SocketAddr>().ok().map(|s| s.ip()))?;

    match ip {
        IpAddr::V6(v6) => Some(
            v6.to_ipv4_mapped()
                .map(IpAddr::V4)
                .unwrap_or(IpAddr::V6(v6)),
        ),
        v4 => Some(v4),
    }
}

/// Generalize a client IP into a network prefix
///
/// - IPv4: last octet zeroed, e.g. `203.0.113.0/24`
/// - IPv6: first four groups kept, e.g. `2001:db8:85a3:8d3::/64`
/// - unparsable input: `None`
pub fn generalize_ip(raw: &str) -> Option<String> {
    match parse_ip(raw)? {
        IpAddr::V4(v4) => {
            let [a, b, c, _] = v4.octets();
            Some(format!("{}.{}.{}.0/24", a, b, c))
        }
        IpAddr::V6(v6) => {
            let s = v6.segments();
            Some(format!("{:x}:{:x}:{:x}:{:x}::/64", s[0], s[1], s[2], s[3]))
        }
    }
}
