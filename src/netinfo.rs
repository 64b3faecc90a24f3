// Host and peer network metadata

use crate::session::types::ServerInfo;
use std::net::{IpAddr, Ipv4Addr};
use tracing::warn;

/// Resolve the host's network identity: the first non-loopback IPv4
/// interface and its hardware address. Recomputed on every call so a
/// host networking change shows up on the next read.
pub fn server_info() -> ServerInfo {
    let interfaces = match if_addrs::get_if_addrs() {
        Ok(interfaces) => interfaces,
        Err(e) => {
            warn!("Failed to enumerate network interfaces: {}", e);
            return ServerInfo { ip: None, mac: None };
        }
    };

    for iface in interfaces {
        if iface.is_loopback() {
            continue;
        }

        if let IpAddr::V4(addr) = iface.ip() {
            let mac = match mac_address::mac_address_by_name(&iface.name) {
                Ok(mac) => mac.map(|m| m.to_string()),
                Err(e) => {
                    warn!("Failed to read hardware address of {}: {}", iface.name, e);
                    None
                }
            };

            return ServerInfo {
                ip: Some(addr.to_string()),
                mac,
            };
        }
    }

    ServerInfo { ip: None, mac: None }
}

/// Display address for a peer. IPv4-mapped IPv6 peers are unwrapped to
/// plain IPv4; loopback or unknown peers fall back to the server's own
/// address so locally driven sessions still carry a routable IP.
pub fn client_ip(peer: Option<IpAddr>, server: &ServerInfo) -> String {
    let addr = match peer {
        Some(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        },
        Some(addr) => addr,
        None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
    };

    if addr.is_loopback() || addr.is_unspecified() {
        if let Some(ip) = &server.ip {
            return ip.clone();
        }
    }

    addr.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    fn server() -> ServerInfo {
        ServerInfo {
            ip: Some("10.0.0.2".to_string()),
            mac: Some("11:22:33:44:55:66".to_string()),
        }
    }

    #[test]
    fn test_plain_ipv4_passes_through() {
        let peer = Some(IpAddr::V4(Ipv4Addr::new(203, 0, 113, 9)));
        assert_eq!(client_ip(peer, &server()), "203.0.113.9");
    }

    #[test]
    fn test_ipv4_mapped_ipv6_is_unwrapped() {
        let peer = Some(IpAddr::V6(
            "::ffff:203.0.113.9".parse::<Ipv6Addr>().unwrap(),
        ));
        assert_eq!(client_ip(peer, &server()), "203.0.113.9");
    }

    #[test]
    fn test_loopback_falls_back_to_server_ip() {
        let v4 = Some(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(client_ip(v4, &server()), "10.0.0.2");

        let v6 = Some(IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(client_ip(v6, &server()), "10.0.0.2");

        // Mapped loopback gets unwrapped first, then falls back
        let mapped = Some(IpAddr::V6(
            "::ffff:127.0.0.1".parse::<Ipv6Addr>().unwrap(),
        ));
        assert_eq!(client_ip(mapped, &server()), "10.0.0.2");
    }

    #[test]
    fn test_loopback_without_server_ip() {
        let no_server = ServerInfo { ip: None, mac: None };
        let peer = Some(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(client_ip(peer, &no_server), "127.0.0.1");
    }

    #[test]
    fn test_unknown_peer_falls_back_to_server_ip() {
        assert_eq!(client_ip(None, &server()), "10.0.0.2");

        let no_server = ServerInfo { ip: None, mac: None };
        assert_eq!(client_ip(None, &no_server), "0.0.0.0");
    }
}
