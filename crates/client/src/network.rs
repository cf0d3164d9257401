//! Local address selection for the data channel.

use std::net::{IpAddr, Ipv4Addr};

/// Returns local non-loopback IPv4 addresses, excluding link-local (169.254.x.x).
pub fn get_local_ips() -> Vec<IpAddr> {
    let Ok(interfaces) = if_addrs::get_if_addrs() else {
        return Vec::new();
    };

    interfaces
        .into_iter()
        .filter(|iface| !iface.is_loopback())
        .filter_map(|iface| match iface.ip() {
            IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_link_local() => Some(IpAddr::V4(v4)),
            _ => None,
        })
        .collect()
}

/// Picks the address to advertise to a server at `server`.
///
/// A loopback server gets the same loopback address back; otherwise the
/// first usable interface address is used.
pub fn advertise_address(server: IpAddr) -> IpAddr {
    if server.is_loopback() {
        return server;
    }

    match get_local_ips().into_iter().next() {
        Some(ip) => ip,
        None => {
            tracing::warn!("no usable interface address, advertising loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv6Addr;

    use super::*;

    #[test]
    fn loopback_server_gets_loopback() {
        let v4 = IpAddr::V4(Ipv4Addr::LOCALHOST);
        assert_eq!(advertise_address(v4), v4);

        let v6 = IpAddr::V6(Ipv6Addr::LOCALHOST);
        assert_eq!(advertise_address(v6), v6);
    }

    #[test]
    fn local_ips_exclude_loopback_and_link_local() {
        for ip in get_local_ips() {
            let IpAddr::V4(v4) = ip else {
                panic!("unexpected non-IPv4 address {ip}");
            };
            assert!(!v4.is_loopback());
            assert!(!v4.is_link_local());
        }
    }
}
