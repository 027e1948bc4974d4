//! LAN address discovery for the startup banner

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Address the embedded clients should be pointed at.
///
/// Connecting a UDP socket sends nothing; it only asks the OS which local
/// interface would route to the target.
pub fn local_ip() -> IpAddr {
    match discover_lan_ip() {
        Ok(ip) => ip,
        Err(e) => {
            tracing::debug!("LAN address lookup failed ({}), using loopback", e);
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        }
    }
}

fn discover_lan_ip() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.connect("8.8.8.8:80")?;
    Ok(socket.local_addr()?.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_ip_is_ipv4() {
        // Offline sandboxes fall back to loopback
        assert!(local_ip().is_ipv4());
    }
}
