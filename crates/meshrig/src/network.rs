//! Network utilities shared by the harness servers.
//!
//! Listeners are created through `socket2` so `SO_REUSEADDR` can be set:
//! restarting the harness must not fail on sockets lingering in `TIME_WAIT`,
//! while a port held by a live listener still fails to bind.

use socket2::{Domain, Protocol, Socket, Type};
use std::net::SocketAddr;
use tokio::net::TcpListener;

const LISTEN_BACKLOG: i32 = 1024;

/// Create a non-blocking TCP listener bound to `addr`.
///
/// Must be called from within a tokio runtime.
pub fn create_listener(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

/// Parse a listen address of the form `host:port` or `:port`.
///
/// A missing host binds every interface.
pub fn parse_listen_addr(addr: &str) -> Option<SocketAddr> {
    if let Some(port) = addr.strip_prefix(':') {
        let port: u16 = port.parse().ok()?;
        return Some(SocketAddr::from(([0, 0, 0, 0], port)));
    }
    addr.parse().ok()
}

/// Any-interface address for `port`.
pub fn any_addr(port: u16) -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listen_addr_port_only() {
        let addr = parse_listen_addr(":15010").unwrap();
        assert_eq!(addr, SocketAddr::from(([0, 0, 0, 0], 15010)));
    }

    #[test]
    fn test_parse_listen_addr_with_host() {
        let addr = parse_listen_addr("127.0.0.1:9000").unwrap();
        assert_eq!(addr, SocketAddr::from(([127, 0, 0, 1], 9000)));
    }

    #[test]
    fn test_parse_listen_addr_invalid() {
        assert!(parse_listen_addr(":notaport").is_none());
        assert!(parse_listen_addr("localhost").is_none());
        assert!(parse_listen_addr("").is_none());
    }

    #[tokio::test]
    async fn test_create_listener_rejects_port_in_use() {
        let first = create_listener(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
        let addr = first.local_addr().unwrap();
        assert!(create_listener(addr).is_err());
    }
}
