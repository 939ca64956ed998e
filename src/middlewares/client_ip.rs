use actix_web::HttpRequest;
use std::net::{IpAddr, SocketAddr};

/// Set when the server sits behind a proxy that writes `Forwarded` /
/// `X-Forwarded-For`. Registered as app data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrustProxy(pub bool);

/// Client address without the port.
///
/// Forwarding headers are client-controlled unless a trusted proxy rewrites
/// them, so they are only read when `trust_proxy` is set. Otherwise the TCP
/// peer address is used.
pub fn client_ip(req: &HttpRequest, trust_proxy: bool) -> Option<String> {
    if trust_proxy {
        let info = req.connection_info();
        if let Some(raw) = info.realip_remote_addr() {
            return Some(strip_port(raw));
        }
    }
    req.peer_addr().map(|addr| addr.ip().to_string())
}

fn strip_port(raw: &str) -> String {
    if let Ok(addr) = raw.parse::<SocketAddr>() {
        return addr.ip().to_string();
    }
    if let Ok(ip) = raw.parse::<IpAddr>() {
        return ip.to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    fn peer() -> SocketAddr {
        "203.0.113.7:51234".parse().unwrap()
    }

    #[test]
    fn test_peer_address_without_port() {
        let req = TestRequest::default().peer_addr(peer()).to_http_request();
        assert_eq!(client_ip(&req, false).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_forwarded_header_ignored_unless_trusted() {
        let req = TestRequest::default()
            .peer_addr(peer())
            .insert_header(("X-Forwarded-For", "198.51.100.23"))
            .to_http_request();

        assert_eq!(client_ip(&req, false).as_deref(), Some("203.0.113.7"));
        assert_eq!(client_ip(&req, true).as_deref(), Some("198.51.100.23"));
    }

    #[test]
    fn test_trusted_without_header_falls_back_to_peer() {
        let req = TestRequest::default().peer_addr(peer()).to_http_request();
        assert_eq!(client_ip(&req, true).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("10.0.0.1:8080"), "10.0.0.1");
        assert_eq!(strip_port("[2001:db8::1]:443"), "2001:db8::1");
        assert_eq!(strip_port("2001:db8::1"), "2001:db8::1");
        assert_eq!(strip_port("unknown"), "unknown");
    }
}
