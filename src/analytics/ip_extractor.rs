//! Client IP extraction from HTTP headers
//!
//! Prefers the leftmost valid X-Forwarded-For entry (the originating
//! client as reported by the proxy chain) and falls back to the socket
//! remote address when the header is absent or unparsable.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Extract the client IP address from request headers
///
/// # Arguments
/// * `headers` - HTTP request headers
/// * `socket_addr` - The socket remote address (fallback)
pub fn extract_client_ip(headers: &HeaderMap, socket_addr: IpAddr) -> IpAddr {
    extract_from_x_forwarded_for(headers).unwrap_or(socket_addr)
}

fn extract_from_x_forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    let xff = headers.get("x-forwarded-for")?.to_str().ok()?;

    xff.split(',').find_map(|entry| entry.trim().parse::<IpAddr>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn falls_back_to_socket_address() {
        let headers = HeaderMap::new();
        let socket_addr: IpAddr = "192.168.1.1".parse().unwrap();

        assert_eq!(extract_client_ip(&headers, socket_addr), socket_addr);
    }

    #[test]
    fn takes_leftmost_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.1, 198.51.100.1"),
        );
        let socket_addr: IpAddr = "192.168.1.1".parse().unwrap();

        let result = extract_client_ip(&headers, socket_addr);
        assert_eq!(result, "203.0.113.1".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn skips_garbage_entries() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("unknown, 198.51.100.1"),
        );
        let socket_addr: IpAddr = "192.168.1.1".parse().unwrap();

        let result = extract_client_ip(&headers, socket_addr);
        assert_eq!(result, "198.51.100.1".parse::<IpAddr>().unwrap());
    }
}
