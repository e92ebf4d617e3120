use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};

/// Caller address and user agent, as recorded on views and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip: String,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn new(ip: impl Into<String>, user_agent: Option<&str>) -> Self {
        Self {
            ip: ip.into(),
            user_agent: user_agent.map(str::to_string),
        }
    }
}

/// First hop of `X-Forwarded-For` when it parses as an address, then the socket peer address.
pub fn client_ip(headers: &HeaderMap, remote: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
        .map(|ip| ip.to_string())
        .or_else(|| remote.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "0.0.0.0".to_string())
}

impl<S: Send + Sync> FromRequestParts<S> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let remote = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        let ip = client_ip(&parts.headers, remote);
        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|h| h.to_str().ok());
        Ok(ClientInfo::new(ip, user_agent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        let remote: SocketAddr = "127.0.0.1:5000".parse().unwrap();
        assert_eq!(client_ip(&headers, Some(remote)), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_peer_then_placeholder() {
        let headers = HeaderMap::new();
        let remote: SocketAddr = "192.168.1.9:5000".parse().unwrap();
        assert_eq!(client_ip(&headers, Some(remote)), "192.168.1.9");
        assert_eq!(client_ip(&headers, None), "0.0.0.0");
    }

    #[test]
    fn ignores_forwarded_header_that_is_not_an_address() {
        let mut headers = HeaderMap::new();
        let junk = "x".repeat(60);
        headers.insert("x-forwarded-for", HeaderValue::from_str(&junk).unwrap());
        let remote: SocketAddr = "192.168.1.9:5000".parse().unwrap();
        assert_eq!(client_ip(&headers, Some(remote)), "192.168.1.9");

        headers.insert("x-forwarded-for", HeaderValue::from_static("unknown, 203.0.113.7"));
        assert_eq!(client_ip(&headers, None), "0.0.0.0");
    }
}
