use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;

use crate::config::{AppState, Config};
use crate::utils::api_response::ResponseBuilder;
use crate::utils::client_info::client_ip;

/// Sliding-window request counter keyed by client address.
pub struct RateLimiter {
    requests: RwLock<HashMap<String, Vec<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            requests: RwLock::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(cfg.rate_limit_max_requests, Duration::from_secs(cfg.rate_limit_window_secs))
    }

    pub async fn check_rate_limit(&self, identifier: &str) -> bool {
        self.check_at(identifier, Instant::now()).await
    }

    async fn check_at(&self, identifier: &str, now: Instant) -> bool {
        let mut requests = self.requests.write().await;
        let cutoff = now.checked_sub(self.window).unwrap_or(now);

        // Idle clients are dropped lazily so the map does not grow unbounded.
        requests.retain(|_, hits| hits.last().is_some_and(|t| *t > cutoff));

        let entry = requests.entry(identifier.to_string()).or_default();
        entry.retain(|&timestamp| timestamp > cutoff);

        if entry.len() >= self.max_requests {
            return false;
        }

        entry.push(now);
        true
    }
}

pub async fn rate_limit_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let identifier = client_ip(request.headers(), remote);

    if !state.rate_limiter.check_rate_limit(&identifier).await {
        tracing::warn!("Rate limit exceeded for {}", identifier);
        return ResponseBuilder::error::<()>(
            StatusCode::TOO_MANY_REQUESTS,
            "RATE_LIMIT_EXCEEDED",
            "Too many requests. Please try again later.",
        )
        .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blocks_after_limit_within_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check_at("1.1.1.1", now).await);
        assert!(limiter.check_at("1.1.1.1", now).await);
        assert!(!limiter.check_at("1.1.1.1", now).await);
        assert!(limiter.check_at("2.2.2.2", now).await);
    }

    #[tokio::test]
    async fn window_slides() {
        let limiter = RateLimiter::new(1, Duration::from_secs(10));
        let start = Instant::now();
        assert!(limiter.check_at("ip", start).await);
        assert!(!limiter.check_at("ip", start + Duration::from_secs(5)).await);
        assert!(limiter.check_at("ip", start + Duration::from_secs(11)).await);
    }
}
