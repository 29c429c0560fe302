//! Per-client-IP rate limiting.
//!
//! Limits are GCRA buckets from `tower_governor`: a rule of `max` requests per
//! `window` allows a burst of `max` and replenishes one request every
//! `window / max`. Clients are keyed by `SmartIpKeyExtractor`, which prefers
//! forwarding headers and falls back to the peer address.

use std::time::Duration;

use axum::{
    extract::Request,
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Header `tower_governor` uses for the wait time on rejected requests
const RATE_LIMIT_AFTER: &str = "x-ratelimit-after";

/// `max` requests per `window` for one client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRule {
    pub max: u32,
    pub window: Duration,
}

impl RateLimitRule {
    pub const fn new(max: u32, window_secs: u64) -> Self {
        Self {
            max,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Time for one request to be replenished, never below one millisecond
    pub fn replenish_interval_ms(&self) -> u64 {
        let window_ms = u64::try_from(self.window.as_millis()).unwrap_or(u64::MAX);
        (window_ms / u64::from(self.max.max(1))).max(1)
    }
}

/// Rules per route class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    pub login: RateLimitRule,
    pub password_reset: RateLimitRule,
    pub api: RateLimitRule,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            login: RateLimitRule::new(5, 15 * 60),
            password_reset: RateLimitRule::new(3, 60 * 60),
            api: RateLimitRule::new(200, 15 * 60),
        }
    }
}

/// Build a `GovernorLayer` for a [`RateLimitRule`].
///
/// A macro rather than a function so the layer's generic parameters never
/// have to be spelled out.
#[macro_export]
macro_rules! rate_limit_layer {
    ($rule:expr) => {{
        let rule: $crate::middleware::rate_limit::RateLimitRule = $rule;
        let config = ::tower_governor::governor::GovernorConfigBuilder::default()
            .per_millisecond(rule.replenish_interval_ms())
            .burst_size(rule.max.max(1))
            .key_extractor(::tower_governor::key_extractor::SmartIpKeyExtractor)
            .use_headers()
            .finish()
            .expect("rate limit rules have a non-zero period and burst");
        ::tower_governor::GovernorLayer::new(::std::sync::Arc::new(config))
    }};
}

/// Rewrite 429 responses from the governor into the JSON error envelope,
/// keeping its rate-limit headers and guaranteeing a `Retry-After`.
pub async fn rate_limit_envelope(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let mut headers = response.headers().clone();
    headers.remove(header::CONTENT_TYPE);
    headers.remove(header::CONTENT_LENGTH);

    if !headers.contains_key(header::RETRY_AFTER) {
        let after = headers
            .get(RATE_LIMIT_AFTER)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("60"));
        headers.insert(header::RETRY_AFTER, after);
    }

    let mut envelope = ApiError::RateLimited.into_response();
    envelope.headers_mut().extend(headers);
    envelope
}
