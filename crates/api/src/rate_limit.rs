//! API rate limiting middleware.
//!
//! Fixed-window counters kept in memory, keyed by the authenticated user or
//! the client IP. Each request falls into one bucket with its own limit.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Method, Request, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;
use wavytv_common::AppError;
use wavytv_db::entities::user;

/// Rate limit configuration for one bucket of endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Bucket name, part of the counter key.
    pub bucket: &'static str,
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Time window duration in seconds.
    pub window_secs: u64,
}

impl RateLimitConfig {
    /// Create a new rate limit config.
    pub const fn new(bucket: &'static str, max_requests: u32, window_secs: u64) -> Self {
        Self {
            bucket,
            max_requests,
            window_secs,
        }
    }
}

/// Default rate limits for different endpoint categories.
pub mod limits {
    use super::RateLimitConfig;

    /// Reads.
    pub const STANDARD: RateLimitConfig = RateLimitConfig::new("standard", 300, 60);

    /// Writes (upload, comment, vote, follow, ...).
    pub const WRITE: RateLimitConfig = RateLimitConfig::new("write", 60, 60);

    /// Search queries.
    pub const HEAVY: RateLimitConfig = RateLimitConfig::new("heavy", 30, 60);

    /// Signup, login, refresh and logout.
    pub const AUTH: RateLimitConfig = RateLimitConfig::new("auth", 10, 300);

    /// The longest window of any bucket.
    pub const MAX_WINDOW_SECS: u64 = 300;
}

/// Pick the bucket for a request.
#[must_use]
pub fn limit_for(method: &Method, path: &str) -> &'static RateLimitConfig {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    if segments.clone().any(|s| s == "auth") {
        &limits::AUTH
    } else if segments.any(|s| s == "search") {
        &limits::HEAVY
    } else if method == Method::GET || method == Method::HEAD {
        &limits::STANDARD
    } else {
        &limits::WRITE
    }
}

/// Rate limit state for a single key.
#[derive(Debug, Clone)]
struct RateLimitState {
    /// Request count in current window.
    count: u32,
    /// Window start time.
    window_start: Instant,
}

impl RateLimitState {
    fn new() -> Self {
        Self {
            count: 0,
            window_start: Instant::now(),
        }
    }
}

/// API rate limiter.
#[derive(Clone)]
pub struct ApiRateLimiter {
    /// State per key.
    states: Arc<RwLock<HashMap<String, RateLimitState>>>,
}

impl Default for ApiRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiRateLimiter {
    /// Create a new rate limiter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Check if a request is allowed and record it.
    pub async fn check(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let mut states = self.states.write().await;
        let now = Instant::now();
        let window = Duration::from_secs(config.window_secs);

        let state = states
            .entry(key.to_string())
            .or_insert_with(RateLimitState::new);

        // Check if window has expired
        if now.duration_since(state.window_start) >= window {
            state.count = 0;
            state.window_start = now;
        }

        let reset = window
            .saturating_sub(now.duration_since(state.window_start))
            .as_secs();

        if state.count >= config.max_requests {
            return RateLimitResult::Limited {
                retry_after: reset.max(1),
                limit: config.max_requests,
            };
        }

        state.count += 1;
        RateLimitResult::Allowed {
            remaining: config.max_requests.saturating_sub(state.count),
            limit: config.max_requests,
            reset,
        }
    }

    /// Drop keys whose window ended long ago.
    pub async fn cleanup(&self, max_window_secs: u64) {
        let mut states = self.states.write().await;
        let now = Instant::now();
        let max_window = Duration::from_secs(max_window_secs * 2);

        states.retain(|_, state| now.duration_since(state.window_start) < max_window);
    }

    /// Get the number of tracked keys.
    pub async fn key_count(&self) -> usize {
        self.states.read().await.len()
    }
}

/// Rate limit check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    Allowed {
        /// Remaining requests in window.
        remaining: u32,
        limit: u32,
        /// Seconds until window reset.
        reset: u64,
    },
    Limited {
        /// Seconds until the window resets.
        retry_after: u64,
        limit: u32,
    },
}

/// Rate limiter state for middleware.
#[derive(Clone, Default)]
pub struct RateLimiterState {
    /// Per-user rate limiter.
    pub user_limiter: ApiRateLimiter,
    /// Per-IP rate limiter (for anonymous requests).
    pub ip_limiter: ApiRateLimiter,
}

impl RateLimiterState {
    /// Create a new rate limiter state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop stale counters from both limiters.
    pub async fn cleanup(&self) {
        self.user_limiter.cleanup(limits::MAX_WINDOW_SECS).await;
        self.ip_limiter.cleanup(limits::MAX_WINDOW_SECS).await;
    }
}

/// Rate limit error response.
#[derive(Debug)]
pub struct RateLimitError {
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let mut response = AppError::RateLimited.into_response();
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(self.retry_after));
        response
    }
}

/// Extract client IP from proxy headers, falling back to the peer address.
fn extract_client_ip(req: &Request<Body>) -> Option<IpAddr> {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok());

    forwarded.or_else(|| {
        req.headers()
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|ip| ip.trim().parse().ok())
    })
    .or_else(|| {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
    })
}

/// Rate limiting middleware.
///
/// Runs inside the auth middleware so that authenticated callers are counted
/// by user rather than by address.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiterState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, RateLimitError> {
    let config = limit_for(req.method(), req.uri().path());

    let (limiter, key) = if let Some(user) = req.extensions().get::<user::Model>() {
        (&limiter.user_limiter, format!("{}:user:{}", config.bucket, user.id))
    } else {
        let ip = extract_client_ip(&req).map_or_else(|| "unknown".to_string(), |ip| ip.to_string());
        (&limiter.ip_limiter, format!("{}:ip:{ip}", config.bucket))
    };

    match limiter.check(&key, config).await {
        RateLimitResult::Allowed {
            remaining,
            limit,
            reset,
        } => {
            let mut response = next.run(req).await;

            let headers = response.headers_mut();
            headers.insert("X-RateLimit-Limit", limit.into());
            headers.insert("X-RateLimit-Remaining", remaining.into());
            headers.insert("X-RateLimit-Reset", reset.into());

            Ok(response)
        }
        RateLimitResult::Limited { retry_after, .. } => {
            tracing::debug!(key = %key, retry_after, "Rate limited");
            Err(RateLimitError { retry_after })
        }
    }
}
