//! HTTP API layer for wavyTV.
//!
//! - **Endpoints**: REST resources for accounts, videos, posts, comments,
//!   votes, follows, playlists, history and search
//! - **Extractors**: authenticated caller, pagination, JSON bodies
//! - **Middleware**: session authentication, rate limiting
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod cookies;
pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod rate_limit;
pub mod response;

use axum::Router;

pub use cookies::SessionCookies;
pub use endpoints::router;
pub use middleware::AppState;
pub use rate_limit::{ApiRateLimiter, RateLimitConfig, RateLimiterState};

/// Path prefix of every endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// The API under [`API_PREFIX`] with authentication and rate limiting.
///
/// Authentication runs first so the rate limiter can count signed-in callers
/// per user.
pub fn app(state: AppState, rate_limiter: RateLimiterState) -> Router {
    Router::new()
        .nest(API_PREFIX, router())
        .layer(axum::middleware::from_fn_with_state(
            rate_limiter,
            rate_limit::rate_limit_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .with_state(state)
}
