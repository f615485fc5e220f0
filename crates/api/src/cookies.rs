//! Session cookies carrying the access and refresh tokens.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use wavytv_common::config::{CookieConfig, SameSitePolicy};
use wavytv_core::TokenPair;

/// Cookie holding the access token.
pub const ACCESS_COOKIE: &str = "accessToken";

/// Cookie holding the refresh token.
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Writes and clears the http-only session cookies under a fixed policy.
#[derive(Debug, Clone, Copy)]
pub struct SessionCookies {
    secure: bool,
    same_site: SameSite,
}

impl SessionCookies {
    #[must_use]
    pub const fn new(config: &CookieConfig) -> Self {
        let same_site = match config.same_site {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        };
        Self {
            secure: config.secure,
            same_site,
        }
    }

    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .path("/")
            .build()
    }

    /// Set both token cookies.
    #[must_use]
    pub fn set(&self, jar: CookieJar, tokens: &TokenPair) -> CookieJar {
        jar.add(self.cookie(ACCESS_COOKIE, tokens.access_token.clone()))
            .add(self.cookie(REFRESH_COOKIE, tokens.refresh_token.clone()))
    }

    /// Expire both token cookies.
    #[must_use]
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(ACCESS_COOKIE).path("/"))
            .remove(Cookie::build(REFRESH_COOKIE).path("/"))
    }
}
