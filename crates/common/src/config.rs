//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Token signing configuration.
    pub auth: AuthConfig,
    /// Session cookie policy.
    #[serde(default)]
    pub cookies: CookieConfig,
    /// Content processing configuration.
    #[serde(default)]
    pub content: ContentConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
    /// Allowed CORS origin for the web client. `None` allows any origin.
    #[serde(default)]
    pub cors_origin: Option<String>,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Access/refresh token configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for access tokens.
    pub access_token_secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_secs: i64,
    /// HMAC secret for refresh tokens.
    pub refresh_token_secret: String,
    /// Refresh token lifetime in seconds.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_secs: i64,
}

/// `SameSite` attribute applied to session cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    /// Same-site requests only.
    Strict,
    /// Top-level navigations may carry the cookie.
    Lax,
    /// Cross-site requests carry the cookie (requires `Secure`).
    None,
}

/// Session cookie policy.
#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    /// Mark cookies `Secure`.
    #[serde(default = "default_true")]
    pub secure: bool,
    /// `SameSite` attribute.
    #[serde(default = "default_same_site")]
    pub same_site: SameSitePolicy,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: true,
            same_site: default_same_site(),
        }
    }
}

/// Content processing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// Words ignored by tag extraction.
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            stop_words: default_stop_words(),
        }
    }
}

/// Built-in English stop words used when none are configured.
pub const DEFAULT_STOP_WORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "but", "by", "can", "could", "did", "do", "does", "for", "from", "had",
    "has", "have", "he", "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just",
    "me", "my", "no", "not", "of", "on", "or", "our", "out", "she", "so", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "to", "too", "up", "us", "was",
    "we", "were", "what", "when", "which", "who", "will", "with", "you", "your",
];

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    8000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_access_ttl() -> i64 {
    60 * 60 * 24
}

const fn default_refresh_ttl() -> i64 {
    60 * 60 * 24 * 10
}

const fn default_true() -> bool {
    true
}

const fn default_same_site() -> SameSitePolicy {
    SameSitePolicy::None
}

fn default_stop_words() -> Vec<String> {
    DEFAULT_STOP_WORDS.iter().map(|w| (*w).to_string()).collect()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `WAVYTV_ENV`)
    /// 3. Environment variables with `WAVYTV__` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("WAVYTV_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("WAVYTV")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("WAVYTV")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_for_optional_sections() {
        let raw = r#"{
            "server": { "url": "https://wavy.example" },
            "database": { "url": "postgres://localhost/wavytv" },
            "auth": { "access_token_secret": "a", "refresh_token_secret": "r" }
        }"#;
        let config: Config = serde_json::from_str(raw).unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.max_connections, 100);
        assert_eq!(config.auth.access_token_ttl_secs, 86_400);
        assert_eq!(config.auth.refresh_token_ttl_secs, 864_000);
        assert!(config.cookies.secure);
        assert_eq!(config.cookies.same_site, SameSitePolicy::None);
        assert!(config.content.stop_words.contains(&"the".to_string()));
    }

    #[test]
    fn test_same_site_parses_lowercase() {
        let policy: SameSitePolicy = serde_json::from_str("\"lax\"").unwrap();
        assert_eq!(policy, SameSitePolicy::Lax);
    }
}
