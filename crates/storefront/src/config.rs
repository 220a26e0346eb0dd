//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront (default: <http://localhost:3000>)
//! - `STOREFRONT_UPLOAD_DELAY_MS` - Simulated prescription upload latency (default: 1500)
//! - `STOREFRONT_MAX_UPLOAD_BYTES` - Largest accepted prescription file (default: 10 MiB)
//! - `STOREFRONT_CONTENT_DIR` - Markdown content root (default: crates/storefront/content)
//! - `STOREFRONT_STATIC_DIR` - Static asset root (default: crates/storefront/static)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_UPLOAD_DELAY_MS: &str = "1500";
const DEFAULT_MAX_UPLOAD_BYTES: &str = "10485760";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// How long the simulated prescription store takes per upload
    pub upload_delay: Duration,
    /// Largest multipart body accepted by the upload route
    pub max_upload_bytes: usize,
    /// Root of the markdown content (`pages/*.md`)
    pub content_dir: PathBuf,
    /// Root of the static assets served under `/static`
    pub static_dir: PathBuf,
    /// Sentry error tracking
    pub sentry: SentryConfig,
}

/// Sentry configuration.
///
/// Implements `Debug` manually to redact the DSN, which embeds the project key.
#[derive(Clone, Default)]
pub struct SentryConfig {
    pub dsn: Option<String>,
    pub environment: Option<String>,
    pub sample_rate: f32,
    pub traces_sample_rate: f32,
}

impl std::fmt::Debug for SentryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryConfig")
            .field("dsn", &self.dsn.as_ref().map(|_| "[REDACTED]"))
            .field("environment", &self.environment)
            .field("sample_rate", &self.sample_rate)
            .field("traces_sample_rate", &self.traces_sample_rate)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to a value that fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for unparsable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let host = env.parse_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parse_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let base_url = env.get_or_default("STOREFRONT_BASE_URL", "http://localhost:3000");
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_BASE_URL".to_string(),
                "must start with http:// or https://".to_string(),
            ));
        }
        let upload_delay_ms =
            env.parse_or_default::<u64>("STOREFRONT_UPLOAD_DELAY_MS", DEFAULT_UPLOAD_DELAY_MS)?;
        let max_upload_bytes =
            env.parse_or_default::<usize>("STOREFRONT_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        let sentry = SentryConfig {
            dsn: env.get_optional("SENTRY_DSN"),
            environment: env.get_optional("SENTRY_ENVIRONMENT"),
            sample_rate: env.parse_rate("SENTRY_SAMPLE_RATE", "1.0")?,
            traces_sample_rate: env.parse_rate("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        };

        Ok(Self {
            host,
            port,
            base_url,
            upload_delay: Duration::from_millis(upload_delay_ms),
            max_upload_bytes,
            content_dir: env
                .get_or_default("STOREFRONT_CONTENT_DIR", "crates/storefront/content")
                .into(),
            static_dir: env
                .get_or_default("STOREFRONT_STATIC_DIR", "crates/storefront/static")
                .into(),
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable. Empty values count as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or_default<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get_or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Parse a sample rate in `0.0..=1.0`.
    fn parse_rate(&self, key: &str, default: &str) -> Result<f32, ConfigError> {
        let rate = self.parse_or_default::<f32>(key, default)?;
        if (0.0..=1.0).contains(&rate) {
            Ok(rate)
        } else {
            Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("{rate} is outside 0.0-1.0"),
            ))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.upload_delay, Duration::from_millis(1500));
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
        assert!(config.sentry.dsn.is_none());
        assert!((config.sentry.sample_rate - 1.0).abs() < f32::EPSILON);
        assert!(!config.is_https());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8080"),
            ("STOREFRONT_BASE_URL", "https://shop.example.com"),
            ("STOREFRONT_UPLOAD_DELAY_MS", "0"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.upload_delay, Duration::ZERO);
        assert!(config.is_https());
    }

    #[test]
    fn test_empty_value_uses_default() {
        let config = load(&[("STOREFRONT_PORT", "  ")]).unwrap();
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[("STOREFRONT_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = load(&[("STOREFRONT_BASE_URL", "shop.example.com")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_sample_rate_out_of_range() {
        let err = load(&[("SENTRY_TRACES_SAMPLE_RATE", "1.5")]).unwrap_err();
        assert!(err.to_string().contains("SENTRY_TRACES_SAMPLE_RATE"));
    }

    #[test]
    fn test_sentry_config_debug_redacts_dsn() {
        let config = load(&[
            ("SENTRY_DSN", "https://publickey@o0.ingest.sentry.io/0"),
            ("SENTRY_ENVIRONMENT", "staging"),
        ])
        .unwrap();

        let debug_output = format!("{:?}", config.sentry);
        assert!(debug_output.contains("staging"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("publickey"));
    }
}
