//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `BASE_URL` - Public URL of the site
//! - `SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3000)
//! - `RESEND_API_KEY` - Resend API key; email is disabled without it
//! - `EMAIL_FROM` - Sender address (default: `Pandí Dorty <objednavky@pandidorty.cz>`)
//! - `ADMIN_NOTIFICATION_EMAILS` - Comma-separated recipients of new-order emails
//! - `WEDDING_TASTING_CAPACITY` - Maximum wedding tasting orders (default: 15)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_EMAIL_FROM: &str = "Pandí Dorty <objednavky@pandidorty.cz>";
const DEFAULT_WEDDING_TASTING_CAPACITY: u32 = 15;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Notification email settings
    pub email: EmailConfig,
    /// Maximum number of wedding tasting orders
    pub wedding_tasting_capacity: u32,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Log output format
    pub log_format: LogFormat,
}

/// Email delivery configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct EmailConfig {
    /// Resend API key; `None` disables sending
    pub resend_api_key: Option<SecretString>,
    /// Sender, e.g. `Pandí Dorty <objednavky@pandidorty.cz>`
    pub from_address: String,
    /// Bakery staff who receive new-order notifications
    pub admin_recipients: Vec<String>,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field(
                "resend_api_key",
                &self.resend_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("from_address", &self.from_address)
            .field("admin_recipients", &self.admin_recipients)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("DATABASE_URL")?);
        let host = get_env_or_default("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("BASE_URL")?;
        let session_secret = get_validated_secret("SESSION_SECRET")?;
        validate_session_secret(&session_secret, "SESSION_SECRET")?;

        let email = EmailConfig::from_env()?;
        let wedding_tasting_capacity = parse_capacity(get_optional_env("WEDDING_TASTING_CAPACITY"))?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            session_secret,
            email,
            wedding_tasting_capacity,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            log_format: LogFormat::from_env_value(get_optional_env("LOG_FORMAT").as_deref()),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl EmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let resend_api_key = match get_optional_env("RESEND_API_KEY") {
            Some(key) => {
                validate_secret_strength(&key, "RESEND_API_KEY")?;
                Some(SecretString::from(key))
            }
            None => None,
        };

        Ok(Self {
            resend_api_key,
            from_address: get_env_or_default("EMAIL_FROM", DEFAULT_EMAIL_FROM),
            admin_recipients: parse_recipients(
                get_optional_env("ADMIN_NOTIFICATION_EMAILS").as_deref(),
            ),
        })
    }

    /// Configuration with sending disabled.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            resend_api_key: None,
            from_address: DEFAULT_EMAIL_FROM.to_string(),
            admin_recipients: Vec::new(),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable; blank values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_capacity(value: Option<String>) -> Result<u32, ConfigError> {
    value.map_or(Ok(DEFAULT_WEDDING_TASTING_CAPACITY), |v| {
        v.trim().parse::<u32>().map_err(|e| {
            ConfigError::InvalidEnvVar("WEDDING_TASTING_CAPACITY".to_string(), e.to_string())
        })
    })
}

fn parse_recipients(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("your-session-key-here", "SESSION_SECRET").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        assert!(validate_secret_strength(&"ab".repeat(20), "SESSION_SECRET").is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "SESSION_SECRET").is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("aB3$xY9!");
        assert!(validate_session_secret(&secret, "SESSION_SECRET").is_err());
    }

    #[test]
    fn test_parse_capacity() {
        assert_eq!(parse_capacity(None).unwrap(), 15);
        assert_eq!(parse_capacity(Some(" 2 ".into())).unwrap(), 2);
        assert!(matches!(
            parse_capacity(Some("many".into())),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_parse_recipients() {
        assert_eq!(
            parse_recipients(Some("a@pandidorty.cz, b@pandidorty.cz,,")),
            vec!["a@pandidorty.cz".to_string(), "b@pandidorty.cz".to_string()]
        );
        assert!(parse_recipients(None).is_empty());
    }

    #[test]
    fn test_log_format() {
        assert_eq!(LogFormat::from_env_value(Some("JSON")), LogFormat::Json);
        assert_eq!(LogFormat::from_env_value(Some("pretty")), LogFormat::Text);
        assert_eq!(LogFormat::from_env_value(None), LogFormat::Text);
    }
}
