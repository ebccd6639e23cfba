//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WIDGETVAULT_STORE_URL` - Base URL of the hosted row store
//! - `WIDGETVAULT_STORE_KEY` - Service key for the row and asset stores
//! - `WIDGETVAULT_ASSET_URL` - Base URL for asset uploads
//!
//! ## Optional
//! - `WIDGETVAULT_ASSET_PUBLIC_URL` - Public base for asset reads (default:
//!   the upload URL)
//! - `WIDGETVAULT_ASSET_BUCKET` - Bucket for uploaded objects (default:
//!   assets)

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SERVICE_KEY_LENGTH: usize = 20;

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

/// Catalog application configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Row store connection settings
    pub store: StoreConfig,
    /// Asset store connection settings
    pub assets: AssetConfig,
}

/// Row store connection settings.
///
/// Implements `Debug` manually to redact the service key.
#[derive(Clone)]
pub struct StoreConfig {
    /// Base URL of the hosted row store
    pub base_url: Url,
    /// Service key (server-side only)
    pub service_key: SecretString,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("base_url", &self.base_url.as_str())
            .field("service_key", &"[REDACTED]")
            .finish()
    }
}

/// Asset store connection settings.
///
/// Implements `Debug` manually to redact the service key.
#[derive(Clone)]
pub struct AssetConfig {
    /// Base URL for uploads
    pub base_url: Url,
    /// Public base URL for reads (may sit behind a CDN)
    pub public_base_url: Url,
    /// Bucket that holds widget thumbnails
    pub bucket: String,
    /// Service key (server-side only)
    pub service_key: SecretString,
}

impl std::fmt::Debug for AssetConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetConfig")
            .field("base_url", &self.base_url.as_str())
            .field("public_base_url", &self.public_base_url.as_str())
            .field("bucket", &self.bucket)
            .field("service_key", &"[REDACTED]")
            .finish()
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the service key fails validation (placeholder detection, length).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            store: StoreConfig::from_env()?,
            assets: AssetConfig::from_env()?,
        })
    }
}

impl StoreConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("WIDGETVAULT_STORE_URL")?;
        Ok(Self {
            base_url: parse_url("WIDGETVAULT_STORE_URL", &raw)?,
            service_key: get_validated_secret("WIDGETVAULT_STORE_KEY")?,
        })
    }
}

impl AssetConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let raw = get_required_env("WIDGETVAULT_ASSET_URL")?;
        let base_url = parse_url("WIDGETVAULT_ASSET_URL", &raw)?;
        let public_base_url = match get_optional_env("WIDGETVAULT_ASSET_PUBLIC_URL") {
            Some(value) => parse_url("WIDGETVAULT_ASSET_PUBLIC_URL", &value)?,
            None => base_url.clone(),
        };

        Ok(Self {
            base_url,
            public_base_url,
            bucket: get_env_or_default("WIDGETVAULT_ASSET_BUCKET", "assets"),
            service_key: get_validated_secret("WIDGETVAULT_STORE_KEY")?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a secret is not a placeholder and is long enough to be a
/// real service key.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    if secret.len() < MIN_SERVICE_KEY_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SERVICE_KEY_LENGTH,
                secret.len()
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
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-service-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        let result = validate_secret_strength("changeme123", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_too_short() {
        let result = validate_secret_strength("k9x2m4q8", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3xY9mK2nL5pQ7rT0uW4zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_url_rejects_garbage() {
        let result = parse_url("TEST_URL", "not a url");
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_store_config_debug_redacts_service_key() {
        let config = StoreConfig {
            base_url: Url::parse("https://store.example.com/rest/v1").unwrap(),
            service_key: SecretString::from("super_secret_service_key"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("store.example.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_service_key"));
    }

    #[test]
    fn test_asset_config_debug_redacts_service_key() {
        let config = AssetConfig {
            base_url: Url::parse("https://assets.example.com/upload").unwrap(),
            public_base_url: Url::parse("https://cdn.example.com/public").unwrap(),
            bucket: "thumbnails".to_string(),
            service_key: SecretString::from("super_secret_service_key"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("cdn.example.com"));
        assert!(debug_output.contains("thumbnails"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_service_key"));
    }
}
