// crates/account-contract-core/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Typed configuration for account contract runs.
// Purpose: Merge defaults, an optional TOML file, and environment overrides.
// Dependencies: serde, toml, url, thiserror
// ============================================================================

//! ## Overview
//! Configuration supplies the service base URL and the credential material
//! scenarios use to mint their own accounts. Sources apply in order: built-in
//! defaults, an optional TOML file, then `ACCOUNT_CONTRACT_*` environment
//! variables. The merged result is validated before use and fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::account::Credentials;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::HarnessEnv;
pub use env::read_env_nonempty;
pub use env::read_env_strict;

// ============================================================================
// SECTION: Defaults
// ============================================================================

/// Default service base URL.
pub const DEFAULT_BASE_URL: &str = "https://bookstore.demoqa.com";
/// Default password; satisfies the demo service's complexity policy.
pub const DEFAULT_PASSWORD: &str = "Test1234#";
/// Default prefix for generated usernames.
pub const DEFAULT_USERNAME_PREFIX: &str = "testuser";
/// Maximum config file size accepted.
const MAX_CONFIG_BYTES: u64 = 64 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config {path}: {message}")]
    Read {
        /// File path.
        path: String,
        /// Underlying error.
        message: String,
    },
    /// Config file is not valid TOML for the schema.
    #[error("invalid config file: {0}")]
    Parse(String),
    /// Environment variable is malformed.
    #[error("invalid environment: {0}")]
    Env(String),
    /// Merged configuration failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Merged harness configuration.
///
/// # Invariants
/// - After [`HarnessConfig::validate`] succeeds: `base_url` is an absolute
///   http(s) URL, `password` is non-empty, `username_prefix` is non-empty
///   ASCII alphanumeric, and `parallelism >= 1`.
#[derive(Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Service base URL.
    pub base_url: String,
    /// Password for every generated account.
    pub password: String,
    /// Prefix for generated usernames.
    pub username_prefix: String,
    /// Optional request timeout; `None` keeps the transport default.
    pub timeout: Option<Duration>,
    /// Delete accounts left behind by non-delete scenarios.
    pub cleanup: bool,
    /// Maximum number of scenarios in flight.
    pub parallelism: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            username_prefix: DEFAULT_USERNAME_PREFIX.to_string(),
            timeout: None,
            cleanup: true,
            parallelism: 1,
        }
    }
}

impl std::fmt::Debug for HarnessConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("base_url", &self.base_url)
            .field("password", &"<redacted>")
            .field("username_prefix", &self.username_prefix)
            .field("timeout", &self.timeout)
            .field("cleanup", &self.cleanup)
            .field("parallelism", &self.parallelism)
            .finish()
    }
}

/// On-disk TOML layout. Every field is optional and overlays the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    /// Service base URL.
    base_url: Option<String>,
    /// Request timeout in seconds.
    timeout_sec: Option<u64>,
    /// Cleanup toggle.
    cleanup: Option<bool>,
    /// Worker count.
    parallelism: Option<usize>,
    /// Credential material.
    #[serde(default)]
    credentials: FileCredentials,
}

/// `[credentials]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileCredentials {
    /// Password for generated accounts.
    password: Option<String>,
    /// Username prefix.
    username_prefix: Option<String>,
}

impl HarnessConfig {
    /// Loads defaults, the optional file, then environment overrides, and
    /// validates the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any source is malformed or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file and overlays it on the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, too large, or invalid.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let read_error = |message: String| ConfigError::Read {
            path: path.display().to_string(),
            message,
        };
        let metadata = fs::metadata(path).map_err(|err| read_error(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_BYTES {
            return Err(read_error(format!("file exceeds {MAX_CONFIG_BYTES} bytes")));
        }
        let raw = fs::read_to_string(path).map_err(|err| read_error(err.to_string()))?;
        Self::from_toml_str(&raw)
    }

    /// Parses TOML text and overlays it on the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document does not match the schema.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: FileConfig =
            toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let mut config = Self::default();
        if let Some(base_url) = file.base_url {
            config.base_url = base_url;
        }
        if let Some(secs) = file.timeout_sec {
            if secs == 0 {
                return Err(ConfigError::Parse("timeout_sec must be greater than zero".to_string()));
            }
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(cleanup) = file.cleanup {
            config.cleanup = cleanup;
        }
        if let Some(parallelism) = file.parallelism {
            config.parallelism = parallelism;
        }
        if let Some(password) = file.credentials.password {
            config.password = password;
        }
        if let Some(prefix) = file.credentials.username_prefix {
            config.username_prefix = prefix;
        }
        Ok(config)
    }

    /// Applies `ACCOUNT_CONTRACT_*` environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when a set variable is empty or malformed.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        let overrides = env::EnvOverrides::load()?;
        if let Some(base_url) = overrides.base_url {
            self.base_url = base_url;
        }
        if let Some(password) = overrides.password {
            self.password = password;
        }
        if let Some(prefix) = overrides.username_prefix {
            self.username_prefix = prefix;
        }
        if let Some(timeout) = overrides.timeout {
            self.timeout = Some(timeout);
        }
        if let Some(cleanup) = overrides.cleanup {
            self.cleanup = cleanup;
        }
        if let Some(parallelism) = overrides.parallelism {
            self.parallelism = parallelism;
        }
        Ok(())
    }

    /// Checks the merged configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|err| ConfigError::Invalid(format!("base_url {}: {err}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid("base_url must use http or https".to_string()));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(ConfigError::Invalid(
                "base_url must not carry a query or fragment".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(ConfigError::Invalid("password must not be empty".to_string()));
        }
        if self.username_prefix.is_empty()
            || !self.username_prefix.chars().all(|ch| ch.is_ascii_alphanumeric())
        {
            return Err(ConfigError::Invalid(
                "username_prefix must be non-empty ASCII alphanumeric".to_string(),
            ));
        }
        if self.parallelism == 0 {
            return Err(ConfigError::Invalid("parallelism must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Generates fresh credentials for one scenario.
    #[must_use]
    pub fn fresh_credentials(&self) -> Credentials {
        Credentials::generate(&self.username_prefix, &self.password)
    }
}
