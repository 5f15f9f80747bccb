// crates/account-contract-core/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed overrides for harness configuration.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 and empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use super::ConfigError;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Service base URL override.
    BaseUrl,
    /// Password override.
    Password,
    /// Username prefix override.
    UsernamePrefix,
    /// Request timeout in seconds (positive integer).
    TimeoutSeconds,
    /// Cleanup toggle (`true`/`false` or `1`/`0`).
    Cleanup,
    /// Worker count (positive integer).
    Parallelism,
}

impl HarnessEnv {
    /// All keys, in declaration order.
    pub const ALL: [Self; 6] = [
        Self::BaseUrl,
        Self::Password,
        Self::UsernamePrefix,
        Self::TimeoutSeconds,
        Self::Cleanup,
        Self::Parallelism,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseUrl => "ACCOUNT_CONTRACT_BASE_URL",
            Self::Password => "ACCOUNT_CONTRACT_PASSWORD",
            Self::UsernamePrefix => "ACCOUNT_CONTRACT_USERNAME_PREFIX",
            Self::TimeoutSeconds => "ACCOUNT_CONTRACT_TIMEOUT_SEC",
            Self::Cleanup => "ACCOUNT_CONTRACT_CLEANUP",
            Self::Parallelism => "ACCOUNT_CONTRACT_PARALLELISM",
        }
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Values read from the environment; `None` when the variable is unset.
#[derive(Debug, Default, PartialEq, Eq)]
pub(super) struct EnvOverrides {
    /// Base URL.
    pub base_url: Option<String>,
    /// Password.
    pub password: Option<String>,
    /// Username prefix.
    pub username_prefix: Option<String>,
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Cleanup toggle.
    pub cleanup: Option<bool>,
    /// Worker count.
    pub parallelism: Option<usize>,
}

impl EnvOverrides {
    /// Reads every harness variable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when a value is not valid UTF-8, is empty,
    /// or fails parsing.
    pub(super) fn load() -> Result<Self, ConfigError> {
        let timeout_name = HarnessEnv::TimeoutSeconds.as_str();
        let cleanup_name = HarnessEnv::Cleanup.as_str();
        let parallelism_name = HarnessEnv::Parallelism.as_str();
        Ok(Self {
            base_url: read_env_nonempty(HarnessEnv::BaseUrl.as_str())?,
            password: read_env_nonempty(HarnessEnv::Password.as_str())?,
            username_prefix: read_env_nonempty(HarnessEnv::UsernamePrefix.as_str())?,
            timeout: read_env_nonempty(timeout_name)?
                .map(|value| parse_timeout_seconds(timeout_name, &value))
                .transpose()?,
            cleanup: read_env_nonempty(cleanup_name)?
                .map(|value| parse_bool(cleanup_name, &value))
                .transpose()?,
            parallelism: read_env_nonempty(parallelism_name)?
                .map(|value| parse_positive_usize(parallelism_name, &value))
                .transpose()?,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string()
            .map(Some)
            .map_err(|_| ConfigError::Env(format!("{name} must be valid UTF-8")))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
pub fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Env(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs = parse_positive_u64(name, raw)?;
    Ok(Duration::from_secs(secs))
}

/// Parses a positive worker count.
///
/// # Errors
///
/// Returns an error when the value is non-numeric, zero, or too large.
fn parse_positive_usize(name: &str, raw: &str) -> Result<usize, ConfigError> {
    let value = parse_positive_u64(name, raw)?;
    usize::try_from(value).map_err(|_| ConfigError::Env(format!("{name} is too large")))
}

/// Parses a positive integer.
fn parse_positive_u64(name: &str, raw: &str) -> Result<u64, ConfigError> {
    let value: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env(format!("{name} must be a positive integer")))?;
    if value == 0 {
        return Err(ConfigError::Env(format!("{name} must be greater than zero")));
    }
    Ok(value)
}

/// Parses a boolean literal.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(ConfigError::Env(format!("{name} must be 1, 0, true, or false")))
}
