// system-tests/src/config.rs
// ============================================================================
// Module: System Test Configuration
// Description: Environment-backed settings for live system tests.
// Purpose: Locate the harness config and the artifact root for live runs.
// Dependencies: account-contract-core
// ============================================================================

//! ## Overview
//! Live runs reuse the harness configuration stack (defaults, optional TOML,
//! `ACCOUNT_CONTRACT_*` variables). Two extra variables pick the TOML file and
//! the directory artifacts are written to.

use std::path::PathBuf;

use account_contract_core::ConfigError;
use account_contract_core::HarnessConfig;
use account_contract_core::config::read_env_nonempty;

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional harness TOML file.
    ConfigPath,
    /// Optional artifact root override.
    RunRoot,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "ACCOUNT_CONTRACT_SYSTEM_TEST_CONFIG",
            Self::RunRoot => "ACCOUNT_CONTRACT_SYSTEM_TEST_RUN_ROOT",
        }
    }
}

/// Typed system test configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Harness TOML file, when one is configured.
    pub config_path: Option<PathBuf>,
    /// Artifact root override.
    pub run_root: Option<PathBuf>,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when a variable is set but empty or not UTF-8.
    pub fn load() -> Result<Self, ConfigError> {
        Ok(Self {
            config_path: read_env_nonempty(SystemTestEnv::ConfigPath.as_str())?.map(PathBuf::from),
            run_root: read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from),
        })
    }

    /// Resolves the harness configuration for the live service.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any configuration source is invalid.
    pub fn harness(&self) -> Result<HarnessConfig, ConfigError> {
        HarnessConfig::load(self.config_path.as_deref())
    }
}
