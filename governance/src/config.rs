//! Engine configuration with TOML file support.

use ballot_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::VotingError;

/// Configuration for a [`VotingEngine`](crate::VotingEngine).
///
/// Can be loaded from a TOML file via [`EngineConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Token allotment used when a quadratic proposal is created with
    /// `base_tokens` of zero.
    #[serde(default = "default_base_tokens")]
    pub default_base_tokens: u64,

    /// Longest accepted proposal title, in characters.
    #[serde(default = "default_max_title_len")]
    pub max_title_len: usize,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_base_tokens() -> u64 {
    100
}

fn default_max_title_len() -> usize {
    256
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, VotingError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| VotingError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, VotingError> {
        let config: Self = toml::from_str(s).map_err(|e| VotingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, VotingError> {
        toml::to_string_pretty(self).map_err(|e| VotingError::Config(e.to_string()))
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), VotingError> {
        if self.default_base_tokens == 0 {
            return Err(VotingError::Config(
                "default_base_tokens must be greater than zero".to_string(),
            ));
        }
        if self.max_title_len == 0 {
            return Err(VotingError::Config(
                "max_title_len must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Install the global tracing subscriber described by this config.
    pub fn init_logging(&self) {
        ballot_utils::init_logging(self.log_format, &self.log_level);
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_base_tokens: default_base_tokens(),
            max_title_len: default_max_title_len(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
