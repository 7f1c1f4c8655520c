//! Engine configuration
//!
//! Gathers the validator rules and the scoring constants, loadable from TOML:
//!
//! ```toml
//! default_explanation = "Transition requested without a stated reason"
//!
//! [validation]
//! jump_policy = "allow_skip"
//! require_confirmed_context_for_ready = false
//! block_ready_on_unresolved_missing = false
//!
//! [scoring]
//! context_weight = 0.6
//! missing_weight = 0.4
//! missing_saturation = 3.0
//! uncertainty_penalty = 0.5
//! ```

use docket_domain::ScoringConfig;
use docket_gatekeeper::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Engine configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

fn default_explanation() -> String {
    "Transition requested without a stated reason".to_string()
}

/// Configuration for the workflow engine
///
/// # Examples
///
/// ```
/// use docket_engine::EngineConfig;
/// use docket_gatekeeper::JumpPolicy;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.validation.jump_policy, JumpPolicy::AllowSkip);
///
/// let config = EngineConfig::strict();
/// assert_eq!(config.validation.jump_policy, JumpPolicy::SingleStep);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Transition validation rules
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Metrics constants
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Explanation written to the reasoning trace when a transition carries no reason
    #[serde(default = "default_explanation")]
    pub default_explanation: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            scoring: ScoringConfig::default(),
            default_explanation: default_explanation(),
        }
    }
}

impl EngineConfig {
    /// Strict configuration (single steps, confirmed framing and no open gaps before hand-over)
    pub fn strict() -> Self {
        Self {
            validation: ValidationConfig::strict(),
            ..Self::default()
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate().map_err(ConfigError::Invalid)?;
        if self.default_explanation.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_explanation must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
