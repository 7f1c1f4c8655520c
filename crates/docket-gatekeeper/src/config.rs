//! Gatekeeper configuration

use serde::{Deserialize, Serialize};

/// How far ahead a single transition may move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpPolicy {
    /// Any forward target whose cumulative evidence gates are met
    AllowSkip,

    /// Only the next state in the pipeline
    SingleStep,
}

impl Default for JumpPolicy {
    fn default() -> Self {
        JumpPolicy::AllowSkip
    }
}

/// Configuration for transition validation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Whether multi-step forward jumps are allowed
    pub jump_policy: JumpPolicy,

    /// Require at least one CONFIRMED context hypothesis before `READY_FOR_HUMAN`
    pub require_confirmed_context_for_ready: bool,

    /// Refuse `READY_FOR_HUMAN` while missing elements are unresolved
    pub block_ready_on_unresolved_missing: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            jump_policy: JumpPolicy::AllowSkip,
            require_confirmed_context_for_ready: false,
            block_ready_on_unresolved_missing: false,
        }
    }
}

impl ValidationConfig {
    /// Create a strict configuration (single steps, confirmed framing, no open gaps)
    pub fn strict() -> Self {
        Self {
            jump_policy: JumpPolicy::SingleStep,
            require_confirmed_context_for_ready: true,
            block_ready_on_unresolved_missing: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert_eq!(config.jump_policy, JumpPolicy::AllowSkip);
        assert!(!config.require_confirmed_context_for_ready);
        assert!(!config.block_ready_on_unresolved_missing);
    }

    #[test]
    fn test_strict_config() {
        let config = ValidationConfig::strict();
        assert_eq!(config.jump_policy, JumpPolicy::SingleStep);
        assert!(config.require_confirmed_context_for_ready);
        assert!(config.block_ready_on_unresolved_missing);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ValidationConfig = toml::from_str("jump_policy = \"single_step\"").unwrap();
        assert_eq!(config.jump_policy, JumpPolicy::SingleStep);
        assert!(!config.block_ready_on_unresolved_missing);
    }
}
