//! Configuration management for the CLI.

use crate::error::{CliError, Result};
use docket_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Global settings
    #[serde(default)]
    pub settings: Settings,

    /// Where workspaces live and who is acting on them
    #[serde(default)]
    pub defaults: Defaults,

    /// Workflow engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Global CLI settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Enable colored output
    #[serde(default = "default_true")]
    pub color: bool,

    /// Default output format
    #[serde(default = "default_format")]
    pub format: OutputFormat,
}

/// Defaults for options that can also be given on the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Defaults {
    /// SQLite database path (`~/.docket/docket.db` when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Tenant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,

    /// Actor name recorded with changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Table format
    Table,
    /// JSON format
    Json,
    /// Quiet (minimal) format
    Quiet,
}

impl Config {
    /// Directory holding the configuration and the default database.
    pub fn home() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| CliError::Config("Could not find home directory".into()))?;
        Ok(home.join(".docket"))
    }

    /// Get the configuration file path.
    pub fn path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from the default path, or defaults if it does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Database path, falling back to `~/.docket/docket.db`.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.defaults.database {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::home()?.join("docket.db")),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            color: true,
            format: OutputFormat::Table,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_format() -> OutputFormat {
    OutputFormat::Table
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_gatekeeper::JumpPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.settings.color);
        assert_eq!(config.settings.format, OutputFormat::Table);
        assert!(config.defaults.tenant.is_none());
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[settings]
format = "json"

[defaults]
tenant = "acme"
database = "/var/lib/docket/acme.db"

[engine.validation]
jump_policy = "single_step"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.settings.format, OutputFormat::Json);
        assert!(config.settings.color);
        assert_eq!(config.defaults.tenant.as_deref(), Some("acme"));
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/var/lib/docket/acme.db")
        );
        assert_eq!(config.engine.validation.jump_policy, JumpPolicy::SingleStep);
    }

    #[test]
    fn test_serialized_config_reloads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.defaults.actor = Some("alice".to_string());
        config.engine = EngineConfig::strict();
        fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.defaults.actor.as_deref(), Some("alice"));
        assert_eq!(reloaded.engine, EngineConfig::strict());
    }

    #[test]
    fn test_invalid_engine_section_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[engine]\ndefault_explanation = \"  \"\n").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(CliError::EngineConfig(_))
        ));
    }
}
