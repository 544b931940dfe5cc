//! Rolegate Configuration Module
//! Handles loading and validating rolegate.config.json

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::rbac::{Catalog, CatalogDefinition, CatalogError};

pub const CONFIG_FILE: &str = "rolegate.config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Invalid config format: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Catalog rejected: {0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub version: String,
    #[serde(default)]
    pub catalog: CatalogSource,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the policy catalog comes from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum CatalogSource {
    #[default]
    Builtin,
    File {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "warn".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            catalog: CatalogSource::Builtin,
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = project_dir.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(ConfigError::NotFound(config_path));
        }
        let content = std::fs::read_to_string(&config_path)?;
        let config: EngineConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load the project config, or the defaults when the project has none.
    pub fn load_or_default(project_dir: &Path) -> Result<Self, ConfigError> {
        match Self::load(project_dir) {
            Err(ConfigError::NotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, project_dir: &Path) -> Result<(), ConfigError> {
        let config_path = project_dir.join(CONFIG_FILE);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn with_catalog_file(path: impl Into<PathBuf>) -> Self {
        Self {
            catalog: CatalogSource::File { path: path.into() },
            ..Self::default()
        }
    }

    /// Build and validate the configured catalog. Relative definition paths
    /// resolve against `project_dir`.
    pub fn load_catalog(&self, project_dir: &Path) -> Result<Catalog, ConfigError> {
        let definition = match &self.catalog {
            CatalogSource::Builtin => CatalogDefinition::builtin(),
            CatalogSource::File { path } => CatalogDefinition::load(&project_dir.join(path))?,
        };
        Ok(Catalog::build(definition)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config: EngineConfig = serde_json::from_str(r#"{"version":"1"}"#).unwrap();
        assert_eq!(config.catalog, CatalogSource::Builtin);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_parse_file_source() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"version":"1","catalog":{"source":"file","path":"policy/catalog.json"},"logging":{"filter":"rolegate=debug"}}"#,
        )
        .unwrap();
        assert_eq!(
            config.catalog,
            CatalogSource::File {
                path: PathBuf::from("policy/catalog.json")
            }
        );
        assert_eq!(config.logging.filter, "rolegate=debug");
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = EngineConfig::default().load_catalog(Path::new(".")).unwrap();
        assert_eq!(catalog.fingerprint().len(), 64);
    }
}
