//! Configuration schema (schemalift.toml)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::sampling::SamplingSettings;

/// Warehouse connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseConfig {
    /// Warehouse type (bigquery, snowflake)
    #[serde(rename = "type")]
    pub warehouse_type: String,

    /// Connection settings (warehouse-specific)
    #[serde(flatten)]
    pub settings: HashMap<String, String>,

    /// Setting keys to mask before logging
    #[serde(default = "default_hidden_keys")]
    pub hidden_keys: Vec<String>,
}

fn default_hidden_keys() -> Vec<String> {
    ["password", "private_key", "key_json"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Warehouse connection configuration
    #[serde(default)]
    pub warehouse: Option<WarehouseConfig>,

    /// Record sampling settings
    #[serde(default)]
    pub sampling: SamplingSettings,

    /// Redact schema, table, and column names in logs
    #[serde(default)]
    pub redact_sensitive_data: bool,
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml(&contents)
    }

    /// Load config from a TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.warehouse.is_none());
        assert_eq!(config.sampling, SamplingSettings::Absolute { value: 1000 });
        assert!(!config.redact_sensitive_data);
    }

    #[test]
    fn parse_bigquery_config() {
        let config = Config::from_toml(
            r#"
            [warehouse]
            type = "bigquery"
            project_id = "my-project"
            key_file = "/etc/keys/sa.json"

            [sampling]
            mode = "relative"
            percent = 10.0
            "#,
        )
        .unwrap();

        let warehouse = config.warehouse.unwrap();
        assert_eq!(warehouse.warehouse_type, "bigquery");
        assert_eq!(
            warehouse.settings.get("project_id").map(String::as_str),
            Some("my-project")
        );
        assert!(warehouse.hidden_keys.contains(&"password".to_string()));
        assert_eq!(config.sampling, SamplingSettings::Relative { percent: 10.0 });
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = Config::from_toml("warehouse = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
