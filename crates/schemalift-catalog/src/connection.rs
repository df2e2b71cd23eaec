//! Connection parameters and credential redaction

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Opaque connection configuration for one warehouse.
///
/// Settings are a flat string map so each warehouse can pick the keys it
/// needs; `hidden_keys` marks the secret-bearing ones. Callers must log
/// [`ConnectionInfo::redacted`], never the raw settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Warehouse-specific settings (account, project, credentials)
    pub settings: BTreeMap<String, String>,

    /// Setting keys whose values must be masked before logging
    #[serde(default)]
    pub hidden_keys: Vec<String>,
}

impl ConnectionInfo {
    /// Build connection info from key/value pairs
    pub fn new<K, V>(settings: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            settings: settings
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            hidden_keys: Vec::new(),
        }
    }

    /// Mark setting keys as secret
    pub fn with_hidden_keys<K: Into<String>>(
        mut self,
        keys: impl IntoIterator<Item = K>,
    ) -> Self {
        self.hidden_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Look up a setting
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Look up a required setting, naming it in the error
    pub fn require(&self, key: &str) -> Result<&str, crate::CatalogError> {
        self.get(key).ok_or_else(|| {
            crate::CatalogError::Config(format!("missing required connection setting '{}'", key))
        })
    }

    /// Render the settings with hidden keys masked, safe for logging.
    pub fn redacted(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .settings
            .iter()
            .map(|(key, value)| {
                let shown = if self.hidden_keys.iter().any(|h| h == key) {
                    "******".to_string()
                } else {
                    value.clone()
                };
                (key.clone(), serde_json::Value::String(shown))
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redaction_masks_hidden_keys() {
        let info = ConnectionInfo::new([
            ("account", "xy12345"),
            ("username", "loader"),
            ("password", "hunter2"),
        ])
        .with_hidden_keys(["password"]);

        assert_eq!(
            info.redacted(),
            json!({
                "account": "xy12345",
                "username": "loader",
                "password": "******"
            })
        );
    }

    #[test]
    fn require_names_the_missing_key() {
        let info = ConnectionInfo::new([("account", "xy12345")]);
        assert_eq!(info.require("account").unwrap(), "xy12345");

        let err = info.require("username").unwrap_err();
        assert!(err.to_string().contains("username"));
    }
}
