//! Runtime configuration: defaults, optional JSON file, environment overrides.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use inventario_inventory::DEFAULT_OBSERVATION;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("malformed configuration file: {0}")]
    Parse(String),

    #[error("cannot read configuration file {path}: {reason}")]
    Read { path: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LedgerConfig {
    /// SQLite URL used by the store adapters.
    pub database_url: String,
    /// Default number of movements returned by the history view.
    pub recent_movements: usize,
    /// Observation stored when a stock-out has none.
    pub default_observation: String,
    /// Lifetime of error notices, in milliseconds.
    pub error_notice_ms: u64,
    /// Lifetime of info notices, in milliseconds.
    pub info_notice_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://inventario.db".to_string(),
            recent_movements: 50,
            default_observation: DEFAULT_OBSERVATION.to_string(),
            error_notice_ms: 3_000,
            info_notice_ms: 5_000,
        }
    }
}

impl LedgerConfig {
    /// Defaults, then the JSON `file` if given, then `INVENTARIO_*`
    /// environment variables.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match file {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                Self::from_json(&text)?
            }
            None => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a JSON document; missing keys keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply overrides from `lookup` (usually the process environment).
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("INVENTARIO_DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(v) = lookup("INVENTARIO_RECENT_MOVEMENTS") {
            self.recent_movements = parse_number("INVENTARIO_RECENT_MOVEMENTS", &v)?;
        }
        if let Some(v) = lookup("INVENTARIO_DEFAULT_OBSERVATION") {
            self.default_observation = v;
        }
        if let Some(v) = lookup("INVENTARIO_ERROR_NOTICE_MS") {
            self.error_notice_ms = parse_number("INVENTARIO_ERROR_NOTICE_MS", &v)?;
        }
        if let Some(v) = lookup("INVENTARIO_INFO_NOTICE_MS") {
            self.info_notice_ms = parse_number("INVENTARIO_INFO_NOTICE_MS", &v)?;
        }
        Ok(self)
    }

    /// The configured placeholder, or the built-in one when it is blank.
    pub fn observation_placeholder(&self) -> &str {
        let configured = self.default_observation.trim();
        if configured.is_empty() {
            DEFAULT_OBSERVATION
        } else {
            configured
        }
    }
}

fn parse_number<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn overrides_replace_defaults() {
        let config = LedgerConfig::default()
            .with_overrides(lookup(&[
                ("INVENTARIO_DATABASE_URL", "sqlite::memory:"),
                ("INVENTARIO_RECENT_MOVEMENTS", " 20 "),
            ]))
            .unwrap();

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.recent_movements, 20);
        assert_eq!(config.error_notice_ms, 3_000);
    }

    #[test]
    fn malformed_number_is_rejected() {
        let err = LedgerConfig::default()
            .with_overrides(lookup(&[("INVENTARIO_ERROR_NOTICE_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "INVENTARIO_ERROR_NOTICE_MS", .. }));
    }

    #[test]
    fn json_keeps_defaults_for_missing_keys() {
        let config = LedgerConfig::from_json(r#"{ "recent_movements": 10 }"#).unwrap();
        assert_eq!(config.recent_movements, 10);
        assert_eq!(config.default_observation, DEFAULT_OBSERVATION);

        assert!(LedgerConfig::from_json(r#"{ "recent": 10 }"#).is_err());
    }

    #[test]
    fn load_reads_the_json_file() {
        let path = std::env::temp_dir().join(format!("inventario-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "default_observation": "n/a" }"#).unwrap();

        let loaded = LedgerConfig::load(Some(&path));
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.unwrap().observation_placeholder(), "n/a");
    }

    #[test]
    fn load_reports_a_missing_file() {
        let err = LedgerConfig::load(Some(Path::new("/nonexistent/inventario.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn blank_placeholder_falls_back_to_builtin() {
        let config = LedgerConfig {
            default_observation: "  ".into(),
            ..LedgerConfig::default()
        };
        assert_eq!(config.observation_placeholder(), DEFAULT_OBSERVATION);
    }
}
