//! Configuration loading and representation.

use std::path::{Path, PathBuf};

use thiserror::Error;

use facturier_observability::TracingConfig;

pub const ENV_DATA_DIR: &str = "FACTURIER_DATA_DIR";
pub const ENV_STORAGE_KEY: &str = "FACTURIER_STORAGE_KEY";
pub const ENV_LOG_FORMAT: &str = "FACTURIER_LOG_FORMAT";
pub const ENV_LOG_FILTER: &str = "RUST_LOG";

pub const DEFAULT_STORAGE_KEY: &str = "invoice-storage";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")]
    NoDataDir,
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding the snapshot file.
    pub data_dir: PathBuf,
    /// Snapshot name; the file is `<data_dir>/<storage_key>.json`.
    pub storage_key: String,
    pub tracing: TracingConfig,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup` (returns `None` for unset
    /// variables).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match lookup(ENV_DATA_DIR).filter(|v| !v.trim().is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => {
                let dir = default_data_dir()?;
                tracing::warn!(data_dir = %dir.display(), "{ENV_DATA_DIR} not set; using OS data directory");
                dir
            }
        };

        let storage_key = lookup(ENV_STORAGE_KEY)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());
        if storage_key.contains(['/', '\\']) {
            return Err(ConfigError::InvalidValue {
                name: ENV_STORAGE_KEY,
                value: storage_key,
            });
        }

        let json = match lookup(ENV_LOG_FORMAT).as_deref().map(str::trim) {
            None | Some("") | Some("json") => true,
            Some("pretty") => false,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    name: ENV_LOG_FORMAT,
                    value: other.to_string(),
                });
            }
        };
        let filter = lookup(ENV_LOG_FILTER)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| TracingConfig::default().filter);

        Ok(Self {
            data_dir,
            storage_key,
            tracing: TracingConfig { filter, json },
        })
    }

    /// Location of the JSON snapshot.
    pub fn snapshot_path(&self) -> PathBuf {
        snapshot_path_in(&self.data_dir, &self.storage_key)
    }
}

pub fn snapshot_path_in(dir: &Path, storage_key: &str) -> PathBuf {
    dir.join(format!("{storage_key}.json"))
}

fn default_data_dir() -> Result<PathBuf, ConfigError> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .ok_or(ConfigError::NoDataDir)?;
    dir.push("facturier");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn explicit_variables_are_used() {
        let config = AppConfig::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/tmp/facturier-test"),
            (ENV_STORAGE_KEY, "mes-factures"),
            (ENV_LOG_FORMAT, "pretty"),
            (ENV_LOG_FILTER, "facturier_invoicing=debug"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/facturier-test"));
        assert_eq!(
            config.snapshot_path(),
            PathBuf::from("/tmp/facturier-test/mes-factures.json")
        );
        assert!(!config.tracing.json);
        assert_eq!(config.tracing.filter, "facturier_invoicing=debug");
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[(ENV_DATA_DIR, "/data")])).unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert!(config.tracing.json);
        assert_eq!(config.tracing.filter, "info");
        assert!(config.snapshot_path().ends_with("invoice-storage.json"));
    }

    #[test]
    fn invalid_values_are_reported() {
        let err = AppConfig::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/data"),
            (ENV_LOG_FORMAT, "xml"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                name: ENV_LOG_FORMAT,
                value: "xml".to_string()
            }
        );

        let err = AppConfig::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/data"),
            (ENV_STORAGE_KEY, "../escape"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { name: ENV_STORAGE_KEY, .. }));
    }
}
