//! Layered settings: defaults, then an optional TOML file, then environment.
//!
//! Environment overrides use the `BUCKETWISE_` prefix with `__` between
//! nested keys, e.g. `BUCKETWISE_LEDGER__TOTAL_BUDGET=2500` or
//! `BUCKETWISE_LOG_LEVEL=debug`.

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::ledger::LedgerConfig;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "BUCKETWISE";

/// Log filter used when neither settings nor `RUST_LOG` say otherwise.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Errors that can occur while loading or rendering settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The requested config file does not exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// A source could not be read or deserialized.
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    /// Settings could not be rendered as TOML.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

/// Application settings shared by the binaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// `tracing` filter directive
    pub log_level: String,
    /// Whether to color result markers
    pub color: bool,
    /// Ledger tolerance and starting budget
    pub ledger: LedgerConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            color: true,
            ledger: LedgerConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings, requiring `path` to exist when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) if !path.exists() => Err(SettingsError::NotFound(path.to_path_buf())),
            Some(path) => Self::build(Some(path)),
            None => Self::build(None),
        }
    }

    /// Load settings from `path` if it exists, otherwise from defaults and environment only.
    pub fn load_optional(path: &Path) -> Result<Self, SettingsError> {
        if path.exists() {
            Self::build(Some(path))
        } else {
            Self::build(None)
        }
    }

    fn build(path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;
        Ok(settings)
    }

    /// Render the settings as a TOML document.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.log_level, "warn");
        assert!(settings.color);
        assert_eq!(settings.ledger, LedgerConfig::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            "log_level = \"debug\"\ncolor = false\n\n[ledger]\ntotal_budget = 2500.0\n",
        )
        .unwrap();

        let settings = Settings::load(Some(path.as_path())).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert!(!settings.color);
        assert_eq!(settings.ledger.total_budget, 2500.0);
        assert_eq!(settings.ledger.tolerance, crate::ledger::DEFAULT_TOLERANCE);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");

        let err = Settings::load(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, SettingsError::NotFound(_)));
    }

    #[test]
    fn test_load_optional_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.toml");

        let settings = Settings::load_optional(&path).unwrap();
        assert_eq!(settings.ledger.total_budget, 0.0);
    }

    #[test]
    fn test_load_malformed_file_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[ledger\ntotal_budget = ").unwrap();

        let err = Settings::load(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, SettingsError::Config(_)));
    }

    #[test]
    fn test_to_toml_round_trips() {
        let settings = Settings {
            ledger: LedgerConfig::new().with_total_budget(900.0),
            log_level: "info".to_string(),
            color: false,
        };

        let rendered = settings.to_toml().unwrap();
        assert!(rendered.contains("[ledger]"));

        let parsed: Settings = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, settings);
    }
}
