//! Loader settings
//!
//! Supports loading settings from:
//! - Default values
//! - Config file (configparser.toml)
//! - Environment variables (CONFIGPARSER__*)
//!
//! ## Example config file (configparser.toml):
//! ```toml
//! [parsing]
//! unknown_fields = "reject"
//!
//! [logging]
//! filter = "warn"
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// What to do with document keys that the schema does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFieldPolicy {
    /// Fail the parse with `UnknownField`
    #[default]
    Reject,
    /// Log a warning and drop the keys from the result
    Warn,
}

/// Main settings for the loader
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Parsing behaviour
    #[serde(default)]
    pub parsing: ParsingConfig,

    /// Log output of the command-line tool
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Parsing configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsingConfig {
    #[serde(default)]
    pub unknown_fields: UnknownFieldPolicy,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when RUST_LOG is unset
    #[serde(default = "default_filter")]
    pub filter: String,
}

fn default_filter() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

impl ParserConfig {
    /// Load settings from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load settings, with `config_path` layered over the default locations
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "configparser.toml",
            ".configparser.toml",
            "config/configparser.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("dev", "json-configparser", "configparser") {
            let xdg_config = dirs.config_dir().join("configparser.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // CONFIGPARSER__PARSING__UNKNOWN_FIELDS=warn
        builder = builder.add_source(
            Environment::with_prefix("CONFIGPARSER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save settings to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = ParserConfig::default();
        assert_eq!(config.parsing.unknown_fields, UnknownFieldPolicy::Reject);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_serialize_config() {
        let config = ParserConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[parsing]"));
        assert!(toml_str.contains("unknown_fields = \"reject\""));
        assert!(toml_str.contains("[logging]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[parsing]\nunknown_fields = \"warn\"\n").unwrap();

        let config = ParserConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.parsing.unknown_fields, UnknownFieldPolicy::Warn);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.toml");

        let mut config = ParserConfig::default();
        config.parsing.unknown_fields = UnknownFieldPolicy::Warn;
        config.logging.filter = "json_configparser=debug".to_string();
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = ParserConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.parsing.unknown_fields, UnknownFieldPolicy::Warn);
        assert_eq!(loaded.logging.filter, "json_configparser=debug");
    }
}
