//! CLI configuration.
//!
//! Read from an optional YAML file, then overridden by environment
//! variables, then by command-line flags:
//!
//! ```yaml
//! log:
//!   level: info        # any EnvFilter directive
//!   format: json       # text | json
//! output:
//!   pretty: false      # pretty-print emitted JSON-Schema documents
//! ```
//!
//! Variables:
//! - `DOOLALLY_LOG` overrides `log.level`.
//! - `DOOLALLY_LOG_FORMAT` overrides `log.format`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "DOOLALLY_LOG";
pub const LOG_FORMAT_ENV: &str = "DOOLALLY_LOG_FORMAT";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    pub log: LogConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl CliConfig {
    /// Load a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `DOOLALLY_LOG` / `DOOLALLY_LOG_FORMAT` as returned by `lookup`.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = lookup(LOG_ENV).filter(|v| !v.trim().is_empty()) {
            self.log.level = level;
        }
        if let Some(format) = lookup(LOG_FORMAT_ENV) {
            self.log.format = format.parse()?;
        }
        Ok(self)
    }

    /// Apply command-line flags. Verbosity replaces the configured level
    /// only when given.
    pub fn with_flags(mut self, verbose: u8, format: Option<LogFormat>) -> Self {
        let level = match verbose {
            0 => None,
            1 => Some("info"),
            2 => Some("debug"),
            _ => Some("trace"),
        };
        if let Some(level) = level {
            self.log.level = level.to_string();
        }
        if let Some(format) = format {
            self.log.format = format;
        }
        self
    }
}

impl LogConfig {
    pub fn filter(&self) -> Result<EnvFilter, ConfigError> {
        EnvFilter::try_new(&self.level)
            .map_err(|e| ConfigError::InvalidLogLevel(self.level.clone(), e.to_string()))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid log level {0:?}: {1}")]
    InvalidLogLevel(String, String),
    #[error("invalid log format {0:?} (expected text or json)")]
    InvalidLogFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = CliConfig::default();
        assert_eq!(cfg.log.level, "warn");
        assert_eq!(cfg.log.format, LogFormat::Text);
        assert!(cfg.output.pretty);
    }

    #[test]
    fn load_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log:\n  format: json").unwrap();
        let cfg = CliConfig::load(file.path()).unwrap();
        assert_eq!(cfg.log.format, LogFormat::Json);
        assert_eq!(cfg.log.level, "warn");
        assert!(cfg.output.pretty);
    }

    #[test]
    fn load_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doolally.yaml");
        std::fs::write(
            &path,
            "log:\n  level: doolally_core=debug\n  format: text\noutput:\n  pretty: false\n",
        )
        .unwrap();
        let cfg = CliConfig::load(&path).unwrap();
        assert_eq!(cfg.log.level, "doolally_core=debug");
        assert!(!cfg.output.pretty);
        assert!(cfg.log.filter().is_ok());
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "logging:\n  level: info").unwrap();
        let err = CliConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = CliConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn env_overrides_file_values() {
        let cfg = CliConfig::default()
            .with_env_overrides(env(&[(LOG_ENV, "debug"), (LOG_FORMAT_ENV, "JSON")]))
            .unwrap();
        assert_eq!(cfg.log.level, "debug");
        assert_eq!(cfg.log.format, LogFormat::Json);
    }

    #[test]
    fn env_rejects_bad_format() {
        let err = CliConfig::default()
            .with_env_overrides(env(&[(LOG_FORMAT_ENV, "xml")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidLogFormat(ref f) if f == "xml"));
    }

    #[test]
    fn blank_env_level_is_ignored() {
        let cfg = CliConfig::default()
            .with_env_overrides(env(&[(LOG_ENV, "  ")]))
            .unwrap();
        assert_eq!(cfg.log.level, "warn");
    }

    #[test]
    fn flags_override_everything() {
        let cfg = CliConfig::default()
            .with_env_overrides(env(&[(LOG_ENV, "error")]))
            .unwrap()
            .with_flags(2, Some(LogFormat::Json));
        assert_eq!(cfg.log.level, "debug");
        assert_eq!(cfg.log.format, LogFormat::Json);

        let quiet = CliConfig::default().with_flags(0, None);
        assert_eq!(quiet.log.level, "warn");
        assert_eq!(CliConfig::default().with_flags(5, None).log.level, "trace");
    }

    #[test]
    fn invalid_level_directive() {
        let cfg = LogConfig {
            level: "doolally=notalevel".to_string(),
            format: LogFormat::Text,
        };
        assert!(matches!(cfg.filter(), Err(ConfigError::InvalidLogLevel(..))));
    }
}
