//! # Application Configuration
//!
//! Loaded from TOML, then overridden by `MWF_*` environment variables:
//!
//! | Variable | Field |
//! |---|---|
//! | `MWF_FINALIZE_FINISH_TIME_MS` | `finalize.finish_time_ms` |
//! | `MWF_FINALIZE_START_AMOUNT` | `finalize.start_amount` |
//! | `MWF_CHAT_SCROLLBACK` | `chat.scrollback` |
//! | `MWF_LOG_FILTER` | `log_filter` |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::views::chat::DEFAULT_SCROLLBACK;
use crate::views::session::GameSettings;

const ENV_PREFIX: &str = "MWF_";

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for [`AppConfig`]
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// File that failed
        path: PathBuf,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// An override or field holds an unusable value
    #[error("invalid value for {key}: {message}")]
    Invalid {
        /// Offending key
        key: String,
        /// What is wrong with it
        message: String,
    },
}

/// Chat view settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Entries kept in the scroll view
    pub scrollback: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            scrollback: DEFAULT_SCROLLBACK,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Defaults used by `finalize`
    pub finalize: GameSettings,
    /// Chat view settings
    pub chat: ChatConfig,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            finalize: GameSettings::default(),
            chat: ChatConfig::default(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    /// Apply overrides from the process environment.
    pub fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `MWF_*` overrides from `vars`. Unrelated keys are ignored.
    pub fn merge_with_vars(
        &mut self,
        vars: impl IntoIterator<Item = (String, String)>,
    ) -> Result<(), ConfigError> {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "FINALIZE_FINISH_TIME_MS" => {
                    self.finalize.finish_time_ms = parse_number(&key, &value)?;
                }
                "FINALIZE_START_AMOUNT" => {
                    self.finalize.start_amount = parse_number(&key, &value)?;
                }
                "CHAT_SCROLLBACK" => {
                    self.chat.scrollback = parse_number(&key, &value)?;
                }
                "LOG_FILTER" => self.log_filter = value,
                _ => {}
            }
        }
        Ok(())
    }

    /// Reject zero durations, stakes and scrollback.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.finalize
            .validate()
            .map_err(|e| ConfigError::Invalid {
                key: "finalize".to_string(),
                message: e.to_string(),
            })?;
        if self.chat.scrollback == 0 {
            return Err(ConfigError::Invalid {
                key: "chat.scrollback".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key: key.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        let config = AppConfig::default();
        assert_eq!(config.finalize.finish_time_ms, 3_600_000);
        assert_eq!(config.chat.scrollback, DEFAULT_SCROLLBACK);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[finalize]\nstart_amount = 5000\n").unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.finalize.start_amount, 5000);
        assert_eq!(config.finalize.finish_time_ms, 3_600_000);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = AppConfig::load_from_file(Path::new("/nonexistent/mwf.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/mwf.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .merge_with_vars([
                ("MWF_FINALIZE_FINISH_TIME_MS".to_string(), "60000".to_string()),
                ("MWF_CHAT_SCROLLBACK".to_string(), " 20 ".to_string()),
                ("MWF_LOG_FILTER".to_string(), "mwf_app=debug".to_string()),
                ("HOME".to_string(), "/root".to_string()),
            ])
            .unwrap();
        assert_eq!(config.finalize.finish_time_ms, 60_000);
        assert_eq!(config.chat.scrollback, 20);
        assert_eq!(config.log_filter, "mwf_app=debug");
    }

    #[test]
    fn test_bad_env_value_names_key() {
        let mut config = AppConfig::default();
        let err = config
            .merge_with_vars([("MWF_FINALIZE_START_AMOUNT".to_string(), "lots".to_string())])
            .unwrap_err();
        assert!(err.to_string().contains("MWF_FINALIZE_START_AMOUNT"));
    }

    #[test]
    fn test_zero_values_fail_validation() {
        let mut config = AppConfig::default();
        config.finalize.start_amount = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.chat.scrollback = 0;
        assert!(config.validate().is_err());
    }
}
