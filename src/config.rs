//! Layered configuration.
//!
//! Settings are merged in priority order (later wins):
//!
//! 1. Built-in defaults
//! 2. TOML config file (`--config`, or the platform config dir)
//! 3. `FILESTATE_*` environment variables
//! 4. CLI flags, applied by the binary after loading

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{is_separator, Path, PathBuf};
use thiserror::Error;

use crate::checkpoint::{CheckpointFile, DEFAULT_TEMP_SUFFIX};
use crate::replace::{ReplaceOptions, DEFAULT_BACKUP_SUFFIX};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "FILESTATE_";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A provider failed or a value had the wrong type.
    #[error("invalid configuration: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// A value parsed but is not acceptable.
    #[error("invalid value for `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Appended to the checkpoint path for the backup of the previous version.
    pub backup_suffix: String,
    /// Appended to the checkpoint path for the file written before the swap.
    pub temp_suffix: String,
    /// Checkpoint file location. Falls back to the platform data directory.
    pub checkpoint_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup_suffix: DEFAULT_BACKUP_SUFFIX.to_string(),
            temp_suffix: DEFAULT_TEMP_SUFFIX.to_string(),
            checkpoint_path: None,
        }
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// If `path` is `None`, the platform config file is used when present.
    ///
    /// # Errors
    ///
    /// Fails if an explicit `path` is missing, a provider cannot be parsed, or
    /// validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                log::debug!("Loading config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(default) = Self::default_config_path().filter(|p| p.exists()) {
                    log::debug!("Loading config from {}", default.display());
                    figment = figment.merge(Toml::file(default));
                }
            }
        }

        let config: Config = figment.merge(Env::prefixed(ENV_PREFIX)).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the suffixes can be used to build sibling paths.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_suffix("backup_suffix", &self.backup_suffix)?;
        validate_suffix("temp_suffix", &self.temp_suffix)?;
        if self.backup_suffix == self.temp_suffix {
            return Err(ConfigError::Invalid {
                field: "temp_suffix",
                message: format!("must differ from backup_suffix ({:?})", self.backup_suffix),
            });
        }
        Ok(())
    }

    /// Options for [`replace_with`](crate::replace::replace_with).
    #[must_use]
    pub fn replace_options(&self) -> ReplaceOptions {
        ReplaceOptions {
            backup_suffix: self.backup_suffix.clone(),
        }
    }

    /// The configured checkpoint path, or the platform default.
    #[must_use]
    pub fn resolved_checkpoint_path(&self) -> Option<PathBuf> {
        self.checkpoint_path
            .clone()
            .or_else(Self::default_checkpoint_path)
    }

    /// The checkpoint file at `path` (or the resolved default) with these suffixes.
    #[must_use]
    pub fn checkpoint_file(&self, path: Option<&Path>) -> Option<CheckpointFile> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| self.resolved_checkpoint_path())?;
        Some(CheckpointFile::with_options(
            path,
            &self.temp_suffix,
            self.replace_options(),
        ))
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("org", "filestate", "filestate")
    }

    /// Platform-specific config file path.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Platform-specific checkpoint path.
    #[must_use]
    pub fn default_checkpoint_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join("checkpoint.json"))
    }
}

/// Check that `suffix` can be appended to a path to name a sibling file.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] for an empty suffix or one containing a
/// path separator.
pub fn validate_suffix(field: &'static str, suffix: &str) -> Result<(), ConfigError> {
    if suffix.is_empty() {
        return Err(ConfigError::Invalid {
            field,
            message: "must not be empty".to_string(),
        });
    }
    if suffix.chars().any(is_separator) {
        return Err(ConfigError::Invalid {
            field,
            message: format!("{suffix:?} must not contain a path separator"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert_eq!(config.backup_suffix, ".old");
        assert_eq!(config.temp_suffix, ".tmp");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_suffix_rejected() {
        let config = Config {
            backup_suffix: String::new(),
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "backup_suffix",
                ..
            }
        ));
    }

    #[test]
    fn test_separator_in_suffix_rejected() {
        let config = Config {
            temp_suffix: "/tmp".to_string(),
            ..Config::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("temp_suffix"));
    }

    #[test]
    fn test_equal_suffixes_rejected() {
        let config = Config {
            backup_suffix: ".x".to_string(),
            temp_suffix: ".x".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_checkpoint_file_uses_suffixes() {
        let config = Config {
            backup_suffix: ".prev".to_string(),
            temp_suffix: ".next".to_string(),
            checkpoint_path: Some(PathBuf::from("/var/lib/agent/registry")),
        };
        let file = config.checkpoint_file(None).unwrap();
        assert_eq!(file.path(), Path::new("/var/lib/agent/registry"));
        assert_eq!(file.temp_path(), Path::new("/var/lib/agent/registry.next"));
        assert_eq!(file.backup_path(), PathBuf::from("/var/lib/agent/registry.prev"));

        let explicit = config.checkpoint_file(Some(Path::new("other.json"))).unwrap();
        assert_eq!(explicit.path(), Path::new("other.json"));
    }
}
