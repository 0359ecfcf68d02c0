//! Configuration discovery and loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::AutConfig;
use crate::config::validation::{validate_config, ValidationError};

/// File name searched for in the working directory, its ancestors and home.
pub const CONFIG_FILE_NAME: &str = ".aut.toml";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Cannot read {}: {}", path.display(), e),
            ConfigError::Parse(path, e) => write!(f, "Cannot parse {}: {}", path.display(), e),
            ConfigError::Validation(errors) => {
                write!(f, "Invalid configuration: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(_, e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AutConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    let config: AutConfig =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// First `.aut.toml` in `start` or its ancestors, then in `home`.
pub fn discover_config(start: &Path, home: Option<&Path>) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
        .or_else(|| {
            home.map(|h| h.join(CONFIG_FILE_NAME))
                .filter(|candidate| candidate.is_file())
        })
}

/// Configuration for this invocation.
///
/// An explicit path must exist. Otherwise the discovered file is used, or
/// the defaults when there is none.
pub fn load_or_default(explicit: Option<&Path>) -> Result<AutConfig, ConfigError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            discover_config(&cwd, dirs::home_dir().as_deref())
        }
    };

    match path {
        Some(path) => {
            tracing::debug!(config = %path.display(), "Loading configuration");
            load_config(&path)
        }
        None => {
            tracing::debug!("No configuration file, using defaults");
            Ok(AutConfig::default())
        }
    }
}
