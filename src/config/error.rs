//! Errors raised while loading, validating or applying configuration.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot encode configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value parsed but is out of range for its key.
    #[error("invalid value for `{key}`: {message}")]
    Invalid { key: String, message: String },

    /// An override variable is set but unusable.
    #[error("environment variable {var}: {message}")]
    Env { var: String, message: String },

    #[error("`{0}` is not set")]
    Missing(String),

    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl ConfigError {
    /// Create an Invalid error for `key`.
    pub fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an Env error for the variable `var`.
    pub fn env(var: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Env {
            var: var.into(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
