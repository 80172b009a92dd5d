//! Finding, reading and writing `serial-line.toml`, plus environment
//! overrides.

use super::error::{ConfigError, ConfigResult};
use super::schema::{Config, LogFormat};
use crate::port::BaudRate;
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

const ENV_PREFIX: &str = "SERIAL_LINE";
const CONFIG_FILE_NAME: &str = "serial-line.toml";
/// Explicit config file path; checked before any other location.
const CONFIG_PATH_ENV: &str = "SERIAL_LINE_CONFIG";

/// A configuration together with the file it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    pub config_path: Option<PathBuf>,
    pub config: Config,
}

impl ConfigLoader {
    /// Resolve the config file (see [`resolve_config_path`]), apply
    /// environment overrides and validate. Without a file the built-in
    /// defaults are the starting point.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();
        let base = match &config_path {
            Some(path) => Config::read_from(path)?,
            None => Config::default(),
        };
        let config = finish(base)?;

        debug!(path = ?config_path, "configuration loaded");
        Ok(Self {
            config_path,
            config,
        })
    }

    /// Like [`load`](Self::load), but from the given file only.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let config = finish(Config::read_from(path)?)?;
        Ok(Self {
            config_path: Some(path.to_path_buf()),
            config,
        })
    }

    /// Defaults plus whatever environment overrides parse. Nothing is
    /// validated.
    pub fn with_defaults() -> Self {
        let mut config = Config::default();
        if let Err(e) = apply_env_overrides(&mut config) {
            debug!(error = %e, "ignoring environment override");
        }
        Self {
            config_path: None,
            config,
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get mutable access to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Take the configuration out of the loader.
    pub fn into_config(self) -> Config {
        self.config
    }

    /// Write back to the file this configuration was loaded from.
    pub fn save(&self) -> ConfigResult<()> {
        match &self.config_path {
            Some(path) => self.config.write_to(path),
            None => Err(ConfigError::Missing("config file path".to_string())),
        }
    }

    /// Write the configuration to `path`.
    pub fn save_to(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        self.config.write_to(path.as_ref())
    }

    /// Re-read the source file. The current configuration is kept if the
    /// file no longer loads.
    pub fn reload(&mut self) -> ConfigResult<()> {
        if let Some(path) = &self.config_path {
            self.config = finish(Config::read_from(path)?)?;
        }
        Ok(())
    }
}

impl Config {
    /// Parse a TOML file. Missing keys take their defaults.
    pub fn read_from(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// Write as pretty TOML, creating parent directories.
    pub fn write_to(&self, path: &Path) -> ConfigResult<()> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        fs::write(path, toml::to_string_pretty(self)?).map_err(write_error)
    }
}

fn finish(mut config: Config) -> ConfigResult<Config> {
    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

/// The first existing file among: `$SERIAL_LINE_CONFIG`,
/// `./serial-line.toml`, and `serial-line.toml` in the platform config
/// directory (`~/.config/serial-line/` on Linux).
pub fn resolve_config_path() -> Option<PathBuf> {
    let explicit = env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
    let local = Some(PathBuf::from(CONFIG_FILE_NAME));

    [explicit, local, get_default_config_path()]
        .into_iter()
        .flatten()
        .find(|path| path.is_file())
}

/// Platform config directory for this crate, if the OS has one.
pub fn get_default_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "serial-line").map(|dirs| dirs.config_dir().to_path_buf())
}

/// `serial-line.toml` inside the platform config directory.
pub fn get_default_config_path() -> Option<PathBuf> {
    get_default_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// `SERIAL_LINE_<SECTION>_<KEY>`, if set.
fn override_var(key: &str) -> Option<(String, String)> {
    let var = format!("{}_{}", ENV_PREFIX, key);
    env::var(&var).ok().map(|value| (var, value))
}

fn parse_override<T: FromStr>(var: &str, value: &str, what: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env(var, format!("expected {}, got {:?}", what, value)))
}

fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    if let Some((_, name)) = override_var("PORT_NAME") {
        config.port.name = Some(name);
    }
    if let Some((var, value)) = override_var("LINE_BAUD_RATE") {
        let bps: u32 = parse_override(&var, &value, "a baud rate")?;
        config.line.baud_rate =
            BaudRate::try_from(bps).map_err(|e| ConfigError::env(&var, e.to_string()))?;
    }
    if let Some((var, value)) = override_var("IO_READ_TIMEOUT_MS") {
        config.io.read_timeout_ms = parse_override(&var, &value, "milliseconds")?;
    }
    if let Some((_, level)) = override_var("LOGGING_LEVEL") {
        config.logging.level = level;
    }
    if let Some((var, value)) = override_var("LOGGING_FORMAT") {
        config.logging.format = match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            _ => return Err(ConfigError::env(&var, "expected `pretty` or `compact`")),
        };
    }
    Ok(())
}
