//! Locating, reading and seeding `config.toml`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::app_config::AppConfig;
use super::args::CliArgs;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors raised while producing the effective configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform reports no configuration directory.
    #[error("could not determine the platform config directory")]
    NoConfigDir,

    /// A file passed with `--config` does not exist.
    #[error("config file {} not found", .0.display())]
    NotFound(PathBuf),

    /// Reading the config file or writing the default one failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// File or directory that was being accessed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The default configuration could not be rendered as TOML.
    #[error("failed to render default config: {0}")]
    Render(#[from] toml::ser::Error),

    /// A setting holds a value the client cannot run with.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Source of the effective [`AppConfig`].
///
/// An explicit `--config` file is read as is and must exist. Without one
/// the store falls back to `config.toml` in its directory and seeds that
/// file with defaults on first run.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Store rooted at the platform config directory.
    ///
    /// # Errors
    /// Returns [`ConfigError::NoConfigDir`] when the platform has none.
    pub fn new() -> Result<Self, ConfigError> {
        AppConfig::default_config_dir()
            .map(Self::with_dir)
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Store rooted at `dir`.
    #[must_use]
    pub const fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Path of the config file used when no override is given.
    #[must_use]
    pub fn default_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE_NAME)
    }

    /// Reads the config file, applies `args` on top and validates the result.
    ///
    /// A file that fails to parse is reported and replaced by defaults.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when an override is missing, the file cannot
    /// be read, defaults cannot be written, or a merged value is invalid.
    pub fn load(&self, args: &CliArgs) -> Result<AppConfig, ConfigError> {
        let mut config = match args.config.as_deref() {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Self::read(path)?,
            None => self.read_or_seed()?,
        };

        config.merge_with_args(args);
        config.validate()?;
        Ok(config)
    }

    fn read_or_seed(&self) -> Result<AppConfig, ConfigError> {
        let path = self.default_path();
        if path.exists() {
            return Self::read(&path);
        }

        info!(path = %path.display(), "No config file, writing defaults");
        let config = AppConfig::default();
        fs::create_dir_all(&self.dir).map_err(|e| ConfigError::io(&self.dir, e))?;
        write_atomic(&path, &toml::to_string_pretty(&config)?)?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<AppConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        match toml::from_str::<AppConfig>(&content) {
            Ok(config) => {
                debug!(path = %path.display(), "Loaded config file");
                Ok(config)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unparsable config file, using defaults");
                Ok(AppConfig::default())
            }
        }
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<(), ConfigError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| ConfigError::io(dir, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| ConfigError::io(path, e))?;
    file.persist(path).map_err(|e| ConfigError::io(path, e.error))?;
    Ok(())
}
