//! Configuration persistence
//!
//! Loads the scoreboard configuration from a TOML file through confy and
//! keeps the current model in memory so it can be swapped on reload.

use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use scoreboard_types::ScoreboardConfig;
use tracing::info;

use super::ConfigError;

const APP_NAME: &str = "scoreboard";
const CONFIG_NAME: &str = "config";

/// Holds the current configuration model and the file it came from.
#[derive(Debug)]
pub struct ConfigProvider {
    path: PathBuf,
    config: RwLock<ScoreboardConfig>,
}

impl ConfigProvider {
    /// Platform default location, e.g. `~/.config/scoreboard/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).map_err(ConfigError::Locate)
    }

    /// Load the configuration at `path`, writing defaults if it does not exist.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let config = read(&path)?;
        info!(path = ?path, mode = %config.mode, "Scoreboard configuration loaded");
        Ok(Self {
            path,
            config: RwLock::new(config),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current model.
    pub fn get(&self) -> ScoreboardConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Re-read the file and swap the in-memory model.
    ///
    /// On failure the previous model stays in place.
    pub fn reload(&self) -> Result<ScoreboardConfig, ConfigError> {
        let config = read(&self.path)?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config.clone();
        info!(path = ?self.path, "Scoreboard configuration reloaded");
        Ok(config)
    }

    /// Persist `config` and make it current.
    pub fn store(&self, config: ScoreboardConfig) -> Result<(), ConfigError> {
        confy::store_path(&self.path, &config).map_err(|source| ConfigError::Save {
            path: self.path.clone(),
            source,
        })?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }
}

/// Load and write back, so keys added since the file was created appear
/// with their defaults.
fn read(path: &Path) -> Result<ScoreboardConfig, ConfigError> {
    let config: ScoreboardConfig =
        confy::load_path(path).map_err(|source| ConfigError::Load {
            path: path.to_path_buf(),
            source,
        })?;
    confy::store_path(path, &config).map_err(|source| ConfigError::Save {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(config)
}
