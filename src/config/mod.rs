pub mod path;

#[cfg(test)]
mod config_test;

use std::{io, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::drivers::dualsense::driver::DEFAULT_READ_TIMEOUT;

/// Represents all possible errors loading a [Config]
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Could not read: {0}")]
    IoError(#[from] io::Error),
    #[error("Unable to deserialize: {0}")]
    DeserializeError(#[from] serde_yaml::Error),
}

/// Defines the optional settings file. Every value can be overridden from
/// the command line.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Serial of the controller to use when none is given
    pub device: Option<String>,
    /// How long to wait for input reports in milliseconds
    pub read_timeout_ms: Option<u64>,
    /// Brightness used when setting the lightbar color without one
    pub lightbar_brightness: Option<u8>,
    pub monitor: Option<MonitorConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct MonitorConfig {
    /// Command to run when a controller is connected
    pub add: Option<String>,
    /// Command to run when a controller is disconnected
    pub remove: Option<String>,
    /// Wait for each command to finish before handling the next event
    pub wait: Option<bool>,
}

impl Config {
    /// Load a [Config] from the given YAML string
    pub fn from_yaml(content: String) -> Result<Config, LoadError> {
        let config: Config = serde_yaml::from_str(content.as_str())?;
        Ok(config)
    }

    /// Load a [Config] from the given YAML file
    pub fn from_yaml_path(path: &Path) -> Result<Config, LoadError> {
        let file = std::fs::File::open(path)?;
        let config: Config = serde_yaml::from_reader(file)?;
        Ok(config)
    }

    /// Load the first config file found in the config paths. Returns the
    /// default config if no config file exists.
    pub fn load() -> Result<Config, LoadError> {
        for path in path::get_config_paths() {
            if !path.exists() {
                log::trace!("No config found at {path:?}");
                continue;
            }
            log::debug!("Loading config from {path:?}");
            return Config::from_yaml_path(&path);
        }
        Ok(Config::default())
    }

    /// Returns the configured read timeout
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_READ_TIMEOUT)
    }

    /// Returns the configured lightbar brightness
    pub fn lightbar_brightness(&self) -> u8 {
        self.lightbar_brightness.unwrap_or(u8::MAX)
    }
}
