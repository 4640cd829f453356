use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::content::DEFAULT_PACKET_SIZE;
use crate::topology::DEFAULT_MAX_NODES;
use crate::transfer::DEFAULT_PACKET_DELAY;

/// Top-level configuration; every section may be omitted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub simulation: SimulationConfig,
    pub storage: StorageConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.simulation.max_nodes == 0 {
            return Err(ValidationError::InvalidSimulation(
                "max_nodes must be at least 1".to_string(),
            ));
        }
        if self.simulation.packet_size == 0 {
            return Err(ValidationError::InvalidSimulation(
                "packet_size must be at least 1 byte".to_string(),
            ));
        }

        if let Some(level) = &self.general.log_level {
            if level.parse::<log::LevelFilter>().is_err() {
                return Err(ValidationError::InvalidGeneral(format!(
                    "unknown log_level '{}'",
                    level
                )));
            }
        }

        for (name, value) in [
            ("network_file", &self.storage.network_file),
            ("dot_file", &self.storage.dot_file),
        ] {
            if value.as_os_str().is_empty() {
                return Err(ValidationError::InvalidStorage(format!(
                    "{} cannot be empty",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Path of the network snapshot, resolved against the data directory
    pub fn network_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.network_file)
    }

    /// Path of the DOT export, resolved against the data directory
    pub fn dot_path(&self) -> PathBuf {
        self.storage.data_dir.join(&self.storage.dot_file)
    }
}

/// Shared general configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Maximum number of computers in the network
    pub max_nodes: usize,
    /// Content bytes carried by one packet
    pub packet_size: usize,
    /// Simulated latency between packets, e.g. "100ms"
    #[serde(with = "humantime_serde")]
    pub packet_delay: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            max_nodes: DEFAULT_MAX_NODES,
            packet_size: DEFAULT_PACKET_SIZE,
            packet_delay: DEFAULT_PACKET_DELAY,
        }
    }
}

/// Where the network snapshot, computer files and exports live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub network_file: PathBuf,
    pub dot_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            network_file: PathBuf::from("network.txt"),
            dot_file: PathBuf::from("network.dot"),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid simulation configuration: {0}")]
    InvalidSimulation(String),
    #[error("Invalid storage configuration: {0}")]
    InvalidStorage(String),
}
