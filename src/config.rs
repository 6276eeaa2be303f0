// Purpose: Runtime configuration for the prediction service and the offline data tools

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub artifacts: ArtifactConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub synth: SynthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Locations of the three read-only artifacts loaded at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub feature_means_path: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/model.json"),
            scaler_path: PathBuf::from("models/scaler.json"),
            feature_means_path: PathBuf::from("models/feature_means.json"),
        }
    }
}

impl ArtifactConfig {
    /// All three artifacts under one directory, with the default file names.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            model_path: dir.join("model.json"),
            scaler_path: dir.join("scaler.json"),
            feature_means_path: dir.join("feature_means.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Sessions kept in memory before the oldest is evicted.
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_sessions: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub users_file: String,
    pub events_file: String,
    pub database_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            users_file: "users.csv".to_string(),
            events_file: "events.csv".to_string(),
            database_path: PathBuf::from("data/telemetry.db"),
        }
    }
}

impl DataConfig {
    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(&self.users_file)
    }

    pub fn events_path(&self) -> PathBuf {
        self.data_dir.join(&self.events_file)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    pub users: usize,
    pub days: u32,
    pub avg_events_per_day: f64,
    pub seed: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            users: 5000,
            days: 45,
            avg_events_per_day: 8.0,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
