use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::errors::{EngageError, EngageResult};

pub const DEFAULT_CONFIG_FILE: &str = "engage.toml";
pub const CONFIG_PATH_ENV: &str = "ENGAGE_CONFIG";

/// Layer defaults, then the TOML file, then `ENGAGE_*` environment variables
/// (`ENGAGE_SERVER__PORT=9000` sets `server.port`).
pub fn figment(path: Option<&Path>) -> Figment {
    let file = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    Figment::from(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file(file))
        .merge(Env::prefixed("ENGAGE_").split("__"))
}

pub fn load_config(path: Option<&Path>) -> EngageResult<AppConfig> {
    let config: AppConfig = figment(path).extract()?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &AppConfig) -> EngageResult<()> {
    let artifacts = &config.artifacts;
    for (name, path) in [
        ("artifacts.model_path", &artifacts.model_path),
        ("artifacts.scaler_path", &artifacts.scaler_path),
        ("artifacts.feature_means_path", &artifacts.feature_means_path),
    ] {
        if path.as_os_str().is_empty() {
            return Err(EngageError::config(format!("{name} must be set")));
        }
    }

    if config.server.max_sessions == 0 {
        return Err(EngageError::config("server.max_sessions must be at least 1"));
    }

    let rate = config.synth.avg_events_per_day;
    if !(rate.is_finite() && rate > 0.0) {
        return Err(EngageError::config(
            "synth.avg_events_per_day must be a positive number",
        ));
    }

    Ok(())
}
