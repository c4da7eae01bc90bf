use std::{
    env,
    path::{Path, PathBuf},
};

use thiserror::Error;

use super::schema::Settings;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Load(#[from] ::config::ConfigError),
    #[error("{0}")]
    Invalid(String),
}

/// Configuration loading helpers.
///
/// `Settings::load` reads the optional config file first, then lets environment
/// variables (prefix `TTUNES__`) override it, falling back to struct defaults.
impl Settings {
    /// Load settings from the resolved config path and the environment.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(resolve_config_path().as_deref())
    }

    /// Load settings from an explicit config file (missing file is fine).
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("TTUNES")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Reject values the player cannot work with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(SettingsError::Invalid(
                "audio.volume must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.playback.poll_interval_ms == 0 {
            return Err(SettingsError::Invalid(
                "playback.poll_interval_ms must be >= 1".to_string(),
            ));
        }
        if self.library.extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(SettingsError::Invalid(
                "library.extensions must name at least one extension".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolve the config path from `TTUNES_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("TTUNES_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// `$XDG_CONFIG_HOME/ttunes/config.toml`, or `~/.config/ttunes/config.toml`
/// when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("ttunes").join("config.toml"))
}

/// `$XDG_STATE_HOME/ttunes`, or `~/.local/state/ttunes`.
pub fn default_log_dir() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("ttunes"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(dir) = env::var_os(var) {
        Some(PathBuf::from(dir))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
