use std::path::Path;

use crate::config::Settings;

/// Load and validate settings.
///
/// Config is optional: any failure falls back to defaults and returns a
/// warning for the caller to log once logging is up.
pub fn load_settings(explicit_path: Option<&Path>) -> (Settings, Option<String>) {
    let loaded = match explicit_path {
        Some(path) => Settings::load_from(Some(path)),
        None => Settings::load(),
    };

    match loaded {
        Ok(s) => match s.validate() {
            Ok(()) => (s, None),
            Err(e) => (
                Settings::default(),
                Some(format!("invalid config, using defaults: {e}")),
            ),
        },
        Err(e) => (
            Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_values_fall_back_to_defaults_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[audio]\nvolume = 3.0\n").unwrap();

        let (settings, warning) = load_settings(Some(&path));
        assert_eq!(settings.audio.volume, 1.0);
        assert!(warning.unwrap().contains("audio.volume"));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[playback]\nloop_mode = \"sideways\"\n").unwrap();

        let (settings, warning) = load_settings(Some(&path));
        assert_eq!(settings.playback.poll_interval_ms, 250);
        assert!(warning.unwrap().starts_with("failed to load config"));
    }

    #[test]
    fn explicit_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[ui]\nheader_text = \"mine\"\n").unwrap();

        let (settings, warning) = load_settings(Some(&path));
        assert!(warning.is_none());
        assert_eq!(settings.ui.header_text, "mine");
    }
}
