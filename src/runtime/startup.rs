use std::path::Path;

use tracing::warn;

use crate::audio::AudioEngine;
use crate::config::{self, LibrarySettings, PlaybackSettings};
use crate::library::{Catalog, scan};
use crate::playlist::{LoopMode, PlaylistController};

impl From<config::LoopModeSetting> for LoopMode {
    fn from(setting: config::LoopModeSetting) -> Self {
        match setting {
            config::LoopModeSetting::NoLoop => LoopMode::NoLoop,
            config::LoopModeSetting::LoopAll => LoopMode::LoopAll,
            config::LoopModeSetting::LoopOne => LoopMode::LoopOne,
        }
    }
}

/// Apply the configured loop mode and shuffle flag. Call before the first
/// `load` so the initial order already honours shuffle.
pub fn apply_playback_defaults<E: AudioEngine>(
    controller: &mut PlaylistController<E>,
    settings: &PlaybackSettings,
) {
    controller.set_loop_mode(settings.loop_mode.into());
    if settings.shuffle != controller.is_shuffled() {
        controller.toggle_shuffle();
    }
}

/// Scan `dir` and load the result into the controller.
///
/// A directory without music is not fatal: the controller gets an empty
/// catalog and the returned notice is shown on the status line.
pub fn load_catalog<E: AudioEngine>(
    controller: &mut PlaylistController<E>,
    dir: &Path,
    settings: &LibrarySettings,
) -> Option<String> {
    match scan(dir, settings) {
        Ok(catalog) => {
            controller.load(catalog);
            None
        }
        Err(e) => {
            warn!(error = %e, "starting with an empty catalog");
            controller.load(Catalog::default().with_root(dir));
            Some(e.to_string())
        }
    }
}
