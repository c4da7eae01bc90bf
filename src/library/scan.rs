use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::display::display_from_fields;
use super::model::{Catalog, Track};
use super::tags::{TrackTags, read_tags};

/// Why a directory produced no catalog. Never fatal: the player keeps running
/// with an empty catalog and shows the message.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("{} does not contain music", .0.display())]
    NoTracks(PathBuf),
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Build a track from the file at `path`, falling back to filename-derived
/// metadata when the tags cannot be read.
fn track_from_path(path: &Path, settings: &LibrarySettings) -> Track {
    let tags = read_tags(path).unwrap_or_else(|e| {
        debug!(error = %e, "using fallback metadata");
        TrackTags::default()
    });

    let mut track = Track::untagged(path);
    if let Some(title) = tags.title {
        track.title = title;
    }
    track.artist = tags.artist;
    track.album = tags.album;
    track.genre = tags.genre;
    track.duration = tags.duration;
    track.has_artwork = tags.has_artwork;
    track.display = display_from_fields(
        &track,
        &settings.display_fields,
        &settings.display_separator,
    );
    track
}

/// Scan `dir` for audio files and build a catalog in discovery order.
///
/// Entries are visited sorted by file name, so the same tree always yields
/// the same order.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Result<Catalog, CatalogLoadError> {
    if !dir.is_dir() {
        return Err(CatalogLoadError::NotADirectory(dir.to_path_buf()));
    }

    let mut walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .sort_by_file_name();

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    let tracks: Vec<Track> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file() && is_audio_file(entry.path(), settings))
        .map(|entry| track_from_path(entry.path(), settings))
        .collect();

    if tracks.is_empty() {
        return Err(CatalogLoadError::NoTracks(dir.to_path_buf()));
    }

    info!(dir = %dir.display(), tracks = tracks.len(), "scanned library");
    Ok(Catalog::new(tracks).with_root(dir))
}
