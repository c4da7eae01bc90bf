use std::path::{Path, PathBuf};
use std::time::Duration;

pub const TRACK_UNKNOWN: &str = "<unknown track>";
pub const ARTIST_UNKNOWN: &str = "<unknown artist>";
pub const ALBUM_UNKNOWN: &str = "<unknown album>";

/// An immutable descriptor for one playable file.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<Duration>,
    pub display: String,
    /// Whether the file carries an embedded picture. The bytes are read on demand.
    pub has_artwork: bool,
}

impl Track {
    /// A track with no tag metadata: the file stem is used as title and display.
    pub fn untagged(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| TRACK_UNKNOWN.to_string());

        Self {
            display: title.clone(),
            path,
            title,
            artist: None,
            album: None,
            genre: None,
            duration: None,
            has_artwork: false,
        }
    }

    pub fn artist_or_default(&self) -> &str {
        self.artist.as_deref().unwrap_or(ARTIST_UNKNOWN)
    }

    pub fn album_or_default(&self) -> &str {
        self.album.as_deref().unwrap_or(ALBUM_UNKNOWN)
    }

    /// Naive filter match.
    ///
    /// Every whitespace-separated term of `query` must appear (case-insensitive)
    /// somewhere in title, artist, album or genre; alternatively the raw query
    /// may be a substring of the path. An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim();
        if query.is_empty() {
            return true;
        }

        let haystack = format!(
            "{} {} {} {}",
            self.title,
            self.artist.as_deref().unwrap_or_default(),
            self.album.as_deref().unwrap_or_default(),
            self.genre.as_deref().unwrap_or_default(),
        )
        .to_lowercase();

        let all_terms = query
            .to_lowercase()
            .split_whitespace()
            .all(|term| haystack.contains(term));

        all_terms || self.path.to_string_lossy().contains(query)
    }
}

/// The ordered tracks discovered under one source directory.
///
/// Order is discovery order; a catalog is never edited in place, only replaced.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    root: Option<PathBuf>,
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { root: None, tracks }
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }
}
