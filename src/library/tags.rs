//! Best-effort tag extraction via `lofty`.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::*;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagReadError {
    #[error("failed to read tags from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },
}

/// Whatever metadata could be read from a file; every field is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<Duration>,
    pub has_artwork: bool,
}

pub fn read_tags(path: &Path) -> Result<TrackTags, TagReadError> {
    let tagged = lofty::read_from_path(path).map_err(|source| TagReadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut tags = TrackTags {
        duration: Some(tagged.properties().duration()).filter(|d| !d.is_zero()),
        ..TrackTags::default()
    };

    if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
        tags.title = non_empty(tag.title());
        tags.artist = non_empty(tag.artist());
        tags.album = non_empty(tag.album());
        tags.genre = non_empty(tag.genre());
    }
    tags.has_artwork = tagged.tags().iter().any(|t| !t.pictures().is_empty());

    Ok(tags)
}

fn non_empty(value: Option<Cow<'_, str>>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
