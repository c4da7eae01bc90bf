use std::path::Path;

use crate::config::TrackDisplayField;

use super::model::Track;

/// Build the list label for `track` from the configured `fields`, joined by `sep`.
///
/// Empty or missing fields are skipped; when nothing is produced the title is used.
pub fn display_from_fields(track: &Track, fields: &[TrackDisplayField], sep: &str) -> String {
    let mut parts: Vec<String> = Vec::new();

    for f in fields {
        match f {
            TrackDisplayField::Title => push_trimmed(&mut parts, Some(&track.title)),
            TrackDisplayField::Artist => push_trimmed(&mut parts, track.artist.as_deref()),
            TrackDisplayField::Album => push_trimmed(&mut parts, track.album.as_deref()),
            TrackDisplayField::Genre => push_trimmed(&mut parts, track.genre.as_deref()),
            TrackDisplayField::Filename => push_trimmed(&mut parts, file_stem(&track.path)),
            TrackDisplayField::Path => parts.push(track.path.display().to_string()),
        }
    }

    if parts.is_empty() {
        track.title.clone()
    } else {
        parts.join(sep)
    }
}

fn push_trimmed(parts: &mut Vec<String>, value: Option<&str>) {
    if let Some(v) = value.map(str::trim).filter(|s| !s.is_empty()) {
        parts.push(v.to_string());
    }
}

fn file_stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}
