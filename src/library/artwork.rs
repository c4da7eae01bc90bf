use std::path::Path;

use lofty::prelude::*;
use tracing::debug;

pub const NO_ARTWORK: &str = "<no embedded album art>";

/// Raw bytes of the first embedded picture of a file.
#[derive(Debug, Clone, PartialEq)]
pub struct Artwork {
    pub mime: Option<String>,
    pub data: Vec<u8>,
}

impl Artwork {
    /// Short human description, e.g. `image/jpeg, 42 KiB`.
    pub fn describe(&self) -> String {
        let kib = self.data.len().div_ceil(1024);
        format!("{}, {} KiB", self.mime.as_deref().unwrap_or("image"), kib)
    }
}

/// Read the embedded artwork of `path`, if any.
///
/// Called lazily when a track becomes current rather than during scans.
pub fn load_artwork(path: &Path) -> Option<Artwork> {
    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no artwork: tags unreadable");
            return None;
        }
    };

    tagged
        .tags()
        .iter()
        .flat_map(|tag| tag.pictures())
        .next()
        .map(|picture| Artwork {
            mime: picture.mime_type().map(|m| m.as_str().to_string()),
            data: picture.data().to_vec(),
        })
}
