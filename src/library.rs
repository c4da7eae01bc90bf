//! Music library: the track model, directory scanning and tag reading.
//!
//! A scan walks one source directory and produces a [`Catalog`]. Tag read
//! failures never abort a scan; the affected track gets fallback metadata.

mod artwork;
mod display;
mod model;
mod scan;
mod tags;

pub use artwork::{Artwork, NO_ARTWORK, load_artwork};
pub use model::{ALBUM_UNKNOWN, ARTIST_UNKNOWN, Catalog, TRACK_UNKNOWN, Track};
pub use scan::{CatalogLoadError, scan};
