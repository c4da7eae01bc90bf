//! Application module: the view state the TUI and runtime share.
//!
//! `App` never touches playback. It tracks the list selection, the filter,
//! the status line and the artwork cache; the playlist controller stays the
//! only owner of the catalog and play order.

mod model;

pub use model::*;
