//! Playlist controller: the playback state machine.
//!
//! [`PlaylistController`] owns the catalog, the play order (sequential or
//! shuffled), the cursor into that order and the Stopped/Playing/Paused state.
//! It is the single writer of that state and drives an [`AudioEngine`]; the
//! host loop calls [`PlaylistController::poll`] on an interval to pick up
//! tracks that ended on their own.
//!
//! [`AudioEngine`]: crate::audio::AudioEngine

mod controller;
mod order;
mod types;

pub use controller::{PlaylistController, PollOutcome};
pub use order::PlayOrder;
pub use types::{LoopMode, PlaybackState};
