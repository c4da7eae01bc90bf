use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

/// A stream could not be started. Carries the reason reported by the backend.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no audio output device: {reason}")]
    NoOutputDevice { reason: String },
    #[error("cannot open {}: {reason}", path.display())]
    Open { path: PathBuf, reason: String },
    #[error("cannot decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
}

impl EngineError {
    pub fn reason(&self) -> &str {
        match self {
            Self::NoOutputDevice { reason }
            | Self::Open { reason, .. }
            | Self::Decode { reason, .. } => reason,
        }
    }
}

/// Facade over an audio backend that plays at most one stream at a time.
///
/// The backend plays on its own execution context. Completion is never pushed
/// back: callers observe it by polling [`AudioEngine::has_finished_naturally`].
pub trait AudioEngine {
    /// Open and start `path`, tearing down any previous stream first.
    fn start_stream(&mut self, path: &Path) -> Result<(), EngineError>;

    fn pause(&mut self);

    fn resume(&mut self);

    /// Drop the current stream. Afterwards `has_finished_naturally` is false.
    fn stop(&mut self);

    /// True while the current stream is producing sound.
    fn is_busy(&self) -> bool;

    /// True when a started, unpaused stream ran out of audio by itself.
    fn has_finished_naturally(&self) -> bool;

    /// Playback position of the current stream.
    fn elapsed(&self) -> Duration;

    /// Fade the current stream out over `over`, then stop it.
    fn fade_out(&mut self, over: Duration) {
        let _ = over;
        self.stop();
    }
}
