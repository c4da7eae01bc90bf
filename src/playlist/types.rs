/// The playback state of the controller.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// What happens when a track ends on its own.
///
/// Manual next/previous always wrap regardless of the mode.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Stop after the last track of the play order.
    NoLoop,
    /// Wrap around to the start of the play order and keep going.
    #[default]
    LoopAll,
    /// Repeat the current track.
    LoopOne,
}

impl LoopMode {
    /// `NoLoop -> LoopAll -> LoopOne -> NoLoop`.
    pub fn cycle(self) -> Self {
        match self {
            Self::NoLoop => Self::LoopAll,
            Self::LoopAll => Self::LoopOne,
            Self::LoopOne => Self::NoLoop,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NoLoop => "No-loop",
            Self::LoopAll => "Loop-around",
            Self::LoopOne => "Repeat-one",
        }
    }
}
