use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::audio::{AudioEngine, EngineError};
use crate::library::{Catalog, Track};

use super::order::PlayOrder;
use super::types::{LoopMode, PlaybackState};

/// Result of one [`PlaylistController::poll`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing ended since the last poll.
    Idle,
    /// The current track ended and the controller started `track` (a catalog index).
    Advanced { track: usize },
    /// The current track ended and was restarted (`LoopMode::LoopOne`).
    Repeated { track: usize },
    /// The last track of the order ended and playback stopped (`LoopMode::NoLoop`).
    Finished,
}

/// Owns the playlist state and is its only writer.
///
/// Not thread-safe by design: the host loop owns it and serializes every
/// transport command and poll through `&mut self`.
pub struct PlaylistController<E: AudioEngine> {
    engine: E,
    catalog: Catalog,
    order: PlayOrder,
    cursor: Option<usize>,
    state: PlaybackState,
    loop_mode: LoopMode,
    /// Catalog index whose stream the engine currently holds (playing or paused).
    loaded: Option<usize>,
    rng: StdRng,
}

impl<E: AudioEngine> PlaylistController<E> {
    pub fn new(engine: E) -> Self {
        Self::with_rng(engine, StdRng::from_entropy())
    }

    /// Construct with a caller-provided RNG so shuffles are reproducible.
    pub fn with_rng(engine: E, rng: StdRng) -> Self {
        Self {
            engine,
            catalog: Catalog::default(),
            order: PlayOrder::default(),
            cursor: None,
            state: PlaybackState::Stopped,
            loop_mode: LoopMode::default(),
            loaded: None,
            rng,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn play_order(&self) -> &PlayOrder {
        &self.order
    }

    /// Position of the current track within the play order.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_shuffled(&self) -> bool {
        self.order.is_shuffled()
    }

    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    pub fn set_loop_mode(&mut self, mode: LoopMode) {
        self.loop_mode = mode;
    }

    pub fn cycle_loop_mode(&mut self) {
        self.loop_mode = self.loop_mode.cycle();
        debug!(mode = ?self.loop_mode, "loop mode changed");
    }

    /// Catalog index of the current (selected or playing) track.
    pub fn current_index(&self) -> Option<usize> {
        self.cursor.and_then(|c| self.order.get(c))
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_index().and_then(|i| self.catalog.get(i))
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Replace the catalog wholesale. Playback stops; nothing starts on its own.
    pub fn load(&mut self, catalog: Catalog) {
        self.release_stream();

        let len = catalog.len();
        let shuffle = self.is_shuffled();
        self.order = if shuffle {
            PlayOrder::shuffled(len, &mut self.rng)
        } else {
            PlayOrder::sequential(len)
        };
        self.cursor = (len > 0).then_some(0);
        self.state = PlaybackState::Stopped;
        self.catalog = catalog;
        info!(tracks = len, shuffle, "catalog loaded");
    }

    /// Start or resume the current track. No-op while playing or when empty.
    pub fn play(&mut self) -> Result<(), EngineError> {
        let Some(track) = self.current_index() else {
            return Ok(());
        };

        match self.state {
            PlaybackState::Playing => Ok(()),
            PlaybackState::Paused if self.loaded == Some(track) => {
                self.engine.resume();
                self.state = PlaybackState::Playing;
                debug!(track, "resumed");
                Ok(())
            }
            PlaybackState::Paused | PlaybackState::Stopped => self.start(track),
        }
    }

    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.engine.pause();
        self.state = PlaybackState::Paused;
        debug!(track = ?self.current_index(), "paused");
    }

    pub fn toggle_play_pause(&mut self) -> Result<(), EngineError> {
        match self.state {
            PlaybackState::Playing => {
                self.pause();
                Ok(())
            }
            PlaybackState::Paused | PlaybackState::Stopped => self.play(),
        }
    }

    /// Stop playback; the cursor stays where it is.
    pub fn stop(&mut self) {
        self.release_stream();
        if self.state != PlaybackState::Stopped {
            debug!("stopped");
        }
        self.state = PlaybackState::Stopped;
    }

    /// Move to the next track, wrapping past the end.
    pub fn next(&mut self) -> Result<(), EngineError> {
        let Some(cursor) = self.cursor else {
            return Ok(());
        };
        self.move_to(self.order.next_position(cursor))
    }

    /// Move to the previous track, wrapping before the start.
    pub fn previous(&mut self) -> Result<(), EngineError> {
        let Some(cursor) = self.cursor else {
            return Ok(());
        };
        self.move_to(self.order.previous_position(cursor))
    }

    /// Move the cursor to catalog index `track`.
    ///
    /// The track starts when `play` is set or something is already playing;
    /// otherwise only the cursor moves. Selecting the track that is already
    /// playing does nothing.
    pub fn select(&mut self, track: usize, play: bool) -> Result<(), EngineError> {
        let Some(position) = self.order.position_of(track) else {
            return Ok(());
        };
        let same = self.cursor == Some(position);
        if same && self.state == PlaybackState::Playing {
            return Ok(());
        }

        if play || self.state == PlaybackState::Playing {
            self.cursor = Some(position);
            self.release_stream();
            self.start(track)
        } else if same {
            Ok(())
        } else {
            self.move_to(position)
        }
    }

    /// Flip shuffle without changing the current track.
    ///
    /// On: a fresh random order that keeps the current track at the cursor.
    /// Off: sequential order with the cursor moved to the current track.
    pub fn toggle_shuffle(&mut self) {
        let shuffle = !self.is_shuffled();

        let len = self.catalog.len();
        let current = self.current_index();
        if shuffle {
            self.order = match (current, self.cursor) {
                (Some(track), Some(position)) => {
                    PlayOrder::shuffled_keeping(len, track, position, &mut self.rng)
                }
                _ => PlayOrder::shuffled(len, &mut self.rng),
            };
        } else {
            self.order = PlayOrder::sequential(len);
            // In sequential order a track's position is its catalog index.
            self.cursor = current;
        }
        debug!(shuffle, cursor = ?self.cursor, "shuffle toggled");
    }

    /// Check whether the engine finished the current track on its own and, if
    /// so, advance according to the loop mode.
    ///
    /// Each natural completion yields exactly one transition: starting the next
    /// stream clears the engine's completion flag, and a failed start leaves
    /// the controller stopped.
    pub fn poll(&mut self) -> Result<PollOutcome, EngineError> {
        if self.state != PlaybackState::Playing || !self.engine.has_finished_naturally() {
            return Ok(PollOutcome::Idle);
        }
        let Some(cursor) = self.cursor else {
            return Ok(PollOutcome::Idle);
        };

        match self.loop_mode {
            LoopMode::LoopOne => {
                let Some(track) = self.order.get(cursor) else {
                    return Ok(PollOutcome::Idle);
                };
                self.release_stream();
                self.start(track)?;
                Ok(PollOutcome::Repeated { track })
            }
            LoopMode::NoLoop if cursor + 1 >= self.order.len() => {
                self.stop();
                info!("reached the end of the playlist");
                Ok(PollOutcome::Finished)
            }
            LoopMode::NoLoop | LoopMode::LoopAll => {
                let position = self.order.next_position(cursor);
                self.move_to(position)?;
                Ok(PollOutcome::Advanced {
                    track: self.order.get(position).unwrap_or_default(),
                })
            }
        }
    }

    fn move_to(&mut self, position: usize) -> Result<(), EngineError> {
        self.cursor = Some(position);
        match self.state {
            PlaybackState::Playing => {
                self.release_stream();
                match self.order.get(position) {
                    Some(track) => self.start(track),
                    None => Ok(()),
                }
            }
            // A paused stream belongs to the previous track; drop it so the
            // next play() starts the newly selected one.
            PlaybackState::Paused => {
                self.release_stream();
                Ok(())
            }
            PlaybackState::Stopped => Ok(()),
        }
    }

    fn start(&mut self, track: usize) -> Result<(), EngineError> {
        let Some(path) = self.catalog.get(track).map(|t| t.path.clone()) else {
            return Ok(());
        };

        match self.engine.start_stream(&path) {
            Ok(()) => {
                self.loaded = Some(track);
                self.state = PlaybackState::Playing;
                debug!(track, path = %path.display(), "playing");
                Ok(())
            }
            Err(err) => {
                self.loaded = None;
                self.state = PlaybackState::Stopped;
                warn!(track, error = %err, "failed to start stream");
                Err(err)
            }
        }
    }

    fn release_stream(&mut self) {
        if self.loaded.take().is_some() {
            self.engine.stop();
        }
    }
}
