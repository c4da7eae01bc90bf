//! Transport commands: named user actions mapped one-to-one onto
//! [`PlaylistController`] calls.
//!
//! Key handlers only enqueue these; the host loop dispatches them, which keeps
//! input handling and playback logic apart.

use crate::audio::{AudioEngine, EngineError};
use crate::playlist::PlaylistController;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCmd {
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
    ToggleShuffle,
    CycleLoopMode,
    /// Jump to a catalog index; `play` starts it even when idle.
    Select { track: usize, play: bool },
}

/// Perform exactly one controller call for `cmd`.
pub fn dispatch<E: AudioEngine>(
    cmd: TransportCmd,
    controller: &mut PlaylistController<E>,
) -> Result<(), EngineError> {
    match cmd {
        TransportCmd::Play => controller.play(),
        TransportCmd::Pause => {
            controller.pause();
            Ok(())
        }
        TransportCmd::PlayPause => controller.toggle_play_pause(),
        TransportCmd::Stop => {
            controller.stop();
            Ok(())
        }
        TransportCmd::Next => controller.next(),
        TransportCmd::Prev => controller.previous(),
        TransportCmd::ToggleShuffle => {
            controller.toggle_shuffle();
            Ok(())
        }
        TransportCmd::CycleLoopMode => {
            controller.cycle_loop_mode();
            Ok(())
        }
        TransportCmd::Select { track, play } => controller.select(track, play),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fake::{EngineCall, FakeEngine};
    use crate::library::{Catalog, Track};
    use crate::playlist::{LoopMode, PlaybackState};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::PathBuf;

    fn controller() -> PlaylistController<FakeEngine> {
        let mut c = PlaylistController::with_rng(FakeEngine::default(), StdRng::seed_from_u64(1));
        c.load(Catalog::new(vec![
            Track::untagged("/m/a.mp3"),
            Track::untagged("/m/b.mp3"),
            Track::untagged("/m/c.mp3"),
        ]));
        c
    }

    #[test]
    fn play_pause_and_stop_drive_the_state_machine() {
        let mut c = controller();
        dispatch(TransportCmd::Play, &mut c).unwrap();
        assert_eq!(c.state(), PlaybackState::Playing);
        dispatch(TransportCmd::Pause, &mut c).unwrap();
        assert_eq!(c.state(), PlaybackState::Paused);
        dispatch(TransportCmd::PlayPause, &mut c).unwrap();
        assert_eq!(c.state(), PlaybackState::Playing);
        dispatch(TransportCmd::Stop, &mut c).unwrap();
        assert_eq!(c.state(), PlaybackState::Stopped);
    }

    #[test]
    fn next_and_prev_move_the_cursor_once_each() {
        let mut c = controller();
        dispatch(TransportCmd::Next, &mut c).unwrap();
        assert_eq!(c.cursor(), Some(1));
        dispatch(TransportCmd::Prev, &mut c).unwrap();
        dispatch(TransportCmd::Prev, &mut c).unwrap();
        assert_eq!(c.cursor(), Some(2));
    }

    #[test]
    fn shuffle_and_loop_mode_commands_toggle_flags() {
        let mut c = controller();
        dispatch(TransportCmd::ToggleShuffle, &mut c).unwrap();
        assert!(c.is_shuffled());
        dispatch(TransportCmd::CycleLoopMode, &mut c).unwrap();
        assert_eq!(c.loop_mode(), LoopMode::LoopOne);
    }

    #[test]
    fn select_moves_the_cursor_and_plays_on_request() {
        let mut c = controller();
        dispatch(TransportCmd::Select { track: 2, play: false }, &mut c).unwrap();
        assert_eq!(c.cursor(), Some(2));
        assert_eq!(c.state(), PlaybackState::Stopped);

        dispatch(TransportCmd::Select { track: 1, play: true }, &mut c).unwrap();
        assert_eq!(
            c.engine().calls,
            vec![EngineCall::Start(PathBuf::from("/m/b.mp3"))]
        );
    }

    #[test]
    fn engine_failures_are_returned_to_the_caller() {
        let mut c = controller();
        c.engine_mut().fail_on("/m/a.mp3");
        assert!(dispatch(TransportCmd::Play, &mut c).is_err());
        assert_eq!(c.state(), PlaybackState::Stopped);
    }
}
