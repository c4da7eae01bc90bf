use std::env;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, warn};

use crate::app::App;
use crate::audio::AudioEngine;
use crate::config;
use crate::library::{Catalog, CatalogLoadError, Track};
use crate::playlist::{PlayOrder, PlaybackState, PlaylistController, PollOutcome};
use crate::runtime::startup;
use crate::transport::{self, TransportCmd};
use crate::ui;

/// What the loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Reload,
    /// Replace the catalog with the music under this directory.
    OpenDir(PathBuf),
    Quit,
}

/// State tracked by the runtime event loop across iterations.
#[derive(Debug, Default)]
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    pending_zz: bool,
}

impl EventLoopState {
    fn clear_prefixes(&mut self) {
        self.pending_gg = false;
        self.pending_zz = false;
    }
}

/// Main terminal event loop.
///
/// Each iteration drains queued transport commands first, then polls the
/// controller once the poll interval elapsed, then draws and reads input.
/// Returns `Ok(())` when shutdown is requested.
pub fn run<E: AudioEngine>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    controller: &mut PlaylistController<E>,
    transport_tx: &mpsc::Sender<TransportCmd>,
    transport_rx: &mpsc::Receiver<TransportCmd>,
) -> anyhow::Result<()> {
    let poll_interval = Duration::from_millis(settings.playback.poll_interval_ms);
    let mut last_poll = Instant::now();
    let mut state = EventLoopState::default();

    loop {
        while let Ok(cmd) = transport_rx.try_recv() {
            apply_command(cmd, controller, app);
        }

        if last_poll.elapsed() >= poll_interval {
            poll_controller(controller, app);
            last_poll = Instant::now();
        }

        if !app.filter_mode {
            app.follow(
                controller.current_index(),
                controller.catalog(),
                controller.play_order(),
            );
        }
        if let Some((index, track)) = controller
            .current_index()
            .and_then(|i| controller.catalog().get(i).map(|t| (i, t)))
        {
            app.refresh_artwork(index, track);
        }

        terminal.draw(|f| ui::draw(f, app, controller))?;

        let timeout = poll_interval
            .saturating_sub(last_poll.elapsed())
            .min(Duration::from_millis(50));
        if !event::poll(timeout)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let action = handle_key_event(
            key,
            app,
            controller.catalog(),
            controller.play_order(),
            controller.current_index(),
            &mut state,
            transport_tx,
        );
        match action {
            KeyAction::Continue => {}
            KeyAction::Reload => reload(controller, app, &settings.library),
            KeyAction::OpenDir(dir) => open_directory(controller, app, &settings.library, &dir),
            KeyAction::Quit => {
                let fade = Duration::from_millis(settings.audio.quit_fade_out_ms);
                if controller.state() == PlaybackState::Playing {
                    controller.engine_mut().fade_out(fade);
                }
                controller.stop();
                return Ok(());
            }
        }
    }
}

/// Dispatch one transport command and report the outcome on the status line.
pub fn apply_command<E: AudioEngine>(
    cmd: TransportCmd,
    controller: &mut PlaylistController<E>,
    app: &mut App,
) {
    debug!(?cmd, "transport command");
    if let Err(e) = transport::dispatch(cmd, controller) {
        app.set_status(format!("Playback error: {}", e.reason()));
        return;
    }

    match cmd {
        TransportCmd::ToggleShuffle => {
            let flag = if controller.is_shuffled() { "on" } else { "off" };
            app.set_status(format!("Playlist shuffle: {flag}"));
        }
        TransportCmd::CycleLoopMode => {
            app.set_status(format!("Loop mode: {}", controller.loop_mode().label()));
        }
        _ => {
            if !app.filter_mode {
                app.follow_playback_on();
            }
            app.set_status(now_playing_status(controller));
        }
    }
}

/// Poll once and surface transitions the user did not ask for.
pub fn poll_controller<E: AudioEngine>(controller: &mut PlaylistController<E>, app: &mut App) {
    match controller.poll() {
        Ok(PollOutcome::Idle) => {}
        Ok(PollOutcome::Advanced { track } | PollOutcome::Repeated { track }) => {
            if let Some(t) = controller.catalog().get(track) {
                app.set_status(track_status("|>", t));
            }
        }
        Ok(PollOutcome::Finished) => app.set_status("End of playlist"),
        Err(e) => {
            warn!(error = %e, "auto-advance failed");
            app.set_status(format!("Playback error: {}", e.reason()));
        }
    }
}

/// `|> Title by Artist`, `|| Title by Artist` or `Idle`.
pub fn now_playing_status<E: AudioEngine>(controller: &PlaylistController<E>) -> String {
    let icon = match controller.state() {
        PlaybackState::Playing => "|>",
        PlaybackState::Paused => "||",
        PlaybackState::Stopped => return "Idle".to_string(),
    };
    match controller.current_track() {
        Some(t) => track_status(icon, t),
        None => "Idle".to_string(),
    }
}

fn track_status(icon: &str, track: &Track) -> String {
    format!("{icon} {} by {}", track.title, track.artist_or_default())
}

fn reload<E: AudioEngine>(
    controller: &mut PlaylistController<E>,
    app: &mut App,
    library: &config::LibrarySettings,
) {
    let Some(dir) = app
        .current_dir
        .clone()
        .or_else(|| controller.catalog().root().map(Path::to_path_buf))
    else {
        return;
    };
    open_directory(controller, app, library, &dir);
}

/// Scan `dir` and make it the current catalog.
///
/// A path that is not a directory keeps the current catalog and only reports
/// the problem; a directory without music loads an empty catalog.
pub fn open_directory<E: AudioEngine>(
    controller: &mut PlaylistController<E>,
    app: &mut App,
    library: &config::LibrarySettings,
    dir: &Path,
) {
    if !dir.is_dir() {
        app.set_status(CatalogLoadError::NotADirectory(dir.to_path_buf()).to_string());
        return;
    }

    let notice = startup::load_catalog(controller, dir, library);
    app.set_current_dir(dir);
    app.reset_for_catalog();
    app.set_status(notice.unwrap_or_else(|| {
        format!(
            "Loaded {} tracks from {}",
            controller.catalog().len(),
            dir.display()
        )
    }));
}

/// Expand a leading `~` to `$HOME`.
fn expand_path(input: &str) -> PathBuf {
    let input = input.trim();
    let home = env::var_os("HOME").map(PathBuf::from);
    match (input.strip_prefix('~'), home) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) if rest.starts_with('/') => home.join(&rest[1..]),
        _ => PathBuf::from(input),
    }
}

/// Map one key press to view changes and queued transport commands.
///
/// Never touches the controller: playback changes go through `transport_tx`
/// and are applied by the loop on its next iteration.
pub fn handle_key_event(
    key: KeyEvent,
    app: &mut App,
    catalog: &Catalog,
    order: &PlayOrder,
    current: Option<usize>,
    state: &mut EventLoopState,
    transport_tx: &mpsc::Sender<TransportCmd>,
) -> KeyAction {
    let send = |cmd: TransportCmd| {
        // The receiver lives as long as the loop; a closed channel means we
        // are shutting down anyway.
        let _ = transport_tx.send(cmd);
    };

    if app.dir_prompt.is_some() {
        state.clear_prefixes();
        match key.code {
            KeyCode::Esc => {
                app.close_dir_prompt();
            }
            KeyCode::Backspace => {
                if let Some(input) = app.dir_prompt.as_mut() {
                    input.pop();
                }
            }
            KeyCode::Char(c) if !c.is_control() => {
                if let Some(input) = app.dir_prompt.as_mut() {
                    input.push(c);
                }
            }
            KeyCode::Enter => {
                if let Some(input) = app.close_dir_prompt().filter(|i| !i.trim().is_empty()) {
                    return KeyAction::OpenDir(expand_path(&input));
                }
            }
            _ => {}
        }
        return KeyAction::Continue;
    }

    if app.filter_mode {
        state.clear_prefixes();
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => app.clear_filter(catalog, order),
            KeyCode::Backspace => app.pop_filter_char(catalog, order),
            KeyCode::Char('j' | 'n') if ctrl => {
                app.follow_playback_off();
                app.next(catalog, order);
            }
            KeyCode::Char('k' | 'p') if ctrl => {
                app.follow_playback_off();
                app.prev(catalog, order);
            }
            KeyCode::Char(c) if !c.is_control() => app.push_filter_char(c, catalog, order),
            KeyCode::Enter => {
                if let Some(track) = app.highlighted(catalog, order) {
                    app.exit_filter_mode();
                    app.selected = track;
                    send(TransportCmd::Select { track, play: true });
                }
            }
            _ => {}
        }
        return KeyAction::Continue;
    }

    if app.help_window {
        if matches!(key.code, KeyCode::Char('?' | 'q') | KeyCode::Esc) {
            app.toggle_help_window();
        }
        return KeyAction::Continue;
    }

    match key.code {
        KeyCode::Char('q') => return KeyAction::Quit,
        KeyCode::Char('R') => {
            state.clear_prefixes();
            return KeyAction::Reload;
        }
        KeyCode::Char('?') => app.toggle_help_window(),
        KeyCode::Char('/') => app.enter_filter_mode(catalog, order),
        KeyCode::Char('o') => app.open_dir_prompt(),
        KeyCode::Esc if !app.filter_query.is_empty() => app.clear_filter(catalog, order),
        KeyCode::Char('s') => send(TransportCmd::ToggleShuffle),
        KeyCode::Char('r') => send(TransportCmd::CycleLoopMode),
        KeyCode::Char('p' | ' ') => send(TransportCmd::PlayPause),
        KeyCode::Char('x') => send(TransportCmd::Stop),
        KeyCode::Char('l') => send(TransportCmd::Next),
        KeyCode::Char('h') => send(TransportCmd::Prev),
        KeyCode::Enter => {
            if let Some(track) = app.highlighted(catalog, order) {
                app.selected = track;
                send(TransportCmd::Select { track, play: true });
            }
        }
        KeyCode::Char('j') => {
            app.follow_playback_off();
            app.next(catalog, order);
        }
        KeyCode::Char('k') => {
            app.follow_playback_off();
            app.prev(catalog, order);
        }
        KeyCode::Char('g') if !state.pending_gg => {
            state.pending_gg = true;
            return KeyAction::Continue;
        }
        KeyCode::Char('g') => {
            app.follow_playback_off();
            app.select_first(catalog, order);
        }
        KeyCode::Char('G') => {
            app.follow_playback_off();
            app.select_last(catalog, order);
        }
        KeyCode::Char('z') if !state.pending_zz => {
            state.pending_zz = true;
            return KeyAction::Continue;
        }
        KeyCode::Char('z') => {
            app.follow_playback_on();
            app.follow(current, catalog, order);
        }
        _ => {}
    }

    state.clear_prefixes();
    KeyAction::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::fake::{EngineCall, FakeEngine};
    use crate::library::Track;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::path::PathBuf;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn controller() -> PlaylistController<FakeEngine> {
        let mut c = PlaylistController::with_rng(FakeEngine::default(), StdRng::seed_from_u64(5));
        let mut tracks = vec![
            Track::untagged("/m/a.mp3"),
            Track::untagged("/m/b.mp3"),
            Track::untagged("/m/c.mp3"),
        ];
        tracks[1].artist = Some("Band".into());
        c.load(Catalog::new(tracks));
        c
    }

    fn press(
        k: KeyEvent,
        app: &mut App,
        c: &PlaylistController<FakeEngine>,
        state: &mut EventLoopState,
        tx: &mpsc::Sender<TransportCmd>,
    ) -> KeyAction {
        handle_key_event(
            k,
            app,
            c.catalog(),
            c.play_order(),
            c.current_index(),
            state,
            tx,
        )
    }

    #[test]
    fn transport_keys_enqueue_commands_without_touching_playback() {
        let c = controller();
        let mut app = App::default();
        let mut state = EventLoopState::default();
        let (tx, rx) = mpsc::channel();

        for ch in ['p', 'l', 'h', 's', 'r', 'x'] {
            assert_eq!(press(key(ch), &mut app, &c, &mut state, &tx), KeyAction::Continue);
        }

        let queued: Vec<TransportCmd> = rx.try_iter().collect();
        assert_eq!(
            queued,
            vec![
                TransportCmd::PlayPause,
                TransportCmd::Next,
                TransportCmd::Prev,
                TransportCmd::ToggleShuffle,
                TransportCmd::CycleLoopMode,
                TransportCmd::Stop,
            ]
        );
        assert!(c.engine().calls.is_empty());
    }

    #[test]
    fn enter_plays_the_selected_row() {
        let c = controller();
        let mut app = App::default();
        let mut state = EventLoopState::default();
        let (tx, rx) = mpsc::channel();

        press(key('j'), &mut app, &c, &mut state, &tx);
        press(
            KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            &mut app,
            &c,
            &mut state,
            &tx,
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            TransportCmd::Select {
                track: 1,
                play: true
            }
        );
    }

    #[test]
    fn gg_and_capital_g_jump_to_the_ends() {
        let c = controller();
        let mut app = App::default();
        let mut state = EventLoopState::default();
        let (tx, _rx) = mpsc::channel();

        press(key('G'), &mut app, &c, &mut state, &tx);
        assert_eq!(app.selected, 2);

        press(key('g'), &mut app, &c, &mut state, &tx);
        assert_eq!(app.selected, 2);
        press(key('g'), &mut app, &c, &mut state, &tx);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn filter_mode_captures_letters() {
        let c = controller();
        let mut app = App::default();
        let mut state = EventLoopState::default();
        let (tx, rx) = mpsc::channel();

        press(key('/'), &mut app, &c, &mut state, &tx);
        press(key('c'), &mut app, &c, &mut state, &tx);
        press(key('q'), &mut app, &c, &mut state, &tx);

        assert_eq!(app.filter_query, "cq");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn q_quits_and_capital_r_reloads() {
        let c = controller();
        let mut app = App::default();
        let mut state = EventLoopState::default();
        let (tx, _rx) = mpsc::channel();

        assert_eq!(press(key('R'), &mut app, &c, &mut state, &tx), KeyAction::Reload);
        assert_eq!(press(key('q'), &mut app, &c, &mut state, &tx), KeyAction::Quit);
    }

    #[test]
    fn help_overlay_swallows_keys_until_closed() {
        let c = controller();
        let mut app = App::default();
        let mut state = EventLoopState::default();
        let (tx, rx) = mpsc::channel();

        press(key('?'), &mut app, &c, &mut state, &tx);
        assert!(app.help_window);
        assert_eq!(press(key('q'), &mut app, &c, &mut state, &tx), KeyAction::Continue);
        assert!(!app.help_window);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn apply_command_reports_shuffle_and_now_playing() {
        let mut c = controller();
        let mut app = App::default();

        apply_command(TransportCmd::ToggleShuffle, &mut c, &mut app);
        assert_eq!(app.status_at(Instant::now()), Some("Playlist shuffle: on"));
        apply_command(TransportCmd::ToggleShuffle, &mut c, &mut app);
        assert_eq!(app.status_at(Instant::now()), Some("Playlist shuffle: off"));

        apply_command(
            TransportCmd::Select {
                track: 1,
                play: true,
            },
            &mut c,
            &mut app,
        );
        assert_eq!(app.status_at(Instant::now()), Some("|> b by Band"));

        apply_command(TransportCmd::Stop, &mut c, &mut app);
        assert_eq!(app.status_at(Instant::now()), Some("Idle"));
    }

    #[test]
    fn apply_command_reports_engine_errors() {
        let mut c = controller();
        let mut app = App::default();
        c.engine_mut().fail_on("/m/a.mp3");

        apply_command(TransportCmd::Play, &mut c, &mut app);
        assert!(
            app.status_at(Instant::now())
                .unwrap()
                .starts_with("Playback error")
        );
        assert_eq!(c.state(), PlaybackState::Stopped);
    }

    #[test]
    fn commands_queued_before_a_poll_win() {
        let mut c = controller();
        let mut app = App::default();
        let (tx, rx) = mpsc::channel();

        apply_command(TransportCmd::Play, &mut c, &mut app);
        c.engine_mut().finish_current();
        tx.send(TransportCmd::Next).unwrap();

        for cmd in rx.try_iter() {
            apply_command(cmd, &mut c, &mut app);
        }
        poll_controller(&mut c, &mut app);

        assert_eq!(c.current_index(), Some(1));
        assert_eq!(
            c.engine().starts(),
            vec![PathBuf::from("/m/a.mp3"), PathBuf::from("/m/b.mp3")]
        );
    }

    #[test]
    fn poll_reports_auto_advance() {
        let mut c = controller();
        let mut app = App::default();

        apply_command(TransportCmd::Play, &mut c, &mut app);
        c.engine_mut().finish_current();
        poll_controller(&mut c, &mut app);

        assert_eq!(app.status_at(Instant::now()), Some("|> b by Band"));
        assert!(matches!(c.engine().calls.last(), Some(EngineCall::Start(_))));
    }

    fn enter() -> KeyEvent {
        KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)
    }

    #[test]
    fn auto_advance_to_a_hidden_track_keeps_the_filtered_selection() {
        let mut c = controller();
        let mut app = App::default();
        let mut state = EventLoopState::default();
        let (tx, rx) = mpsc::channel();

        press(key('/'), &mut app, &c, &mut state, &tx);
        for ch in "band".chars() {
            press(key(ch), &mut app, &c, &mut state, &tx);
        }
        press(enter(), &mut app, &c, &mut state, &tx);
        for cmd in rx.try_iter() {
            apply_command(cmd, &mut c, &mut app);
        }
        assert_eq!(c.current_index(), Some(1));

        c.engine_mut().finish_current();
        poll_controller(&mut c, &mut app);
        assert_eq!(c.current_index(), Some(2));
        app.follow(c.current_index(), c.catalog(), c.play_order());
        assert_eq!(app.selected, 1);

        press(enter(), &mut app, &c, &mut state, &tx);
        assert_eq!(
            rx.try_recv().unwrap(),
            TransportCmd::Select {
                track: 1,
                play: true
            }
        );
    }

    #[test]
    fn enter_with_no_visible_rows_does_nothing() {
        let c = controller();
        let mut app = App::default();
        let mut state = EventLoopState::default();
        let (tx, rx) = mpsc::channel();

        app.filter_query = "zzz".into();
        press(enter(), &mut app, &c, &mut state, &tx);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn enter_plays_the_highlighted_row_when_selection_is_hidden() {
        let c = controller();
        let mut app = App::default();
        let mut state = EventLoopState::default();
        let (tx, rx) = mpsc::channel();

        app.selected = 0;
        app.filter_query = "band".into();
        press(enter(), &mut app, &c, &mut state, &tx);
        assert_eq!(
            rx.try_recv().unwrap(),
            TransportCmd::Select {
                track: 1,
                play: true
            }
        );
    }

    #[test]
    fn o_prompts_for_a_directory() {
        let c = controller();
        let mut app = App::default();
        let mut state = EventLoopState::default();
        let (tx, rx) = mpsc::channel();

        press(key('o'), &mut app, &c, &mut state, &tx);
        assert_eq!(app.dir_prompt.as_deref(), Some(""));
        for ch in "/musix".chars() {
            press(key(ch), &mut app, &c, &mut state, &tx);
        }
        press(
            KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE),
            &mut app,
            &c,
            &mut state,
            &tx,
        );
        press(key('c'), &mut app, &c, &mut state, &tx);

        assert_eq!(
            press(enter(), &mut app, &c, &mut state, &tx),
            KeyAction::OpenDir(PathBuf::from("/music"))
        );
        assert!(app.dir_prompt.is_none());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn escape_cancels_the_directory_prompt() {
        let c = controller();
        let mut app = App::default();
        let mut state = EventLoopState::default();
        let (tx, _rx) = mpsc::channel();

        press(key('o'), &mut app, &c, &mut state, &tx);
        press(
            KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
            &mut app,
            &c,
            &mut state,
            &tx,
        );
        assert!(app.dir_prompt.is_none());
        assert_eq!(press(key('q'), &mut app, &c, &mut state, &tx), KeyAction::Quit);
    }

    #[test]
    fn open_directory_replaces_the_catalog() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("x.mp3"), b"not really audio").unwrap();
        let mut c = controller();
        let mut app = App::default();
        app.selected = 2;
        apply_command(TransportCmd::Play, &mut c, &mut app);

        open_directory(&mut c, &mut app, &config::LibrarySettings::default(), dir.path());

        assert_eq!(c.catalog().len(), 1);
        assert_eq!(c.state(), PlaybackState::Stopped);
        assert_eq!(app.current_dir.as_deref(), Some(dir.path()));
        assert_eq!(app.selected, 0);
        assert!(app.status_at(Instant::now()).unwrap().starts_with("Loaded 1 tracks"));
    }

    #[test]
    fn open_directory_rejects_a_non_directory_and_keeps_the_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("song.mp3");
        std::fs::write(&file, b"not really audio").unwrap();
        let mut c = controller();
        let mut app = App::default();

        open_directory(&mut c, &mut app, &config::LibrarySettings::default(), &file);

        assert_eq!(c.catalog().len(), 3);
        assert!(app.current_dir.is_none());
        assert!(
            app.status_at(Instant::now())
                .unwrap()
                .ends_with("is not a directory")
        );
    }

    #[test]
    fn expand_path_resolves_home() {
        let home = env::var_os("HOME").map(PathBuf::from);
        if let Some(home) = home {
            assert_eq!(expand_path("~"), home);
            assert_eq!(expand_path("~/Music"), home.join("Music"));
        }
        assert_eq!(expand_path(" /srv/music "), PathBuf::from("/srv/music"));
    }
}
