//! UI rendering helpers for the terminal user interface.
//!
//! Everything here reads state; nothing mutates the controller or the app.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::time::{Duration, Instant};

use crate::app::App;
use crate::audio::AudioEngine;
use crate::playlist::{PlaybackState, PlaylistController};

const CONTROLS: &[(&str, &str)] = &[
    ("j/k", "up/down"),
    ("h/l", "prev/next song"),
    ("enter", "play selected song"),
    ("space/p", "play/pause"),
    ("x", "stop"),
    ("gg/G", "top/bottom"),
    ("zz", "jump to current"),
    ("/", "filter"),
    ("o", "open directory"),
    ("s", "shuffle"),
    ("r", "loop mode"),
    ("R", "reload"),
    ("?", "help"),
    ("q", "quit"),
];

fn controls_text() -> String {
    CONTROLS
        .iter()
        .map(|(k, v)| format!("[{k}] {v}"))
        .collect::<Vec<String>>()
        .join(" | ")
}

/// Format a duration as minutes and seconds, e.g. `3′07″`.
fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}′{:02}″", secs / 60, secs % 60)
}

/// `elapsed / total`, with `--` when the total is unknown.
fn time_text(elapsed: Duration, total: Option<Duration>) -> String {
    let total = total.map_or_else(|| "--".to_string(), format_duration);
    format!("{} / {}", format_duration(elapsed), total)
}

fn state_icon(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => "|>",
        PlaybackState::Paused => "||",
        PlaybackState::Stopped => "  ",
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn left_padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

fn status_text<E: AudioEngine>(app: &App, controller: &PlaylistController<E>) -> String {
    let mut parts: Vec<String> = Vec::new();

    if app.follow_playback {
        parts.push("CURSOR: Follow".to_string());
    } else {
        parts.push("CURSOR: Free-roam".to_string());
    }
    parts.push(format!("PLAYBACK: {}", controller.loop_mode().label()));

    if let Some(input) = &app.dir_prompt {
        parts.push(format!("OPEN: {input}_"));
    }

    let q = app.filter_query.trim();
    if app.filter_mode || !q.is_empty() {
        parts.push(format!("FILTER: {q}").trim_end().to_string());
    }

    parts.push(format!("{:?}", controller.state()));
    if controller.is_shuffled() {
        parts.push("Shuffle: ON".to_string());
    } else {
        parts.push("Shuffle: OFF".to_string());
    }

    if let Some(dir) = &app.current_dir {
        parts.push(format!("Dir: {}", dir.display()));
    }

    if let Some(msg) = app.status_at(Instant::now()) {
        parts.push(msg.to_string());
    }

    parts.join(" • ")
}

fn now_playing_text<E: AudioEngine>(app: &App, controller: &PlaylistController<E>) -> String {
    let Some((index, track)) = controller
        .current_index()
        .and_then(|i| controller.catalog().get(i).map(|t| (i, t)))
    else {
        return "Nothing selected".to_string();
    };

    let elapsed = match controller.state() {
        PlaybackState::Stopped => Duration::ZERO,
        PlaybackState::Playing | PlaybackState::Paused => controller.engine().elapsed(),
    };

    format!(
        "{} {}\nArtist: {}\nAlbum: {}\nTime: {}\nArt: {}",
        state_icon(controller.state()),
        track.title,
        track.artist_or_default(),
        track.album_or_default(),
        time_text(elapsed, track.duration),
        app.artwork_description(index),
    )
}

/// Render the entire UI into the provided `frame`.
pub fn draw<E: AudioEngine>(frame: &mut Frame, app: &App, controller: &PlaylistController<E>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(7),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(app.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" ttunes ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = Paragraph::new(status_text(app, controller))
        .block(left_padded(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status, chunks[1]);

    // Main list
    {
        let catalog = controller.catalog();
        let display = app.display_indices(catalog, controller.play_order());
        let current = controller.current_index();

        // Only build ListItems for the visible window, centred on the selection.
        let total = display.len();
        let list_height = chunks[2].height.saturating_sub(2) as usize;
        let highlighted = app.highlighted(catalog, controller.play_order());
        let sel_pos = highlighted
            .and_then(|h| display.iter().position(|&i| i == h))
            .unwrap_or(0);
        let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
            (0, total, sel_pos)
        } else {
            let half = list_height / 2;
            let mut start = sel_pos.saturating_sub(half);
            if start + list_height > total {
                start = total - list_height;
            }
            (start, start + list_height, sel_pos - start)
        };

        let visible_items: Vec<ListItem> = display[start..end]
            .iter()
            .filter_map(|&i| {
                let track = catalog.get(i)?;
                let icon = if current == Some(i) {
                    state_icon(controller.state())
                } else {
                    "  "
                };
                Some(ListItem::new(format!("{icon} {}", track.display)))
            })
            .collect();

        let title = if total == catalog.len() {
            format!(" tracks ({total}) ")
        } else {
            format!(" tracks ({total}/{}) ", catalog.len())
        };
        let list = List::new(visible_items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        if total > 0 {
            state.select(Some(selected_pos_in_visible));
        }
        frame.render_stateful_widget(list, chunks[2], &mut state);
    }

    let now_playing = Paragraph::new(now_playing_text(app, controller))
        .block(left_padded(" now playing "))
        .wrap(Wrap { trim: true });
    frame.render_widget(now_playing, chunks[3]);

    let footer = Paragraph::new(controls_text())
        .block(left_padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);

    if app.help_window {
        let popup_area = centered_rect_sized(44, CONTROLS.len() as u16 + 2, frame.area());
        frame.render_widget(Clear, popup_area);

        let help = CONTROLS
            .iter()
            .map(|(k, v)| format!("{k:<8} {v}"))
            .collect::<Vec<String>>()
            .join("\n");
        let help_paragraph = Paragraph::new(help)
            .bold()
            .block(left_padded(" help (? closes) "));
        frame.render_widget(help_paragraph, popup_area);
    }
}
