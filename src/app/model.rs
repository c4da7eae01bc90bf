//! Application view model: `App`.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::library::{Artwork, Catalog, NO_ARTWORK, Track, load_artwork};
use crate::playlist::PlayOrder;

/// A transient message on the status line.
#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    shown_at: Instant,
}

/// Artwork of the most recently inspected track, keyed by catalog index.
#[derive(Debug, Clone)]
struct ArtworkCache {
    track: usize,
    artwork: Option<Artwork>,
}

/// The main view model.
pub struct App {
    /// Catalog index of the highlighted row.
    pub selected: usize,
    pub follow_playback: bool,

    pub filter_mode: bool,
    pub filter_query: String,

    pub current_dir: Option<PathBuf>,
    /// Path typed into the open-directory prompt, while it is open.
    pub dir_prompt: Option<String>,
    pub help_window: bool,
    pub header_text: String,

    status: Option<StatusMessage>,
    status_timeout: Duration,
    artwork: Option<ArtworkCache>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(" ~ tTunes ~ ", Duration::from_secs(4))
    }
}

impl App {
    pub fn new(header_text: impl Into<String>, status_timeout: Duration) -> Self {
        Self {
            selected: 0,
            follow_playback: true,
            filter_mode: false,
            filter_query: String::new(),
            current_dir: None,
            dir_prompt: None,
            help_window: false,
            header_text: header_text.into(),
            status: None,
            status_timeout,
            artwork: None,
        }
    }

    pub fn toggle_help_window(&mut self) {
        self.help_window = !self.help_window;
    }

    /// Enable following playback (cursor follows currently playing track).
    pub fn follow_playback_on(&mut self) {
        self.follow_playback = true;
    }

    pub fn follow_playback_off(&mut self) {
        self.follow_playback = false;
    }

    /// Move the selection to `current` when following playback.
    ///
    /// A track hidden by the filter is never selected; the selection stays put.
    pub fn follow(&mut self, current: Option<usize>, catalog: &Catalog, order: &PlayOrder) {
        let Some(idx) = current.filter(|_| self.follow_playback) else {
            return;
        };
        if self.display_indices(catalog, order).contains(&idx) {
            self.selected = idx;
        }
    }

    /// The row the list highlights: the selection when visible, else the
    /// first visible track.
    pub fn highlighted(&self, catalog: &Catalog, order: &PlayOrder) -> Option<usize> {
        let display = self.display_indices(catalog, order);
        if display.contains(&self.selected) {
            Some(self.selected)
        } else {
            display.first().copied()
        }
    }

    pub fn set_current_dir(&mut self, dir: impl Into<PathBuf>) {
        self.current_dir = Some(dir.into());
    }

    /// Forget the selection and cached artwork after the catalog was replaced.
    pub fn reset_for_catalog(&mut self) {
        self.selected = 0;
        self.artwork = None;
    }

    /// Catalog indices in play order, restricted to tracks matching the filter.
    pub fn display_indices(&self, catalog: &Catalog, order: &PlayOrder) -> Vec<usize> {
        let query = self.filter_query.trim();
        order
            .as_slice()
            .iter()
            .copied()
            .filter(|&i| {
                query.is_empty() || catalog.get(i).is_some_and(|t| t.matches(query))
            })
            .collect()
    }

    /// Return the next visible index after `current`, wrapping to the first.
    pub fn next_in_view_from(
        &self,
        catalog: &Catalog,
        order: &PlayOrder,
        current: usize,
    ) -> Option<usize> {
        let display = self.display_indices(catalog, order);
        if display.is_empty() {
            return None;
        }

        match display.iter().position(|&i| i == current) {
            Some(p) => Some(display[(p + 1) % display.len()]),
            None => Some(display[0]),
        }
    }

    /// Return the previous visible index before `current`, wrapping to the last.
    pub fn prev_in_view_from(
        &self,
        catalog: &Catalog,
        order: &PlayOrder,
        current: usize,
    ) -> Option<usize> {
        let display = self.display_indices(catalog, order);
        let last = display.last().copied()?;

        match display.iter().position(|&i| i == current) {
            Some(0) | None => Some(last),
            Some(p) => Some(display[p - 1]),
        }
    }

    /// Move selection to the next visible track.
    pub fn next(&mut self, catalog: &Catalog, order: &PlayOrder) {
        if let Some(next) = self.next_in_view_from(catalog, order, self.selected) {
            self.selected = next;
        }
    }

    /// Move selection to the previous visible track.
    pub fn prev(&mut self, catalog: &Catalog, order: &PlayOrder) {
        if let Some(prev) = self.prev_in_view_from(catalog, order, self.selected) {
            self.selected = prev;
        }
    }

    pub fn select_first(&mut self, catalog: &Catalog, order: &PlayOrder) {
        if let Some(&first) = self.display_indices(catalog, order).first() {
            self.selected = first;
        }
    }

    pub fn select_last(&mut self, catalog: &Catalog, order: &PlayOrder) {
        if let Some(&last) = self.display_indices(catalog, order).last() {
            self.selected = last;
        }
    }

    /// Enter filter mode; the cursor stops following playback while typing.
    pub fn enter_filter_mode(&mut self, catalog: &Catalog, order: &PlayOrder) {
        self.filter_mode = true;
        self.follow_playback_off();
        self.ensure_selected_visible(catalog, order);
    }

    /// Leave filter mode but keep the query applied.
    pub fn exit_filter_mode(&mut self) {
        self.filter_mode = false;
    }

    pub fn clear_filter(&mut self, catalog: &Catalog, order: &PlayOrder) {
        self.filter_query.clear();
        self.filter_mode = false;
        self.ensure_selected_visible(catalog, order);
    }

    pub fn push_filter_char(&mut self, c: char, catalog: &Catalog, order: &PlayOrder) {
        self.filter_query.push(c);
        self.ensure_selected_visible(catalog, order);
    }

    pub fn pop_filter_char(&mut self, catalog: &Catalog, order: &PlayOrder) {
        self.filter_query.pop();
        self.ensure_selected_visible(catalog, order);
    }

    /// Ensure that `selected` is part of the current view, otherwise move the
    /// selection to the first visible track.
    fn ensure_selected_visible(&mut self, catalog: &Catalog, order: &PlayOrder) {
        let display = self.display_indices(catalog, order);
        match display.first() {
            None => self.selected = 0,
            Some(&first) if !display.contains(&self.selected) => self.selected = first,
            Some(_) => {}
        }
    }

    /// Open the directory prompt, prefilled with the current directory.
    pub fn open_dir_prompt(&mut self) {
        let mut initial = self
            .current_dir
            .as_ref()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        if !initial.is_empty() && !initial.ends_with(std::path::MAIN_SEPARATOR) {
            initial.push(std::path::MAIN_SEPARATOR);
        }
        self.dir_prompt = Some(initial);
    }

    pub fn close_dir_prompt(&mut self) -> Option<String> {
        self.dir_prompt.take()
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.set_status_at(text, Instant::now());
    }

    pub fn set_status_at(&mut self, text: impl Into<String>, now: Instant) {
        self.status = Some(StatusMessage {
            text: text.into(),
            shown_at: now,
        });
    }

    /// The status message, if it has not timed out at `now`.
    pub fn status_at(&self, now: Instant) -> Option<&str> {
        self.status
            .as_ref()
            .filter(|s| now.saturating_duration_since(s.shown_at) < self.status_timeout)
            .map(|s| s.text.as_str())
    }

    /// Load the artwork of `track` unless it is already cached.
    pub fn refresh_artwork(&mut self, index: usize, track: &Track) {
        if self.artwork.as_ref().is_some_and(|c| c.track == index) {
            return;
        }
        let artwork = track
            .has_artwork
            .then(|| load_artwork(&track.path))
            .flatten();
        self.artwork = Some(ArtworkCache {
            track: index,
            artwork,
        });
    }

    /// Description of the cached artwork for `index`.
    pub fn artwork_description(&self, index: usize) -> String {
        self.artwork
            .as_ref()
            .filter(|c| c.track == index)
            .and_then(|c| c.artwork.as_ref())
            .map(Artwork::describe)
            .unwrap_or_else(|| NO_ARTWORK.to_string())
    }
}
