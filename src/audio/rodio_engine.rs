use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::debug;

use crate::config::AudioSettings;

use super::engine::{AudioEngine, EngineError};
use super::sink::create_sink;

/// `rodio`-backed engine. The mixer runs on rodio's own output thread; this
/// type only owns the single active `Sink`.
pub struct RodioEngine {
    stream: OutputStream,
    sink: Option<Sink>,
    volume: f32,
    paused: bool,
    // Elapsed time = accumulated + time since the last (re)start.
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl RodioEngine {
    pub fn open(settings: &AudioSettings) -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream().map_err(|e| {
            EngineError::NoOutputDevice {
                reason: e.to_string(),
            }
        })?;
        // rodio logs to stderr when OutputStream is dropped, which garbles the TUI.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            sink: None,
            volume: settings.volume.clamp(0.0, 1.0),
            paused: false,
            started_at: None,
            accumulated: Duration::ZERO,
        })
    }

    fn reset_clock(&mut self) {
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }
}

impl AudioEngine for RodioEngine {
    fn start_stream(&mut self, path: &Path) -> Result<(), EngineError> {
        self.stop();

        let sink = create_sink(&self.stream, path)?;
        sink.set_volume(self.volume);
        sink.play();

        self.sink = Some(sink);
        self.paused = false;
        self.accumulated = Duration::ZERO;
        self.started_at = Some(Instant::now());
        debug!(path = %path.display(), "stream started");
        Ok(())
    }

    fn pause(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if self.paused {
            return;
        }
        sink.pause();
        if let Some(st) = self.started_at.take() {
            self.accumulated += st.elapsed();
        }
        self.paused = true;
    }

    fn resume(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if !self.paused {
            return;
        }
        sink.play();
        self.started_at = Some(Instant::now());
        self.paused = false;
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            debug!("stream stopped");
        }
        self.paused = false;
        self.reset_clock();
    }

    fn is_busy(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|s| !self.paused && !s.empty())
    }

    fn has_finished_naturally(&self) -> bool {
        // An explicit stop drops the sink, so an empty sink can only mean the
        // source ran out.
        self.sink
            .as_ref()
            .is_some_and(|s| !self.paused && s.empty())
    }

    fn elapsed(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |st| st.elapsed())
    }

    fn fade_out(&mut self, over: Duration) {
        if let Some(sink) = self.sink.as_ref() {
            if !self.paused && !over.is_zero() {
                let steps: u32 = 20;
                let step = (over / steps).max(Duration::from_millis(1));
                for i in 1..=steps {
                    let t = i as f32 / steps as f32;
                    sink.set_volume(self.volume * (1.0 - t));
                    thread::sleep(step);
                }
            }
            sink.set_volume(0.0);
        }
        self.stop();
    }
}
