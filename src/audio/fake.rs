//! Scripted engine for controller tests.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::engine::{AudioEngine, EngineError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Start(PathBuf),
    Pause,
    Resume,
    Stop,
}

/// Records every call and lets a test decide when the current stream
/// "runs out" or which paths fail to open.
#[derive(Debug, Default)]
pub struct FakeEngine {
    pub calls: Vec<EngineCall>,
    current: Option<PathBuf>,
    paused: bool,
    finished: bool,
    failing: HashSet<PathBuf>,
}

impl FakeEngine {
    pub fn fail_on(&mut self, path: impl Into<PathBuf>) {
        self.failing.insert(path.into());
    }

    /// Simulate the current stream reaching its end on its own.
    pub fn finish_current(&mut self) {
        if self.current.is_some() {
            self.finished = true;
        }
    }

    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Paths passed to `start_stream`, in call order.
    pub fn starts(&self) -> Vec<PathBuf> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                EngineCall::Start(p) => Some(p.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn take_calls(&mut self) -> Vec<EngineCall> {
        std::mem::take(&mut self.calls)
    }
}

impl AudioEngine for FakeEngine {
    fn start_stream(&mut self, path: &Path) -> Result<(), EngineError> {
        self.calls.push(EngineCall::Start(path.to_path_buf()));
        self.current = None;
        self.paused = false;
        self.finished = false;

        if self.failing.contains(path) {
            return Err(EngineError::Decode {
                path: path.to_path_buf(),
                reason: "corrupt stream".to_string(),
            });
        }
        self.current = Some(path.to_path_buf());
        Ok(())
    }

    fn pause(&mut self) {
        self.calls.push(EngineCall::Pause);
        if self.current.is_some() {
            self.paused = true;
        }
    }

    fn resume(&mut self) {
        self.calls.push(EngineCall::Resume);
        self.paused = false;
    }

    fn stop(&mut self) {
        self.calls.push(EngineCall::Stop);
        self.current = None;
        self.paused = false;
        self.finished = false;
    }

    fn is_busy(&self) -> bool {
        self.current.is_some() && !self.paused && !self.finished
    }

    fn has_finished_naturally(&self) -> bool {
        self.current.is_some() && !self.paused && self.finished
    }

    fn elapsed(&self) -> Duration {
        Duration::ZERO
    }
}
