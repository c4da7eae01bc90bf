//! Playback engine adapter.
//!
//! [`AudioEngine`] is the narrow facade the playlist controller drives: one
//! stream at a time, plus a pollable "finished on its own" flag.
//! [`RodioEngine`] is the production backend; tests use a scripted fake.

mod engine;
mod rodio_engine;
mod sink;

pub use engine::{AudioEngine, EngineError};
pub use rodio_engine::RodioEngine;

#[cfg(test)]
pub(crate) mod fake;
