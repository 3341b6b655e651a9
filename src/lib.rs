//! gesture-text: turns a stream of hand-gesture observations into stable,
//! debounced text edits.
//!
//! The core is `state::StabilizationEngine`:
//! - normalizes 21-point hand landmarks into a feature vector
//! - classifies with confidence/distance rejection
//! - smooths labels with a majority vote over recent frames
//! - requires a gesture to hold for N cycles before it may commit
//! - suppresses accidental repeats unless the hand is re-presented larger
//!
//! The daemon binary exposes it over a Unix socket and, optionally, as a
//! continuous frame loop reading newline-delimited observations.

pub mod classifier;
pub mod config;
pub mod error;
pub mod events;
pub mod features;
pub mod frames;
pub mod ipc;
pub mod lifecycle;
pub mod state;

pub use error::{EngineError, EngineResult};
pub use state::{IngestOutcome, Observation, StabilizationEngine};
