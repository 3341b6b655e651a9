//! Temporal gesture stabilization
//!
//! Each stage owns one piece of per-session state:
//! - StabilizationWindow: majority vote over recent accepted labels
//! - StabilityGate: consecutive-cycle hysteresis before a gesture may commit
//! - CommitPolicy: anti-repeat rules and the text buffer
//!
//! `StabilizationEngine` chains them; `Session` adds event reporting.

mod commit;
mod engine;
mod gate;
mod session;
mod window;

pub use commit::{CommitPolicy, CommitState, TextBuffer, TextMutation};
pub use engine::{IngestOutcome, Observation, StabilizationEngine};
pub use gate::StabilityGate;
pub use session::Session;
pub use window::{Gesture, StabilizationWindow};
