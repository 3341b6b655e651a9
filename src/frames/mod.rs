//! Frame-stream deployment: a listener thread reading observations and an
//! async loop feeding them to a single engine session.

mod listener;
mod pipeline;

pub use listener::{parse_line, FrameError, FrameEvent, FrameListener, FrameSource};
pub use pipeline::{FrameLoop, FrameStats};
