//! Continuous frame loop: drives one session from the observation stream

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::state::Session;

use super::listener::FrameEvent;

/// Per-stream counters, logged when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frames: u64,
    pub invalid: u64,
    pub commits: u64,
    pub resets: u64,
}

/// Owns the camera stream's session and feeds it frame by frame
pub struct FrameLoop {
    session: Session,
    stats: FrameStats,
}

impl FrameLoop {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            stats: FrameStats::default(),
        }
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn text(&self) -> &str {
        self.session.text()
    }

    /// Process frame events until the stream ends or the channel closes
    pub async fn run(&mut self, mut frame_rx: mpsc::Receiver<FrameEvent>) {
        info!(session = self.session.id(), "frame loop started");

        while let Some(event) = frame_rx.recv().await {
            if !self.handle_event(event) {
                break;
            }
        }

        info!(
            session = self.session.id(),
            frames = self.stats.frames,
            commits = self.stats.commits,
            invalid = self.stats.invalid,
            text = %self.session.text(),
            "frame loop stopped"
        );
    }

    /// Apply one event; returns false when the stream is finished
    fn handle_event(&mut self, event: FrameEvent) -> bool {
        match event {
            FrameEvent::Frame { observation, hand_area } => {
                self.stats.frames += 1;
                match self.session.ingest(&observation, hand_area) {
                    Ok(outcome) if outcome.accepted => {
                        self.stats.commits += 1;
                        debug!(text = %outcome.text, "frame committed");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        self.stats.invalid += 1;
                        warn!(frame = self.stats.frames, error = %e, "frame not ingested");
                    }
                }
                true
            }
            FrameEvent::Reset => {
                self.stats.resets += 1;
                self.session.reset();
                true
            }
            FrameEvent::EndOfStream => {
                debug!("observation stream ended");
                false
            }
        }
    }
}
