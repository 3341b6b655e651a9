//! A session: one engine instance plus the event channel it reports to
//!
//! Both deployment shapes (socket clients and the frame loop) drive the
//! engine through this type, so they share identical semantics.

use tokio::sync::broadcast;
use tracing::debug;

use crate::error::EngineResult;
use crate::events::{SessionId, TextEvent};
use crate::features::{self, LandmarkFrame};

use super::engine::{IngestOutcome, Observation, StabilizationEngine};

pub struct Session {
    id: SessionId,
    engine: StabilizationEngine,
    event_tx: broadcast::Sender<TextEvent>,
}

impl Session {
    pub fn new(
        id: SessionId,
        engine: StabilizationEngine,
        event_tx: broadcast::Sender<TextEvent>,
    ) -> Self {
        let session = Self {
            id,
            engine,
            event_tx,
        };
        session.emit(TextEvent::SessionOpened { session: id });
        session
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Ingest one observation. When the caller has no hand area, it is
    /// measured from the landmarks (or taken as 0 for pre-classified input).
    pub fn ingest(&mut self, observation: &Observation, hand_area: Option<f64>) -> EngineResult<IngestOutcome> {
        let area = hand_area.unwrap_or_else(|| measure_area(observation));
        let outcome = self.engine.ingest(observation, area)?;

        if let Some(mutation) = &outcome.committed {
            self.emit(TextEvent::Committed {
                session: self.id,
                mutation: mutation.clone(),
                text: outcome.text.clone(),
            });
        }

        Ok(outcome)
    }

    pub fn reset(&mut self) -> String {
        let text = self.engine.reset();
        self.emit(TextEvent::Reset { session: self.id });
        text
    }

    pub fn text(&self) -> &str {
        self.engine.text()
    }

    fn emit(&self, event: TextEvent) {
        debug!(?event, "emitting text event");
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.emit(TextEvent::SessionClosed {
            session: self.id,
            text: self.engine.text().to_owned(),
        });
    }
}

fn measure_area(observation: &Observation) -> f64 {
    match observation {
        Observation::Landmarks(raw) => LandmarkFrame::try_from(raw)
            .map(|frame| features::hand_area(&frame))
            .unwrap_or(0.0),
        Observation::Gesture(_) => 0.0,
    }
}
