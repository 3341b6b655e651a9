//! Events module for text changes
//!
//! Sessions broadcast these so the daemon can log (or forward) every edit
//! without reaching into session state.

use serde::{Deserialize, Serialize};

use crate::state::TextMutation;

/// Identifies one engine instance (a client connection or the frame loop)
pub type SessionId = u64;

/// Events emitted by sessions as their text changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextEvent {
    /// A new engine instance was created
    SessionOpened { session: SessionId },

    /// A gesture changed the text
    Committed {
        session: SessionId,
        mutation: TextMutation,
        /// Text after the edit
        text: String,
    },

    /// The session's text and stabilization state were cleared
    Reset { session: SessionId },

    /// The engine instance was dropped
    SessionClosed {
        session: SessionId,
        /// Text at the time the session ended
        text: String,
    },
}

impl TextEvent {
    pub fn session(&self) -> SessionId {
        match self {
            TextEvent::SessionOpened { session }
            | TextEvent::Committed { session, .. }
            | TextEvent::Reset { session }
            | TextEvent::SessionClosed { session, .. } => *session,
        }
    }
}

impl std::fmt::Display for TextEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextEvent::SessionOpened { session } => write!(f, "SESSION_OPENED #{}", session),
            TextEvent::Committed { session, text, .. } => {
                write!(f, "COMMITTED #{} {:?}", session, text)
            }
            TextEvent::Reset { session } => write!(f, "RESET #{}", session),
            TextEvent::SessionClosed { session, text } => {
                write!(f, "SESSION_CLOSED #{} {:?}", session, text)
            }
        }
    }
}
