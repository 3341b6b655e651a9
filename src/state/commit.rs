//! Commit policy and the text buffer it edits
//!
//! Decides whether a gesture that passed the stability gate actually changes
//! the text. Holding the same symbol only repeats it when the hand is
//! re-presented noticeably larger (closer to the camera).

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::Label;

use super::window::Gesture;

/// A text edit produced by a committed gesture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextMutation {
    /// A symbol label was appended
    Append { symbol: Label },
    /// A single space was appended
    Space,
    /// The last character was removed
    Delete { removed: char },
}

/// The accumulated output text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
}

impl TextBuffer {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn append(&mut self, s: &str) {
        self.text.push_str(s);
    }

    fn pop(&mut self) -> Option<char> {
        self.text.pop()
    }

    fn clear(&mut self) {
        self.text.clear();
    }
}

/// The last gesture that changed the text and the hand size at that moment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitState {
    pub last_accepted_gesture: Option<Label>,
    pub last_accepted_area: f64,
}

/// Applies stability-gated gestures to the text buffer
#[derive(Debug, Clone)]
pub struct CommitPolicy {
    state: CommitState,
    buffer: TextBuffer,
    repeat_factor: f64,
}

impl CommitPolicy {
    pub fn new(repeat_factor: f64) -> Self {
        Self {
            state: CommitState::default(),
            buffer: TextBuffer::default(),
            repeat_factor,
        }
    }

    /// Apply one fired gesture. Returns the edit made, if any.
    pub fn apply(&mut self, gesture: &Gesture, hand_area: f64) -> Option<TextMutation> {
        let label = match gesture {
            Gesture::Empty => {
                // Hand gone: whatever comes next is eligible again
                self.state.last_accepted_gesture = None;
                self.state.last_accepted_area = hand_area;
                return None;
            }
            Gesture::Sign(label) => label,
        };

        let repeated = self.state.last_accepted_gesture.as_ref() == Some(label);

        let mutation = if label.is_space() {
            if repeated {
                debug!("space suppressed: already committed");
                return None;
            }
            self.buffer.append(" ");
            TextMutation::Space
        } else if label.is_del() {
            if repeated {
                debug!("delete suppressed: already committed");
                return None;
            }
            let removed = self.buffer.pop()?;
            TextMutation::Delete { removed }
        } else {
            if repeated && !(hand_area > self.state.last_accepted_area * self.repeat_factor) {
                debug!(
                    %label,
                    hand_area,
                    last_area = self.state.last_accepted_area,
                    "repeat suppressed: hand not re-presented"
                );
                return None;
            }
            self.buffer.append(label.as_str());
            TextMutation::Append {
                symbol: label.clone(),
            }
        };

        self.state.last_accepted_gesture = Some(label.clone());
        self.state.last_accepted_area = hand_area;
        info!(?mutation, text = %self.buffer.as_str(), "gesture committed");

        Some(mutation)
    }

    pub fn text(&self) -> &str {
        self.buffer.as_str()
    }

    pub fn state(&self) -> &CommitState {
        &self.state
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.state = CommitState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(label: &str) -> Gesture {
        Gesture::Sign(label.into())
    }

    fn policy_after_a(area: f64) -> CommitPolicy {
        let mut policy = CommitPolicy::new(1.30);
        policy.apply(&sign("A"), area);
        policy
    }

    #[test]
    fn test_first_letter_commits() {
        let mut policy = CommitPolicy::new(1.30);
        assert_eq!(
            policy.apply(&sign("A"), 0.1),
            Some(TextMutation::Append { symbol: "A".into() })
        );
        assert_eq!(policy.text(), "A");
        assert_eq!(policy.state().last_accepted_gesture, Some("A".into()));
        assert_eq!(policy.state().last_accepted_area, 0.1);
    }

    #[test]
    fn test_repeat_needs_larger_hand() {
        let mut policy = policy_after_a(0.10);

        // 0.12 is not above 0.10 * 1.30
        assert_eq!(policy.apply(&sign("A"), 0.12), None);
        assert_eq!(policy.text(), "A");
        assert_eq!(policy.state().last_accepted_area, 0.10);

        assert!(policy.apply(&sign("A"), 0.14).is_some());
        assert_eq!(policy.text(), "AA");
        assert_eq!(policy.state().last_accepted_area, 0.14);
    }

    #[test]
    fn test_different_letter_always_commits() {
        let mut policy = policy_after_a(0.5);
        assert!(policy.apply(&sign("B"), 0.01).is_some());
        assert_eq!(policy.text(), "AB");
    }

    #[test]
    fn test_space_once() {
        let mut policy = policy_after_a(0.2);
        assert_eq!(policy.apply(&sign("SPACE"), 0.2), Some(TextMutation::Space));
        assert_eq!(policy.apply(&sign("SPACE"), 0.9), None);
        assert_eq!(policy.text(), "A ");
    }

    #[test]
    fn test_delete_once() {
        let mut policy = policy_after_a(0.2);
        policy.apply(&sign("B"), 0.2);
        assert_eq!(
            policy.apply(&sign("DEL"), 0.2),
            Some(TextMutation::Delete { removed: 'B' })
        );
        assert_eq!(policy.apply(&sign("DEL"), 0.9), None);
        assert_eq!(policy.text(), "A");
    }

    #[test]
    fn test_delete_on_empty_buffer_is_noop() {
        let mut policy = CommitPolicy::new(1.30);
        assert_eq!(policy.apply(&sign("DEL"), 0.2), None);
        assert_eq!(policy.text(), "");
        assert_eq!(policy.state(), &CommitState::default());
    }

    #[test]
    fn test_empty_clears_last_accepted() {
        let mut policy = policy_after_a(0.2);
        assert_eq!(policy.apply(&Gesture::Empty, 0.05), None);
        assert_eq!(policy.state().last_accepted_gesture, None);
        assert_eq!(policy.state().last_accepted_area, 0.05);

        // same letter is eligible again without a bigger hand
        assert!(policy.apply(&sign("A"), 0.05).is_some());
        assert_eq!(policy.text(), "AA");
    }

    #[test]
    fn test_reset() {
        let mut policy = policy_after_a(0.2);
        policy.reset();
        assert_eq!(policy.text(), "");
        assert_eq!(policy.state(), &CommitState::default());
    }
}
