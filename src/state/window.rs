//! Majority-vote smoothing over recent accepted labels

use std::collections::VecDeque;
use std::fmt;

use crate::classifier::{ClassificationResult, Label};

/// The smoothed gesture for one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gesture {
    /// Nothing trustworthy recognised this cycle
    Empty,
    /// Majority label of the window
    Sign(Label),
}

impl Gesture {
    pub fn label(&self) -> Option<&Label> {
        match self {
            Gesture::Empty => None,
            Gesture::Sign(label) => Some(label),
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gesture::Empty => write!(f, "<empty>"),
            Gesture::Sign(label) => write!(f, "{}", label),
        }
    }
}

/// Bounded FIFO of the most recent accepted labels
#[derive(Debug, Clone)]
pub struct StabilizationWindow {
    labels: VecDeque<Label>,
    capacity: usize,
}

impl StabilizationWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            labels: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Feed one classification and return this cycle's gesture.
    ///
    /// A rejection wipes the window so a stale majority can't outlive a
    /// classifier dropout.
    pub fn observe(&mut self, result: &ClassificationResult) -> Gesture {
        match result {
            ClassificationResult::Rejected => {
                self.labels.clear();
                Gesture::Empty
            }
            ClassificationResult::Label { label, .. } => {
                if self.labels.len() == self.capacity {
                    self.labels.pop_front();
                }
                self.labels.push_back(label.clone());
                self.majority()
                    .cloned()
                    .map(Gesture::Sign)
                    .unwrap_or(Gesture::Empty)
            }
        }
    }

    /// Most frequent label. On a tie, the label that first appears earliest
    /// in the window wins.
    pub fn majority(&self) -> Option<&Label> {
        let mut counts: Vec<(&Label, usize)> = Vec::new();
        for label in &self.labels {
            match counts.iter_mut().find(|(l, _)| *l == label) {
                Some((_, n)) => *n += 1,
                None => counts.push((label, 1)),
            }
        }

        let mut best: Option<(&Label, usize)> = None;
        for (label, n) in counts {
            if best.map_or(true, |(_, bn)| n > bn) {
                best = Some((label, n));
            }
        }
        best.map(|(label, _)| label)
    }

    pub fn clear(&mut self) {
        self.labels.clear();
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
