//! The stabilization engine: one instance per camera stream or client
//!
//! Pipeline per cycle:
//! landmarks -> features -> label or rejection -> majority vote
//! -> stability gate -> commit policy -> text.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::classifier::{ClassificationResult, Label, RejectionClassifier};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::features::{self, LandmarkFrame, RawLandmarks};

use super::commit::{CommitPolicy, CommitState, TextMutation};
use super::gate::StabilityGate;
use super::window::{Gesture, StabilizationWindow};

/// One observation cycle's input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observation {
    /// Raw landmarks; the engine normalizes and classifies them
    Landmarks(RawLandmarks),
    /// Already classified upstream; `None` means nothing was recognised
    Gesture(Option<Label>),
}

/// Result of one `ingest` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestOutcome {
    /// Smoothed gesture for this cycle, None when empty
    pub gesture: Option<Label>,
    /// The edit made this cycle, if any
    pub committed: Option<TextMutation>,
    /// Whether the text changed this cycle
    pub accepted: bool,
    /// Full text after this cycle
    pub text: String,
}

/// Temporal gesture stabilizer owning all per-session state
#[derive(Debug)]
pub struct StabilizationEngine {
    classifier: Option<Arc<RejectionClassifier>>,
    window: StabilizationWindow,
    gate: StabilityGate,
    policy: CommitPolicy,
}

impl StabilizationEngine {
    /// Create an engine. Without a classifier only pre-classified
    /// observations can be ingested.
    pub fn new(config: &EngineConfig, classifier: Option<Arc<RejectionClassifier>>) -> Self {
        Self {
            classifier,
            window: StabilizationWindow::new(config.window_capacity),
            gate: StabilityGate::new(config.stability_threshold),
            policy: CommitPolicy::new(config.repeat_factor),
        }
    }

    /// Run one observation cycle.
    ///
    /// Input errors and a missing classifier are reported before any state
    /// is touched.
    pub fn ingest(&mut self, observation: &Observation, hand_area: f64) -> EngineResult<IngestOutcome> {
        if !hand_area.is_finite() || hand_area < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "hand_area must be a non-negative number, got {}",
                hand_area
            )));
        }

        let result = match observation {
            Observation::Landmarks(raw) => {
                let frame = LandmarkFrame::try_from(raw)?;
                let classifier = self.classifier.as_ref().ok_or_else(|| {
                    EngineError::ClassifierUnavailable("no classifier loaded".into())
                })?;
                classifier.classify(&features::normalize(&frame))
            }
            Observation::Gesture(Some(label)) => ClassificationResult::Label {
                label: label.clone(),
                confidence: None,
            },
            Observation::Gesture(None) => ClassificationResult::Rejected,
        };

        Ok(self.step(&result, hand_area))
    }

    /// Advance the smoother, gate and commit policy with a classification
    pub fn step(&mut self, result: &ClassificationResult, hand_area: f64) -> IngestOutcome {
        // a blank label is the "no hand" sentinel, never a symbol
        let rejected = ClassificationResult::Rejected;
        let result = match result.label() {
            Some(label) if label.is_blank() => &rejected,
            _ => result,
        };

        let gesture = self.window.observe(result);
        if matches!(result, ClassificationResult::Rejected) {
            debug!("frame rejected, window cleared");
        }

        let committed = self
            .gate
            .observe(gesture.clone())
            .and_then(|fired| self.policy.apply(&fired, hand_area));

        IngestOutcome {
            gesture: gesture.label().cloned(),
            accepted: committed.is_some(),
            committed,
            text: self.policy.text().to_owned(),
        }
    }

    /// Clear text and all stabilization state. Returns the (empty) text.
    pub fn reset(&mut self) -> String {
        self.window.clear();
        self.gate.reset();
        self.policy.reset();
        info!("engine reset");
        self.policy.text().to_owned()
    }

    pub fn text(&self) -> &str {
        self.policy.text()
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn commit_state(&self) -> &CommitState {
        self.policy.state()
    }

    /// Current gate candidate and its consecutive count
    pub fn stability(&self) -> (Option<&Gesture>, u32) {
        (self.gate.candidate(), self.gate.consecutive())
    }

    pub fn window_len(&self) -> usize {
        self.window.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Model, ModelError, ProbabilisticModel, RejectionThresholds};
    use crate::features::{FeatureVector, FLAT_LEN};

    /// Puts `confidence` on "B" and splits the rest between "A" and "C"
    struct MostlyB {
        classes: Vec<Label>,
        confidence: f64,
    }

    impl ProbabilisticModel for MostlyB {
        fn classes(&self) -> &[Label] {
            &self.classes
        }

        fn predict_proba(&self, _: &FeatureVector) -> Result<Vec<f64>, ModelError> {
            let rest = (1.0 - self.confidence) / 2.0;
            Ok(vec![rest, self.confidence, rest])
        }
    }

    fn engine_with(confidence: f64) -> StabilizationEngine {
        let classifier = RejectionClassifier::new(
            Model::probabilistic(MostlyB {
                classes: vec!["A".into(), "B".into(), "C".into()],
                confidence,
            }),
            RejectionThresholds::default(),
        );
        StabilizationEngine::new(&EngineConfig::default(), Some(Arc::new(classifier)))
    }

    fn landmarks() -> Observation {
        Observation::Landmarks(RawLandmarks::Flat(
            (0..FLAT_LEN).map(|i| (i % 7) as f64 * 0.05).collect(),
        ))
    }

    fn gesture(label: &str) -> Observation {
        Observation::Gesture(Some(label.into()))
    }

    #[test]
    fn test_confident_landmarks_commit_after_threshold() {
        let mut engine = engine_with(0.9);
        let outcomes: Vec<IngestOutcome> =
            (0..6).map(|_| engine.ingest(&landmarks(), 0.2).unwrap()).collect();

        assert!(outcomes[..5].iter().all(|o| !o.accepted));
        assert!(outcomes[5].accepted);
        assert_eq!(outcomes[5].gesture, Some("B".into()));
        assert_eq!(engine.text(), "B");
    }

    #[test]
    fn test_low_confidence_never_commits() {
        let mut engine = engine_with(0.3);
        for _ in 0..30 {
            let outcome = engine.ingest(&landmarks(), 0.2).unwrap();
            assert!(!outcome.accepted);
            assert_eq!(outcome.gesture, None);
        }
        assert_eq!(engine.text(), "");
    }

    #[test]
    fn test_invalid_input_does_not_mutate() {
        let mut engine = engine_with(0.9);
        for _ in 0..3 {
            engine.ingest(&gesture("A"), 0.2).unwrap();
        }

        let bad = Observation::Landmarks(RawLandmarks::Flat(vec![0.0; 10]));
        let err = engine.ingest(&bad, 0.2).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
        assert_eq!(engine.window_len(), 3);
        assert_eq!(engine.stability().1, 3);

        let err = engine.ingest(&gesture("A"), f64::NAN).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
        assert_eq!(engine.stability().1, 3);
    }

    #[test]
    fn test_landmarks_without_classifier() {
        let mut engine = StabilizationEngine::new(&EngineConfig::default(), None);
        let err = engine.ingest(&landmarks(), 0.2).unwrap_err();
        assert!(matches!(err, EngineError::ClassifierUnavailable(_)));

        // pre-classified input still works
        assert!(engine.ingest(&gesture("A"), 0.2).is_ok());
        assert_eq!(engine.window_len(), 1);
    }

    #[test]
    fn test_null_gesture_is_rejection() {
        let mut engine = StabilizationEngine::new(&EngineConfig::default(), None);
        engine.ingest(&gesture("A"), 0.2).unwrap();
        engine.ingest(&gesture("A"), 0.2).unwrap();
        let outcome = engine.ingest(&Observation::Gesture(None), 0.2).unwrap();
        assert_eq!(outcome.gesture, None);
        assert_eq!(engine.window_len(), 0);
        assert_eq!(engine.stability(), (Some(&Gesture::Empty), 1));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut engine = StabilizationEngine::new(&EngineConfig::default(), None);
        for _ in 0..8 {
            engine.ingest(&gesture("A"), 0.2).unwrap();
        }
        assert_eq!(engine.text(), "A");

        assert_eq!(engine.reset(), "");
        assert_eq!(engine.text(), "");
        assert_eq!(engine.window_len(), 0);
        assert_eq!(engine.stability(), (None, 0));
        assert_eq!(engine.commit_state(), &CommitState::default());
    }

    #[test]
    fn test_observation_json_shapes() {
        let obs: Observation = serde_json::from_str(r#"{"gesture":"A"}"#).unwrap();
        assert_eq!(obs, gesture("A"));

        let obs: Observation = serde_json::from_str(r#"{"gesture":null}"#).unwrap();
        assert_eq!(obs, Observation::Gesture(None));

        let obs: Observation =
            serde_json::from_str(r#"{"landmarks":[{"x":0.1,"y":0.2,"z":0.0}]}"#).unwrap();
        assert!(matches!(obs, Observation::Landmarks(RawLandmarks::Points(_))));
    }
}
