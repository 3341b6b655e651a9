//! Confidence and distance rejection around an injected model

use std::path::Path;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::features::FeatureVector;

use super::corpus::{LabeledCorpus, ReferenceCorpus};
use super::knn::KnnModel;
use super::model::{Label, Model, ModelError};

/// Outcome of classifying one frame
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationResult {
    /// Trusted label; confidence is absent when the model can't report one
    Label { label: Label, confidence: Option<f64> },
    /// Not trustworthy enough to count toward the gesture stream
    Rejected,
}

impl ClassificationResult {
    pub fn label(&self) -> Option<&Label> {
        match self {
            ClassificationResult::Label { label, .. } => Some(label),
            ClassificationResult::Rejected => None,
        }
    }
}

/// Veto thresholds applied to probabilistic models
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RejectionThresholds {
    pub confidence: f64,
    pub distance: f64,
}

impl Default for RejectionThresholds {
    fn default() -> Self {
        Self {
            confidence: EngineConfig::DEFAULT_CONFIDENCE_THRESHOLD,
            distance: EngineConfig::DEFAULT_DISTANCE_THRESHOLD,
        }
    }
}

impl From<&EngineConfig> for RejectionThresholds {
    fn from(config: &EngineConfig) -> Self {
        Self {
            confidence: config.confidence_threshold,
            distance: config.distance_threshold,
        }
    }
}

/// Turns model output into an accepted label or an explicit rejection
#[derive(Debug)]
pub struct RejectionClassifier {
    model: Model,
    reference: Option<ReferenceCorpus>,
    thresholds: RejectionThresholds,
}

impl RejectionClassifier {
    pub fn new(model: Model, thresholds: RejectionThresholds) -> Self {
        Self {
            model,
            reference: None,
            thresholds,
        }
    }

    /// Enable distance rejection against the given rows
    pub fn with_reference(mut self, reference: ReferenceCorpus) -> Self {
        self.reference = Some(reference);
        self
    }

    /// k-NN model over the corpus, with the same corpus as reference set
    pub fn from_corpus(corpus: LabeledCorpus, config: &EngineConfig) -> Self {
        let reference = corpus.reference();
        let model = KnnModel::new(corpus, config.neighbors);
        Self::new(Model::probabilistic(model), config.into()).with_reference(reference)
    }

    /// Load a corpus file and build a classifier from it
    pub fn load(path: &Path, config: &EngineConfig) -> EngineResult<Self> {
        let corpus = LabeledCorpus::load(path)?;
        Ok(Self::from_corpus(corpus, config))
    }

    pub fn model_kind(&self) -> &'static str {
        self.model.kind()
    }

    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// Classify one feature vector. Model failures reject the frame.
    pub fn classify(&self, features: &FeatureVector) -> ClassificationResult {
        let result = match &self.model {
            Model::Probabilistic(model) => {
                model
                    .predict_proba(features)
                    .and_then(|probs| best_class(model.classes(), &probs))
                    .map(|(label, confidence)| self.gate(features, label, confidence))
            }
            // No probabilities, so nothing to gate on
            Model::LabelOnly(model) => model.predict(features).map(|label| {
                ClassificationResult::Label {
                    label,
                    confidence: None,
                }
            }),
        };

        result.unwrap_or_else(|e| {
            warn!(error = %e, "classifier failed, rejecting frame");
            ClassificationResult::Rejected
        })
    }

    fn gate(&self, features: &FeatureVector, label: Label, confidence: f64) -> ClassificationResult {
        // NaN confidence fails this comparison and is rejected too
        if !(confidence >= self.thresholds.confidence) {
            debug!(%label, confidence, "rejected: low confidence");
            return ClassificationResult::Rejected;
        }

        if let Some(reference) = &self.reference {
            if let Some(distance) = reference.min_distance(features) {
                if distance > self.thresholds.distance {
                    debug!(%label, distance, "rejected: far from reference corpus");
                    return ClassificationResult::Rejected;
                }
            }
        }

        ClassificationResult::Label {
            label,
            confidence: Some(confidence),
        }
    }
}

/// Arg-max over probabilities; the first index wins ties
fn best_class(classes: &[Label], probs: &[f64]) -> Result<(Label, f64), ModelError> {
    if probs.len() != classes.len() {
        return Err(ModelError::ShapeMismatch {
            expected: classes.len(),
            got: probs.len(),
        });
    }

    let mut best: Option<(usize, f64)> = None;
    for (idx, &p) in probs.iter().enumerate() {
        if !p.is_finite() {
            continue;
        }
        match best {
            Some((_, bp)) if !(p > bp) => {}
            _ => best = Some((idx, p)),
        }
    }

    best.map(|(idx, p)| (classes[idx].clone(), p))
        .ok_or(ModelError::Empty)
}
