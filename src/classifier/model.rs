//! Classifier seam
//!
//! Models are capability-tagged: a probabilistic model exposes per-class
//! probabilities and can be gated on confidence, a label-only model can't.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::FeatureVector;

/// A gesture label as produced by the classifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Inserts a single space
    pub const SPACE: &'static str = "SPACE";
    /// Deletes the last character
    pub const DEL: &'static str = "DEL";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_space(&self) -> bool {
        self.0 == Self::SPACE
    }

    pub fn is_del(&self) -> bool {
        self.0 == Self::DEL
    }

    /// Empty or whitespace-only labels mean "nothing recognised"
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Failure inside a model for a single prediction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("model returned {got} probabilities for {expected} classes")]
    ShapeMismatch { expected: usize, got: usize },

    #[error("model has no classes")]
    Empty,

    #[error("prediction failed: {0}")]
    Prediction(String),
}

/// A model that reports a probability for each of its classes
pub trait ProbabilisticModel: Send + Sync {
    /// Class labels, in the order probabilities are reported
    fn classes(&self) -> &[Label];

    /// One probability per entry of `classes()`
    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError>;
}

/// A model that only reports its single best label
pub trait LabelModel: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<Label, ModelError>;
}

/// An injected classifier, tagged by what it can report
pub enum Model {
    Probabilistic(Box<dyn ProbabilisticModel>),
    LabelOnly(Box<dyn LabelModel>),
}

impl Model {
    pub fn probabilistic(model: impl ProbabilisticModel + 'static) -> Self {
        Self::Probabilistic(Box::new(model))
    }

    pub fn label_only(model: impl LabelModel + 'static) -> Self {
        Self::LabelOnly(Box::new(model))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Model::Probabilistic(_) => "probabilistic",
            Model::LabelOnly(_) => "label_only",
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Model({})", self.kind())
    }
}
