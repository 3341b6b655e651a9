//! Gesture classification with rejection
//!
//! Wraps an injected model (probabilistic or label-only) and vetoes
//! low-confidence or out-of-distribution frames.

mod corpus;
mod knn;
mod model;
mod rejection;

pub use corpus::{LabeledCorpus, ReferenceCorpus, Sample};
pub use knn::KnnModel;
pub use model::{Label, LabelModel, Model, ModelError, ProbabilisticModel};
pub use rejection::{ClassificationResult, RejectionClassifier, RejectionThresholds};
