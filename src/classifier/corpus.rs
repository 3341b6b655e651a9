//! Labelled feature corpus
//!
//! The corpus file holds normalized feature rows with their labels:
//!
//! ```json
//! {"samples": [{"label": "A", "features": [63 floats]}, ...]}
//! ```
//!
//! It backs the k-NN model and doubles as the reference set for
//! distance-based rejection.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::features::{FeatureVector, FLAT_LEN};

use super::model::Label;

/// One row of the corpus file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub label: Label,
    pub features: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CorpusFile {
    samples: Vec<Sample>,
}

/// Validated labelled rows
#[derive(Debug, Clone)]
pub struct LabeledCorpus {
    samples: Vec<(Label, FeatureVector)>,
}

impl LabeledCorpus {
    /// Load a corpus file; any failure means no classifier can be built
    pub fn load(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ClassifierUnavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        let file: CorpusFile = serde_json::from_str(&text).map_err(|e| {
            EngineError::ClassifierUnavailable(format!("cannot parse {}: {}", path.display(), e))
        })?;

        let corpus = Self::from_samples(file.samples)?;
        info!(?path, rows = corpus.len(), "classifier corpus loaded");
        Ok(corpus)
    }

    pub fn from_samples(samples: Vec<Sample>) -> EngineResult<Self> {
        if samples.is_empty() {
            return Err(EngineError::ClassifierUnavailable("corpus is empty".into()));
        }

        let samples = samples
            .into_iter()
            .enumerate()
            .map(|(idx, s)| {
                let width = s.features.len();
                if s.label.is_blank() {
                    return Err(EngineError::ClassifierUnavailable(format!(
                        "row {} has a blank label",
                        idx
                    )));
                }
                if s.features.iter().any(|v| !v.is_finite()) {
                    return Err(EngineError::ClassifierUnavailable(format!(
                        "row {} has a non-finite value",
                        idx
                    )));
                }
                FeatureVector::from_row(s.features)
                    .map(|f| (s.label, f))
                    .ok_or_else(|| {
                        EngineError::ClassifierUnavailable(format!(
                            "row {} has {} features, expected {}",
                            idx, width, FLAT_LEN
                        ))
                    })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[(Label, FeatureVector)] {
        &self.samples
    }

    /// Unlabelled copy of the rows for distance rejection
    pub fn reference(&self) -> ReferenceCorpus {
        ReferenceCorpus::new(self.samples.iter().map(|(_, f)| f.clone()).collect())
    }
}

/// Feature rows a new observation must be near to be trusted
#[derive(Debug, Clone)]
pub struct ReferenceCorpus {
    rows: Vec<FeatureVector>,
}

impl ReferenceCorpus {
    pub fn new(rows: Vec<FeatureVector>) -> Self {
        Self { rows }
    }

    /// Distance to the closest row, or None for an empty corpus
    pub fn min_distance(&self, features: &FeatureVector) -> Option<f64> {
        self.rows
            .iter()
            .map(|row| row.distance(features))
            .min_by(|a, b| a.total_cmp(b))
    }
}
