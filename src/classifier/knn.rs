//! k-nearest-neighbour gesture model over a labelled corpus

use std::collections::BTreeSet;

use crate::features::FeatureVector;

use super::corpus::LabeledCorpus;
use super::model::{Label, ModelError, ProbabilisticModel};

/// Votes among the `k` closest corpus rows; the share of votes per class is
/// its probability.
#[derive(Debug, Clone)]
pub struct KnnModel {
    corpus: LabeledCorpus,
    classes: Vec<Label>,
    k: usize,
}

impl KnnModel {
    pub fn new(corpus: LabeledCorpus, k: usize) -> Self {
        let classes: Vec<Label> = corpus
            .samples()
            .iter()
            .map(|(label, _)| label.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let k = k.clamp(1, corpus.len().max(1));
        Self { corpus, classes, k }
    }

    pub fn corpus(&self) -> &LabeledCorpus {
        &self.corpus
    }
}

impl ProbabilisticModel for KnnModel {
    fn classes(&self) -> &[Label] {
        &self.classes
    }

    fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f64>, ModelError> {
        if self.corpus.is_empty() {
            return Err(ModelError::Empty);
        }

        let mut by_distance: Vec<(f64, &Label)> = self
            .corpus
            .samples()
            .iter()
            .map(|(label, row)| (row.distance(features), label))
            .collect();
        by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut votes = vec![0usize; self.classes.len()];
        for (_, label) in by_distance.iter().take(self.k) {
            // classes is sorted, so binary search is exact
            if let Ok(idx) = self.classes.binary_search(label) {
                votes[idx] += 1;
            }
        }

        Ok(votes
            .into_iter()
            .map(|v| v as f64 / self.k as f64)
            .collect())
    }
}
