//! Joins the ground truth and the submission on their normalized text.
use crate::annotations::AnnotationMap;
use crate::error::{EvalError, Result};
use ahash::AHashSet;
use itertools::Itertools;
use std::fmt::Display;

/// True and predicted label sets of one example present in both annotation maps. The labels are
/// borrowed from the maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedExample<'a> {
    pub true_labels: AHashSet<&'a str>,
    pub predicted_labels: AHashSet<&'a str>,
}

impl<'a> PairedExample<'a> {
    /// Builds a pair from two label sequences. Duplicated labels are collapsed.
    pub fn new<T, P>(true_labels: T, predicted_labels: P) -> Self
    where
        T: IntoIterator<Item = &'a str>,
        P: IntoIterator<Item = &'a str>,
    {
        Self {
            true_labels: true_labels.into_iter().collect(),
            predicted_labels: predicted_labels.into_iter().collect(),
        }
    }

    /// Number of labels both predicted and true.
    pub fn correct_count(&self) -> usize {
        self.true_labels
            .intersection(&self.predicted_labels)
            .count()
    }

    pub fn is_exact_match(&self) -> bool {
        self.true_labels == self.predicted_labels
    }
}

impl<'a> Display for PairedExample<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "([{}], [{}])",
            self.true_labels.iter().sorted().join(", "),
            self.predicted_labels.iter().sorted().join(", ")
        )
    }
}

/// Pairs every ground-truth example with the submitted example sharing its normalized text.
/// Examples present on one side only are ignored. The pairs follow the order of the sorted keys,
/// so that the sums computed over them are reproducible. Returns an error if no key is shared.
pub fn pair_annotations<'a>(
    ground_truth: &'a AnnotationMap,
    submission: &'a AnnotationMap,
) -> Result<Vec<PairedExample<'a>>> {
    let pairs: Vec<_> = ground_truth
        .iter()
        .sorted_unstable_by(|(k1, _), (k2, _)| k1.cmp(k2))
        .filter_map(|(key, truth)| {
            submission
                .get(key)
                .map(|predicted| PairedExample::new(truth.labels(), predicted.labels()))
        })
        .collect();
    if pairs.is_empty() {
        return Err(EvalError::NoOverlap);
    }
    log::debug!(
        "Paired {} examples ({} in the ground truth, {} in the submission)",
        pairs.len(),
        ground_truth.len(),
        submission.len()
    );
    Ok(pairs)
}
