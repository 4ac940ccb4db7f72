//! Ensemble voting by averaged class probabilities.

use std::collections::BTreeSet;

use log::{debug, warn};
use machine_learning::{Classifier, dataset::matrix_from_rows};
use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;

use crate::{Result, VoteErr};

/// The outcome of scoring a pool against labelled rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// Percentage of correctly predicted rows, rounded to 2 decimals.
    pub accuracy: f64,
    /// How many models took part in the vote.
    pub valid_models: usize,
    /// Rows are true labels, columns predicted labels, both over `labels`.
    pub confusion_matrix: Vec<Vec<u64>>,
    /// The sorted union of true and predicted labels.
    pub labels: Vec<i64>,
}

/// Scores the ensemble formed by `models` on `features`.
///
/// The first model fixes the reference class count: models whose output has
/// another width are left out of the vote. The remaining probabilities are
/// averaged without weights and every row is assigned the class with the
/// highest average.
///
/// # Arguments
/// * `models` - The pool, in any order.
/// * `features` - The rows to predict.
/// * `targets` - The true label of every row.
///
/// # Errors
/// `VoteErr::NoModels` or `VoteErr::FeaturesEmpty` on empty input,
/// `VoteErr::NoValidModels` if every model was left out, or a mismatch
/// error if the rows don't fit the targets or the models.
pub fn vote<M>(models: &[M], features: &[Vec<f64>], targets: &[i64]) -> Result<Verdict>
where
    M: Classifier + Sync,
{
    let Some(reference) = models.first() else {
        return Err(VoteErr::NoModels);
    };
    if features.is_empty() {
        return Err(VoteErr::FeaturesEmpty);
    }
    if features.len() != targets.len() {
        return Err(VoteErr::TargetsMismatch {
            rows: features.len(),
            targets: targets.len(),
        });
    }

    let x = matrix_from_rows(features)?;
    if x.ncols() != reference.n_features() {
        return Err(VoteErr::FeatureWidth {
            got: x.ncols(),
            expected: reference.n_features(),
        });
    }

    let classes = reference.classes();
    let k = classes.len();

    let probas: Vec<_> = models.par_iter().map(|m| m.predict_proba(x.view())).collect();

    let mut sum = Array2::<f64>::zeros((x.nrows(), k));
    let mut valid_models = 0;
    for (i, proba) in probas.into_iter().enumerate() {
        match proba {
            Ok(p) if p.ncols() == k => {
                sum += &p;
                valid_models += 1;
            }
            Ok(p) => {
                warn!(model = i, width = p.ncols(), reference = k; "skipping model with a different class count");
            }
            Err(e) => {
                warn!(model = i; "skipping model that can't predict: {e}");
            }
        }
    }

    if valid_models == 0 {
        return Err(VoteErr::NoValidModels);
    }

    let avg = sum / valid_models as f64;
    let predicted: Vec<i64> = avg.outer_iter().map(|row| classes[argmax(row)]).collect();

    let correct = predicted.iter().zip(targets).filter(|(p, t)| p == t).count();
    let accuracy = round2(correct as f64 / targets.len() as f64 * 100.0);
    let (labels, confusion_matrix) = confusion_matrix(targets, &predicted);

    debug!(rows = targets.len(), valid_models = valid_models, skipped = models.len() - valid_models; "vote done");

    Ok(Verdict {
        accuracy,
        valid_models,
        confusion_matrix,
        labels,
    })
}

/// Index of the first maximum of `row`.
fn argmax(row: ArrayView1<f64>) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 { (i, v) } else { best }
        })
        .0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Counts (true, predicted) pairs over the sorted union of both label sets.
fn confusion_matrix(truth: &[i64], predicted: &[i64]) -> (Vec<i64>, Vec<Vec<u64>>) {
    let labels: Vec<i64> = truth
        .iter()
        .chain(predicted)
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut matrix = vec![vec![0; labels.len()]; labels.len()];
    for (t, p) in truth.iter().zip(predicted) {
        // Both are in `labels` by construction.
        let (Ok(row), Ok(col)) = (labels.binary_search(t), labels.binary_search(p)) else {
            continue;
        };
        matrix[row][col] += 1;
    }

    (labels, matrix)
}
