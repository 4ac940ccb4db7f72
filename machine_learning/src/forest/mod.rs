//! Random forest classifier, the baseline weak learner of the ensemble.

mod tree;

use std::collections::BTreeSet;

use log::debug;
use ndarray::{Array2, ArrayView2};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{Classifier, Learner, MlErr, Result};
use tree::DecisionTree;

/// How many features each split considers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxFeatures {
    Sqrt,
    All,
    Fixed(usize),
}

/// Hyperparameters of a `RandomForestLearner`.
#[derive(Debug, Clone, Copy)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub max_features: MaxFeatures,
    pub seed: u64,
}

impl ForestParams {
    fn max_features(&self, n_features: usize) -> usize {
        let wanted = match self.max_features {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::All => n_features,
            MaxFeatures::Fixed(n) => n,
        };
        wanted.clamp(n_features.min(1), n_features)
    }
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 10,
            max_depth: None,
            min_samples_split: 2,
            max_features: MaxFeatures::Sqrt,
            seed: 42,
        }
    }
}

/// Fits bootstrap-aggregated CART trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomForestLearner {
    params: ForestParams,
}

impl RandomForestLearner {
    pub fn new(params: ForestParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }
}

/// A fitted random forest.
///
/// Its probability columns follow the sorted distinct labels it was fitted
/// on, so a forest fitted on a shard missing some class is narrower than one
/// that saw every class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    classes: Vec<i64>,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl Learner for RandomForestLearner {
    type Output = RandomForest;

    fn fit(&self, x: ArrayView2<f64>, y: &[i64]) -> Result<RandomForest> {
        let (rows, n_features) = x.dim();
        if rows != y.len() {
            return Err(MlErr::SizeMismatch {
                a: "features",
                b: "labels",
                got: rows,
                expected: y.len(),
            });
        }
        if rows == 0 {
            return Err(MlErr::EmptyDataset);
        }

        let classes: Vec<i64> = y.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let y_idx: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_default())
            .collect();

        let params = self.params;
        let trees = (0..params.n_trees.max(1))
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(t as u64));
                let bootstrap = (0..rows).map(|_| rng.random_range(0..rows)).collect();
                DecisionTree::fit(x, &y_idx, classes.len(), bootstrap, &params, &mut rng)
            })
            .collect::<Vec<_>>();

        debug!(rows = rows, features = n_features, classes = classes.len(), trees = trees.len(); "fitted random forest");

        Ok(RandomForest {
            classes,
            n_features,
            trees,
        })
    }
}

impl RandomForest {
    /// Checks that the forest can predict without indexing out of bounds,
    /// as a decoded forest may not come from `RandomForestLearner`.
    ///
    /// # Returns
    /// What is wrong with the forest, if anything.
    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        if self.classes.is_empty() {
            return Err("forest has no classes".to_string());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }

        self.trees
            .iter()
            .enumerate()
            .try_for_each(|(i, tree)| {
                tree.validate(self.n_features, self.classes.len())
                    .map_err(|e| format!("tree {i}: {e}"))
            })
    }
}

impl Classifier for RandomForest {
    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, x: ArrayView2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features {
            return Err(MlErr::SizeMismatch {
                a: "input",
                b: "model features",
                got: x.ncols(),
                expected: self.n_features,
            });
        }

        let width = self.classes.len();
        let mut out = Array2::zeros((x.nrows(), width));
        let scale = 1.0 / self.trees.len() as f64;

        for (row, mut acc) in x.outer_iter().zip(out.outer_iter_mut()) {
            let row = row.to_vec();
            for tree in &self.trees {
                acc.iter_mut()
                    .zip(tree.leaf_proba(&row))
                    .for_each(|(a, p)| *a += p * scale);
            }
        }

        Ok(out)
    }
}
