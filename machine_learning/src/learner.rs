use ndarray::{Array2, ArrayView2};

use crate::Result;

/// A fitted model able to score rows.
pub trait Classifier {
    /// The labels the model knows, in the order of its probability columns.
    fn classes(&self) -> &[i64];

    /// The amount of features the model was fitted on.
    fn n_features(&self) -> usize;

    /// Scores every row of `x`.
    ///
    /// # Arguments
    /// * `x` - A `(rows, n_features)` matrix.
    ///
    /// # Returns
    /// A `(rows, classes().len())` matrix of per-class probabilities, or a
    /// size mismatch error if `x` has the wrong amount of columns.
    fn predict_proba(&self, x: ArrayView2<f64>) -> Result<Array2<f64>>;
}

/// A training algorithm.
pub trait Learner {
    type Output: Classifier;

    /// Fits a new model on `x` and `y`.
    ///
    /// # Arguments
    /// * `x` - A `(rows, features)` matrix.
    /// * `y` - One label per row of `x`.
    fn fit(&self, x: ArrayView2<f64>, y: &[i64]) -> Result<Self::Output>;
}
