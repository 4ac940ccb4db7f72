use ndarray::ArrayView2;
use rand::{Rng, seq::index};
use serde::{Deserialize, Serialize};

use super::ForestParams;

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        proba: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A CART classification tree stored as a flat node arena, root at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(super) struct DecisionTree {
    nodes: Vec<Node>,
}

struct Split {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl DecisionTree {
    /// Grows a tree over the `samples` rows of `x`.
    ///
    /// # Arguments
    /// * `x` - The full feature matrix.
    /// * `y` - Class index (not label) of every row of `x`.
    /// * `n_classes` - The width of the leaf distributions.
    /// * `samples` - Row indices to grow on, repetitions allowed.
    /// * `params` - Growth limits.
    /// * `rng` - Drives the per-node feature subsampling.
    pub(super) fn fit<R: Rng>(
        x: ArrayView2<f64>,
        y: &[usize],
        n_classes: usize,
        samples: Vec<usize>,
        params: &ForestParams,
        rng: &mut R,
    ) -> Self {
        let n_features = x.ncols();
        let max_features = params.max_features(n_features);

        let mut nodes = vec![Node::Leaf { proba: Vec::new() }];
        let mut pending = vec![(0, samples, 0)];

        while let Some((id, samples, depth)) = pending.pop() {
            let counts = class_counts(y, &samples, n_classes);
            let classes_present = counts.iter().filter(|&&c| c > 0).count();

            let can_split = classes_present > 1
                && samples.len() >= params.min_samples_split
                && params.max_depth.is_none_or(|max| depth < max);

            let split = can_split
                .then(|| {
                    let order = index::sample(rng, n_features, n_features);
                    best_split(x, y, &samples, n_classes, order.into_iter(), max_features)
                })
                .flatten();

            let Some(split) = split else {
                nodes[id] = Node::Leaf {
                    proba: normalize(&counts),
                };
                continue;
            };

            let (left, right): (Vec<_>, Vec<_>) = samples
                .into_iter()
                .partition(|&s| x[[s, split.feature]] <= split.threshold);

            let left_id = nodes.len();
            nodes.push(Node::Leaf { proba: Vec::new() });
            nodes.push(Node::Leaf { proba: Vec::new() });
            nodes[id] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left: left_id,
                right: left_id + 1,
            };

            pending.push((left_id, left, depth + 1));
            pending.push((left_id + 1, right, depth + 1));
        }

        Self { nodes }
    }

    /// Walks `row` down to its leaf.
    ///
    /// # Returns
    /// The class distribution stored in the leaf.
    pub(super) fn leaf_proba(&self, row: &[f64]) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { proba } => return proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Checks that the arena can be walked from any row of `n_features`
    /// values without going out of bounds or looping.
    ///
    /// # Returns
    /// What is wrong with the tree, if anything.
    pub(super) fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (id, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { proba } if proba.len() != n_classes => {
                    return Err(format!(
                        "leaf {id} has {} probabilities, expected {n_classes}",
                        proba.len()
                    ));
                }
                Node::Leaf { .. } => {}
                Node::Split { feature, .. } if *feature >= n_features => {
                    return Err(format!(
                        "split {id} reads feature {feature} of {n_features}"
                    ));
                }
                // Children come after their parent, so every walk terminates.
                Node::Split { left, right, .. } => {
                    for child in [*left, *right] {
                        if child <= id || child >= self.nodes.len() {
                            return Err(format!("split {id} points to node {child}"));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    #[cfg(test)]
    pub(super) fn len(&self) -> usize {
        self.nodes.len()
    }
}

fn class_counts(y: &[usize], samples: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &s in samples {
        counts[y[s]] += 1;
    }
    counts
}

fn normalize(counts: &[usize]) -> Vec<f64> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0.0; counts.len()];
    }
    counts.iter().map(|&c| c as f64 / total as f64).collect()
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Finds the threshold with the lowest weighted gini impurity.
///
/// Features are visited in the given order until `max_features` of them
/// turned out not to be constant over `samples`.
///
/// # Returns
/// `None` if every feature is constant over `samples`.
fn best_split<I>(
    x: ArrayView2<f64>,
    y: &[usize],
    samples: &[usize],
    n_classes: usize,
    features: I,
    max_features: usize,
) -> Option<Split>
where
    I: Iterator<Item = usize>,
{
    let n = samples.len();
    let total = class_counts(y, samples, n_classes);
    let mut best: Option<Split> = None;
    let mut column: Vec<(f64, usize)> = Vec::with_capacity(n);
    let mut informative = 0;

    for feature in features {
        if informative >= max_features {
            break;
        }

        column.clear();
        column.extend(samples.iter().map(|&s| (x[[s, feature]], y[s])));
        column.sort_by(|a, b| a.0.total_cmp(&b.0));

        if column[0].0 >= column[n - 1].0 {
            continue;
        }
        informative += 1;

        let mut left = vec![0; n_classes];
        for i in 0..n - 1 {
            left[column[i].1] += 1;

            let (lo, hi) = (column[i].0, column[i + 1].0);
            if lo >= hi {
                continue;
            }

            let right: Vec<_> = total.iter().zip(&left).map(|(t, l)| t - l).collect();
            let (nl, nr) = (i + 1, n - i - 1);
            let impurity = (nl as f64 * gini(&left, nl) + nr as f64 * gini(&right, nr)) / n as f64;

            if best.as_ref().is_none_or(|b| impurity < b.impurity) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(Split {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::forest::MaxFeatures;

    fn params() -> ForestParams {
        ForestParams {
            max_features: MaxFeatures::All,
            ..ForestParams::default()
        }
    }

    #[test]
    fn pure_node_is_a_single_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(x.view(), &[1, 1, 1], 2, vec![0, 1, 2], &params(), &mut rng);

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.leaf_proba(&[2.0]), &[0.0, 1.0]);
    }

    #[test]
    fn separates_on_the_informative_feature() {
        let x = array![[5.0, 0.0], [5.0, 1.0], [5.0, 8.0], [5.0, 9.0]];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(x.view(), &[0, 0, 1, 1], 2, vec![0, 1, 2, 3], &params(), &mut rng);

        assert_eq!(tree.leaf_proba(&[5.0, 0.5]), &[1.0, 0.0]);
        assert_eq!(tree.leaf_proba(&[5.0, 8.5]), &[0.0, 1.0]);
    }

    #[test]
    fn constant_features_yield_a_mixed_leaf() {
        let x = array![[1.0], [1.0], [1.0], [1.0]];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(x.view(), &[0, 1, 1, 1], 2, vec![0, 1, 2, 3], &params(), &mut rng);

        assert_eq!(tree.leaf_proba(&[1.0]), &[0.25, 0.75]);
    }

    #[test]
    fn constant_features_are_not_counted_against_the_budget() {
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 8.0], [1.0, 9.0]];
        let one = ForestParams {
            max_features: MaxFeatures::Fixed(1),
            ..params()
        };

        for seed in 0..8 {
            let mut rng = StdRng::seed_from_u64(seed);
            let tree = DecisionTree::fit(x.view(), &[0, 0, 1, 1], 2, vec![0, 1, 2, 3], &one, &mut rng);
            assert_eq!(tree.leaf_proba(&[1.0, 0.5]), &[1.0, 0.0]);
        }
    }

    #[test]
    fn fitted_trees_are_valid() {
        let x = array![[0.0, 3.0], [1.0, 2.0], [2.0, 1.0], [3.0, 0.0]];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(x.view(), &[0, 1, 2, 1], 3, vec![0, 1, 2, 3], &params(), &mut rng);

        assert!(tree.len() > 1);
        assert_eq!(tree.validate(2, 3), Ok(()));
        assert!(tree.validate(2, 2).is_err());
    }

    #[test]
    fn malformed_arenas_are_invalid() {
        let tree = |nodes: Vec<Node>| DecisionTree { nodes };
        let leaf = || Node::Leaf { proba: vec![0.5, 0.5] };
        let split = |feature, left, right| Node::Split {
            feature,
            threshold: 0.5,
            left,
            right,
        };

        assert!(tree(vec![]).validate(1, 2).is_err());
        assert!(tree(vec![split(0, 0, 0)]).validate(1, 2).is_err());
        assert!(tree(vec![split(0, 1, 5), leaf()]).validate(1, 2).is_err());
        assert!(tree(vec![split(3, 1, 2), leaf(), leaf()]).validate(1, 2).is_err());
        assert!(tree(vec![split(0, 1, 2), leaf(), split(0, 1, 1)]).validate(1, 2).is_err());
        assert_eq!(tree(vec![split(0, 1, 2), leaf(), leaf()]).validate(1, 2), Ok(()));
    }

    #[test]
    fn depth_limit_is_respected() {
        let x = array![[0.0], [1.0], [2.0], [3.0]];
        let limited = ForestParams {
            max_depth: Some(0),
            ..params()
        };
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(x.view(), &[0, 1, 0, 1], 2, vec![0, 1, 2, 3], &limited, &mut rng);

        assert_eq!(tree.len(), 1);
    }
}
