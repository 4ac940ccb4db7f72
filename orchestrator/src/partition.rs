//! Deterministic train/evaluation split and balanced sharding.

use std::ops::Range;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

/// Share of the rows held back for evaluation.
const EVAL_FRACTION: f64 = 0.2;

/// Row indices of both sides of a split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub eval: Vec<usize>,
}

/// Splits `rows` rows into training and evaluation indices.
///
/// The evaluation side gets `floor(0.2 * rows)` rows. Membership only
/// depends on `rows` and `seed`.
///
/// # Arguments
/// * `rows` - How many rows the dataset has.
/// * `seed` - The permutation seed.
pub fn split(rows: usize, seed: u64) -> Split {
    let n_eval = (rows as f64 * EVAL_FRACTION).floor() as usize;

    let mut order: Vec<usize> = (0..rows).collect();
    order.shuffle(&mut StdRng::seed_from_u64(seed));

    let train = order.split_off(n_eval);
    Split { train, eval: order }
}

/// Splits `total` samples among `num_workers` and returns the shard for `worker_id`.
///
/// Ranges are contiguous, disjoint and cover `0..total`. Sizes differ by at
/// most one, the first `total % num_workers` shards getting the extra row.
pub fn shard_range(total: usize, worker_id: usize, num_workers: usize) -> Range<usize> {
    let base = total / num_workers;
    let rem = total % num_workers;

    let start = worker_id * base + worker_id.min(rem);
    let extra = usize::from(worker_id < rem);

    start..start + base + extra
}

/// Every shard of `total` samples among `num_workers`, in worker order.
pub fn shard_ranges(total: usize, num_workers: usize) -> Vec<Range<usize>> {
    (0..num_workers)
        .map(|w| shard_range(total, w, num_workers))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn split_sizes() {
        let s = split(100, 42);
        assert_eq!((s.train.len(), s.eval.len()), (80, 20));

        let s = split(101, 42);
        assert_eq!((s.train.len(), s.eval.len()), (81, 20));

        let s = split(4, 42);
        assert_eq!((s.train.len(), s.eval.len()), (4, 0));
    }

    #[test]
    fn split_is_a_deterministic_partition() {
        let a = split(57, 42);
        assert_eq!(a, split(57, 42));

        let all: BTreeSet<_> = a.train.iter().chain(&a.eval).copied().collect();
        assert_eq!(all.len(), 57);
        assert_eq!(all.into_iter().collect::<Vec<_>>(), (0..57).collect::<Vec<_>>());
    }

    #[test]
    fn shard_range_balanced() {
        // total 10, workers 3 => sizes 4,3,3
        assert_eq!(shard_range(10, 0, 3), 0..4);
        assert_eq!(shard_range(10, 1, 3), 4..7);
        assert_eq!(shard_range(10, 2, 3), 7..10);
    }

    #[test]
    fn shards_cover_every_row_once() {
        for total in [0, 1, 7, 81, 100] {
            for workers in 1..6 {
                let ranges = shard_ranges(total, workers);
                let sizes: Vec<_> = ranges.iter().map(|r| r.len()).collect();

                assert_eq!(sizes.iter().sum::<usize>(), total);
                assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);
                assert!(ranges.windows(2).all(|w| w[0].end == w[1].start));
            }
        }
    }
}
