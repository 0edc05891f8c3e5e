use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::algorithms::batch::{batch_size, run_batches, Criterion, PartialResult};
use crate::algorithms::common::CrossCorrelator;
use crate::algorithms::mass::distance_profile;
use crate::core::matrix_profile::JoinContext;
use crate::error::{Error, Result};

/// Randomized, early-terminable matrix profile.
///
/// Query windows are visited in a seeded random order. The order is cut into
/// `parallelism` contiguous batches and each batch processes only its first
/// `floor(batch_size * sample)` windows. With `sample = 1.0` every window is
/// visited and the result is exact.
pub(crate) fn stamp(
    join: &JoinContext,
    sample: f64,
    parallelism: usize,
    seed: u64,
    values: &mut [f64],
    indices: &mut [usize],
) -> Result<()> {
    if !(sample > 0.0 && sample <= 1.0) {
        return Err(Error::InvalidSample { sample });
    }

    let order = permutation(join.query_windows(), seed);
    let bs = batch_size(order.len(), parallelism);
    let per_batch = (bs as f64 * sample).floor() as usize;

    run_batches(parallelism, values, indices, |batch| {
        let start = batch * bs;
        if start >= order.len() {
            return Ok(PartialResult::empty(Criterion::MinDistance));
        }
        let end = (start + per_batch).min(order.len());
        trace!(batch, start, end, "stamp batch");

        let mut partial = PartialResult::new(join.profile_len(), Criterion::MinDistance);
        let mut xc = CrossCorrelator::new(join.b().len());
        let mut row = vec![0.0; join.profile_len()];
        for &query in &order[start..end] {
            distance_profile(join, query, &mut row, &mut xc)?;
            partial.record_row(&row, query);
        }
        Ok(partial)
    })
}

/// Seeded permutation of `0..n`.
pub(crate) fn permutation(n: usize, seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix_profile::NO_MATCH;

    fn series() -> Vec<f64> {
        (0..80)
            .map(|i| (i as f64 * 0.35).sin() + 0.25 * (i as f64 * 1.3).cos())
            .collect()
    }

    fn run(join: &JoinContext, sample: f64, parallelism: usize, seed: u64) -> Result<(Vec<f64>, Vec<usize>)> {
        let mut values = vec![f64::INFINITY; join.profile_len()];
        let mut indices = vec![NO_MATCH; join.profile_len()];
        stamp(join, sample, parallelism, seed, &mut values, &mut indices)?;
        Ok((values, indices))
    }

    #[test]
    fn test_permutation_is_seeded() {
        let a = permutation(50, 7);
        let b = permutation(50, 7);
        let c = permutation(50, 8);
        assert_eq!(a, b);
        assert_ne!(a, c);
        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_sample_rejected() {
        let join = JoinContext::new(series(), None, 8).unwrap();
        assert!(matches!(
            run(&join, 0.0, 2, 0),
            Err(Error::InvalidSample { .. })
        ));
    }

    #[test]
    fn test_partial_sample_is_upper_bound() {
        let join = JoinContext::new(series(), None, 8).unwrap();
        let (exact, _) = run(&join, 1.0, 4, 3).unwrap();
        let (approx, _) = run(&join, 0.3, 4, 3).unwrap();
        for (i, (e, a)) in exact.iter().zip(&approx).enumerate() {
            assert!(*a >= *e - 1e-9, "approx below exact at {i}: {a} < {e}");
        }
        assert!(approx.iter().any(|d| d.is_finite()));
    }

    #[test]
    fn test_same_seed_same_result() {
        let join = JoinContext::new(series(), None, 8).unwrap();
        let first = run(&join, 0.5, 3, 42).unwrap();
        let second = run(&join, 0.5, 3, 42).unwrap();
        assert_eq!(first.0, second.0);
        assert_eq!(first.1, second.1);
    }

    #[test]
    fn test_parallelism_beyond_windows() {
        // more batches than query windows: trailing batches are empty
        let ts: Vec<f64> = (0..12).map(|i| (i as f64 * 0.9).sin()).collect();
        let join = JoinContext::new(ts, None, 4).unwrap();
        let (mp, idx) = run(&join, 1.0, 16, 1).unwrap();
        assert_eq!(mp.len(), 9);
        assert!(mp.iter().all(|d| d.is_finite()));
        assert!(idx.iter().all(|&i| i != NO_MATCH));
    }
}
