use crate::algorithms::batch::{Criterion, PartialResult};
use crate::algorithms::common::CrossCorrelator;
use crate::algorithms::mass::distance_profile;
use crate::core::matrix_profile::JoinContext;
use crate::error::Result;

/// Exhaustive matrix profile: one FFT distance profile per query window.
///
/// O(n^2 log n). Every window's row is folded in query order with `<=`, so
/// ties resolve to the latest query window. The rows accumulate privately
/// and reach the shared profile only if every row succeeded.
pub(crate) fn stmp(join: &JoinContext, values: &mut [f64], indices: &mut [usize]) -> Result<()> {
    let mut xc = CrossCorrelator::new(join.b().len());
    let mut row = vec![0.0; join.profile_len()];
    let mut acc = PartialResult::new(join.profile_len(), Criterion::MinDistance);

    for i in 0..join.query_windows() {
        distance_profile(join, i, &mut row, &mut xc)?;
        acc.record_row(&row, i);
    }

    acc.fold_into(values, indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::matrix_profile::NO_MATCH;
    use crate::error::Error;

    fn run(join: &JoinContext) -> Result<(Vec<f64>, Vec<usize>)> {
        let mut values = vec![f64::INFINITY; join.profile_len()];
        let mut indices = vec![NO_MATCH; join.profile_len()];
        stmp(join, &mut values, &mut indices)?;
        Ok((values, indices))
    }

    #[test]
    fn test_stmp_tiny_repeating() {
        // [1,2,3,2] repeats at 0 and 4 and [2,1,2,3] at 3 and 7
        let ts = vec![1.0, 2.0, 3.0, 2.0, 1.0, 2.0, 3.0, 2.0, 1.0, 2.0, 3.0, 2.0];
        let join = JoinContext::new(ts, None, 4).unwrap();
        let (mp, idx) = run(&join).unwrap();
        assert!(mp[0] < 1e-6, "got {}", mp[0]);
        assert!(mp[4] < 1e-6, "got {}", mp[4]);
        assert_eq!(idx[0] % 4, 0);
        assert_ne!(idx[0], 0);
    }

    #[test]
    fn test_stmp_known_motif() {
        let mut ts: Vec<f64> = (0..40).map(|i| ((i * 7) % 11) as f64 * 0.1).collect();
        let pattern = [0.0, 1.0, 0.0, -1.0, 0.5];
        ts[3..8].copy_from_slice(&pattern);
        ts[25..30].copy_from_slice(&pattern);
        let join = JoinContext::new(ts, None, 5).unwrap();
        let (mp, idx) = run(&join).unwrap();
        assert_eq!(idx[3], 25);
        assert_eq!(idx[25], 3);
        assert!(mp[3] < 1e-6);
    }

    #[test]
    fn test_stmp_error_leaves_profile_untouched() {
        let mut ts: Vec<f64> = (0..30).map(|i| (i as f64 * 0.5).sin()).collect();
        for v in &mut ts[20..26] {
            *v = 1.0;
        }
        let join = JoinContext::new(ts, None, 4).unwrap();
        let mut values = vec![f64::INFINITY; join.profile_len()];
        let mut indices = vec![NO_MATCH; join.profile_len()];
        let err = stmp(&join, &mut values, &mut indices).unwrap_err();
        assert!(matches!(err, Error::ZeroVariance));
        assert!(values.iter().all(|v| v.is_infinite()));
    }
}
