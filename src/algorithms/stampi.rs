use tracing::trace;

use crate::algorithms::common::CrossCorrelator;
use crate::algorithms::mass::{distance_profile, mass};
use crate::core::matrix_profile::{JoinContext, NO_MATCH};
use crate::error::Result;

/// Append one sample and extend the profile by one entry (STAMPI).
///
/// The caches are rebuilt for the grown series and exactly one new
/// distance-profile row is computed:
///
/// - **Self-join**: the new window is compared with every window. Earlier
///   entries take the new window wherever it is at least as close, and the
///   new entry takes its nearest earlier window.
/// - **AB-join**: the sample extends `B`. The new reference window is compared
///   with every `A` window; earlier entries keep their values because `A` did
///   not change.
///
/// Nothing is written until the row has been computed, so a failed sample
/// leaves `join`, `values` and `indices` exactly as they were.
pub(crate) fn append(
    join: &mut JoinContext,
    values: &mut Vec<f64>,
    indices: &mut Vec<usize>,
    value: f64,
) -> Result<()> {
    let grown = join.appended(value)?;
    let m = grown.m();
    let new_idx = grown.profile_len() - 1;

    let row = if grown.is_self_join() {
        let mut row = vec![0.0; grown.profile_len()];
        let mut xc = CrossCorrelator::new(grown.b().len());
        distance_profile(&grown, new_idx, &mut row, &mut xc)?;
        row
    } else {
        let a = grown.a();
        let mut row = vec![0.0; grown.query_windows()];
        let mut xc = CrossCorrelator::new(a.len());
        let a_spectrum = xc.spectrum(a)?;
        mass(
            &grown.b()[new_idx..new_idx + m],
            &grown.a_stats().std,
            &a_spectrum,
            &mut xc,
            &mut row,
        )?;
        row
    };

    let (best, best_idx) = nearest(&row);
    if grown.is_self_join() {
        for (j, &d) in row.iter().enumerate().take(new_idx) {
            if d.is_finite() && d <= values[j] {
                values[j] = d;
                indices[j] = new_idx;
            }
        }
    }
    values.push(best);
    indices.push(best_idx);
    *join = grown;

    trace!(new_idx, best, "appended sample");
    Ok(())
}

/// Smallest finite entry and its position; the first one wins ties.
fn nearest(row: &[f64]) -> (f64, usize) {
    row.iter()
        .enumerate()
        .filter(|(_, d)| d.is_finite())
        .fold((f64::INFINITY, NO_MATCH), |(best, best_idx), (j, &d)| {
            if d < best {
                (d, j)
            } else {
                (best, best_idx)
            }
        })
}
