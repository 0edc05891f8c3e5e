use tracing::trace;

use crate::algorithms::batch::{batch_size, run_batches, Criterion, PartialResult};
use crate::algorithms::common::{dot, CrossCorrelator};
use crate::algorithms::mass::distance_profile_from_dot;
use crate::core::matrix_profile::JoinContext;
use crate::error::Result;

/// Compute the matrix profile using the STOMP algorithm.
///
/// STOMP exploits the relationship between the dot products of consecutive
/// query windows:
/// `QT[i][j] = QT[i-1][j-1] - B[j-1]*A[i-1] + B[j+m-1]*A[i+m-1]`
///
/// Query windows are split into `parallelism` contiguous batches. Each batch
/// pays one FFT correlation for its first row and then slides the dot
/// products forward in O(n) per row, giving O(n^2) total.
pub(crate) fn stomp(
    join: &JoinContext,
    parallelism: usize,
    values: &mut [f64],
    indices: &mut [usize],
) -> Result<()> {
    let n_rows = join.query_windows();
    let bs = batch_size(n_rows, parallelism);

    run_batches(parallelism, values, indices, |batch| {
        let start = batch * bs;
        if start >= n_rows {
            return Ok(PartialResult::empty(Criterion::MinDistance));
        }
        let end = (start + bs).min(n_rows);
        trace!(batch, start, end, "stomp batch");
        stomp_rows(join, start, end)
    })
}

/// Row-wise STOMP over query windows `start..end`.
fn stomp_rows(join: &JoinContext, start: usize, end: usize) -> Result<PartialResult> {
    let m = join.m();
    let a = join.a();
    let b = join.b();
    let n_cols = join.profile_len();

    let mut partial = PartialResult::new(n_cols, Criterion::MinDistance);
    let mut xc = CrossCorrelator::new(b.len());
    let mut qt = xc.correlate(&a[start..start + m], join.b_spectrum())?;
    let mut row = vec![0.0; n_cols];

    for i in start..end {
        if i > start {
            let drop = a[i - 1];
            let add = a[i + m - 1];
            // descending so qt[j - 1] still holds the previous row
            for j in (1..n_cols).rev() {
                qt[j] = qt[j - 1] - b[j - 1] * drop + b[j + m - 1] * add;
            }
            qt[0] = dot(&a[i..i + m], &b[..m]);
        }
        distance_profile_from_dot(join, &qt, i, &mut row)?;
        partial.record_row(&row, i);
    }

    Ok(partial)
}
