use tracing::{debug, trace};

use crate::algorithms::batch::{batch_size, fold, run_batches, Criterion, PartialResult};
use crate::core::matrix_profile::{JoinContext, NO_MATCH};
use crate::core::stats::MeanInvNorm;
use crate::error::Result;

/// Window statistics and covariance deltas for one series.
struct MpxSeries<'a> {
    ts: &'a [f64],
    m: usize,
    mean: Vec<f64>,
    inv_norm: Vec<f64>,
    /// `df[i] = (x[i+m-1] - x[i-1]) / 2`, zero at 0.
    df: Vec<f64>,
    /// `dg[i] = (x[i+m-1] - mu[i]) + (x[i-1] - mu[i-1])`, zero at 0.
    dg: Vec<f64>,
}

impl<'a> MpxSeries<'a> {
    fn new(ts: &'a [f64], m: usize) -> Result<Self> {
        let MeanInvNorm { mean, inv_norm } = MeanInvNorm::compute(ts, m)?;
        let windows = mean.len();
        let mut df = vec![0.0; windows];
        let mut dg = vec![0.0; windows];
        for i in 0..windows - 1 {
            df[i + 1] = 0.5 * (ts[m + i] - ts[i]);
            dg[i + 1] = (ts[m + i] - mean[i + 1]) + (ts[i] - mean[i]);
        }
        Ok(Self {
            ts,
            m,
            mean,
            inv_norm,
            df,
            dg,
        })
    }

    fn windows(&self) -> usize {
        self.mean.len()
    }
}

/// Which series walks down the rows of the diagonal sweep and how a
/// (row, column) pair lands in the reference-indexed profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Rows and columns are the same series; every pair is offered both ways.
    SelfJoin,
    /// Rows are `A`, columns are `B`.
    RowsQuery,
    /// Rows are `B`, columns are `A`.
    RowsReference,
}

/// Matrix profile via MPX: centred covariances updated along diagonals.
///
/// Diagonals start at `max(m/4, 1)` for self-joins and `0` for AB-joins and
/// are split into contiguous ranges, one per batch. Batches keep the best
/// Pearson correlation per reference window. An AB-join sweeps twice, once
/// with each series as the rows, so every (query, reference) pair is covered.
/// The reduced correlations are converted to distances with
/// `sqrt(2m(1 - c))` and folded into `values`/`indices`.
pub(crate) fn mpx(
    join: &JoinContext,
    parallelism: usize,
    values: &mut [f64],
    indices: &mut [usize],
) -> Result<()> {
    let m = join.m();
    let len = join.profile_len();
    let mut corr = vec![Criterion::MaxCorrelation.identity(); len];
    let mut corr_idx = vec![NO_MATCH; len];

    if join.is_self_join() {
        let series = MpxSeries::new(join.a(), m)?;
        let excl = (m / 4).max(1);
        sweep(Pass::SelfJoin, &series, &series, excl, parallelism, &mut corr, &mut corr_idx)?;
    } else {
        let query = MpxSeries::new(join.a(), m)?;
        let reference = MpxSeries::new(join.b(), m)?;
        sweep(Pass::RowsQuery, &query, &reference, 0, parallelism, &mut corr, &mut corr_idx)?;
        sweep(Pass::RowsReference, &reference, &query, 0, parallelism, &mut corr, &mut corr_idx)?;
    }

    let two_m = 2.0 * m as f64;
    let distances: Vec<f64> = corr
        .iter()
        .zip(&corr_idx)
        .map(|(&c, &i)| {
            if i == NO_MATCH {
                f64::INFINITY
            } else {
                (two_m * (1.0 - c)).max(0.0).sqrt()
            }
        })
        .collect();
    debug!(
        matched = corr_idx.iter().filter(|&&i| i != NO_MATCH).count(),
        len, "mpx correlations reduced"
    );

    fold(Criterion::MinDistance, values, indices, &distances, &corr_idx)
}

fn sweep(
    pass: Pass,
    rows: &MpxSeries<'_>,
    cols: &MpxSeries<'_>,
    first_diag: usize,
    parallelism: usize,
    corr: &mut [f64],
    corr_idx: &mut [usize],
) -> Result<()> {
    let n_rows = rows.windows();
    let n_diags = n_rows.saturating_sub(first_diag);
    let bs = batch_size(n_diags, parallelism);
    let len = corr.len();

    run_batches(parallelism, corr, corr_idx, |batch| {
        let start = first_diag + batch * bs;
        if start >= n_rows {
            return Ok(PartialResult::empty(Criterion::MaxCorrelation));
        }
        let end = (start + bs).min(n_rows);
        trace!(batch, ?pass, start, end, "mpx batch");

        let mut partial = PartialResult::new(len, Criterion::MaxCorrelation);
        for diag in start..end {
            walk_diagonal(pass, rows, cols, diag, &mut partial);
        }
        Ok(partial)
    })
}

/// Walk diagonal `diag`: row window `off + diag` against column window `off`.
fn walk_diagonal(
    pass: Pass,
    rows: &MpxSeries<'_>,
    cols: &MpxSeries<'_>,
    diag: usize,
    partial: &mut PartialResult,
) {
    let m = rows.m;
    let offset_max = (rows.windows() - diag).min(cols.windows());

    let mu_r = rows.mean[diag];
    let mu_c = cols.mean[0];
    let mut c: f64 = rows.ts[diag..diag + m]
        .iter()
        .zip(&cols.ts[..m])
        .map(|(x, y)| (x - mu_r) * (y - mu_c))
        .sum();

    for off in 0..offset_max {
        let r = off + diag;
        if off > 0 {
            c += cols.df[off] * rows.dg[r] + rows.df[r] * cols.dg[off];
        }
        let mut c_cmp = c * cols.inv_norm[off] * rows.inv_norm[r];
        // constant windows have no correlation
        if !c_cmp.is_finite() {
            continue;
        }
        if c_cmp > 1.0 {
            c_cmp = 1.0;
        }
        match pass {
            Pass::SelfJoin => {
                partial.offer(off, c_cmp, r);
                partial.offer(r, c_cmp, off);
            }
            Pass::RowsQuery => partial.offer(off, c_cmp, r),
            Pass::RowsReference => partial.offer(r, c_cmp, off),
        }
    }
}
