//! Static batch partitioning and the order-preserving merge reducer shared by
//! STAMP, STOMP and MPX.

use std::sync::mpsc::{self, Receiver};

use tracing::{trace, warn};

use crate::core::matrix_profile::NO_MATCH;
use crate::error::{Error, Result};

/// How a candidate value competes with the current best.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Criterion {
    /// Lower distance wins; ties go to the newer candidate.
    MinDistance,
    /// Higher correlation wins; ties keep the incumbent.
    MaxCorrelation,
}

impl Criterion {
    /// Value meaning "no match yet".
    ///
    /// Correlations start below -1 so that a perfectly anti-correlated
    /// candidate is still recorded.
    pub fn identity(self) -> f64 {
        match self {
            Criterion::MinDistance => f64::INFINITY,
            Criterion::MaxCorrelation => f64::NEG_INFINITY,
        }
    }

    /// Whether `candidate` should replace `current`.
    ///
    /// An infinite distance is the excluded sentinel, never a match.
    #[inline(always)]
    pub fn improves(self, candidate: f64, current: f64) -> bool {
        match self {
            Criterion::MinDistance => candidate <= current && candidate.is_finite(),
            Criterion::MaxCorrelation => candidate > current,
        }
    }
}

/// Private profile produced by exactly one batch and consumed once by the reducer.
#[derive(Debug, Clone)]
pub(crate) struct PartialResult {
    criterion: Criterion,
    values: Vec<f64>,
    indices: Vec<usize>,
}

impl PartialResult {
    pub fn new(len: usize, criterion: Criterion) -> Self {
        Self {
            criterion,
            values: vec![criterion.identity(); len],
            indices: vec![NO_MATCH; len],
        }
    }

    /// Result of a batch whose range lies entirely past the end of the work.
    pub fn empty(criterion: Criterion) -> Self {
        Self::new(0, criterion)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Offer a single candidate for slot `slot`.
    #[inline(always)]
    pub fn offer(&mut self, slot: usize, value: f64, neighbor: usize) {
        if self.criterion.improves(value, self.values[slot]) {
            self.values[slot] = value;
            self.indices[slot] = neighbor;
        }
    }

    /// Fold a whole distance-profile row computed for query window `query`.
    pub fn record_row(&mut self, row: &[f64], query: usize) {
        for (slot, &value) in row.iter().enumerate() {
            self.offer(slot, value, query);
        }
    }

    /// Fold this partial into a shared profile.
    pub fn fold_into(&self, values: &mut [f64], indices: &mut [usize]) -> Result<()> {
        fold(self.criterion, values, indices, &self.values, &self.indices)
    }
}

/// Element-wise fold of `src` into `dst` under `criterion`, carrying indices.
pub(crate) fn fold(
    criterion: Criterion,
    dst_values: &mut [f64],
    dst_indices: &mut [usize],
    src_values: &[f64],
    src_indices: &[usize],
) -> Result<()> {
    if src_values.len() != dst_values.len() || src_indices.len() != dst_indices.len() {
        return Err(Error::LengthMismatch {
            profile: dst_values.len(),
            dot: src_values.len(),
        });
    }
    for (slot, (&v, &i)) in src_values.iter().zip(src_indices).enumerate() {
        if criterion.improves(v, dst_values[slot]) {
            dst_values[slot] = v;
            dst_indices[slot] = i;
        }
    }
    Ok(())
}

/// Batch size for `len` work items over `parallelism` batches: `ceil(len / p)`, at least 1.
pub(crate) fn batch_size(len: usize, parallelism: usize) -> usize {
    len.div_ceil(parallelism.max(1)).max(1)
}

/// Run `parallelism` batches on a dedicated pool and reduce their partials
/// into `values`/`indices`.
///
/// Every batch reports through its own one-shot channel. The calling thread
/// drains the channels in batch order, so the merged result does not depend
/// on which batch finishes first. A failed batch does not stop the others:
/// its error is recorded, draining continues, and the last recorded error is
/// returned once every batch has been joined.
pub(crate) fn run_batches<F>(
    parallelism: usize,
    values: &mut [f64],
    indices: &mut [usize],
    work: F,
) -> Result<()>
where
    F: Fn(usize) -> Result<PartialResult> + Sync,
{
    if parallelism == 0 {
        return Err(Error::InvalidParallelism);
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(parallelism)
        .thread_name(|i| format!("mp-batch-{i}"))
        .build()?;

    let (senders, receivers): (Vec<_>, Vec<_>) =
        (0..parallelism).map(|_| mpsc::sync_channel(1)).unzip();

    pool.in_place_scope(|scope| {
        for (batch, tx) in senders.into_iter().enumerate() {
            let work = &work;
            scope.spawn(move |_| {
                trace!(batch, "batch started");
                // receiver outlives the scope; a failed send means it is gone
                let _ = tx.send(work(batch));
            });
        }
        reduce(receivers, values, indices)
    })
}

fn reduce(
    receivers: Vec<Receiver<Result<PartialResult>>>,
    values: &mut [f64],
    indices: &mut [usize],
) -> Result<()> {
    let mut last_err = None;
    for (batch, rx) in receivers.into_iter().enumerate() {
        let outcome = match rx.recv() {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::WorkerLost { batch }),
        };
        let merged = outcome.and_then(|partial| {
            if partial.is_empty() {
                trace!(batch, "batch had no work");
                return Ok(());
            }
            partial.fold_into(values, indices)
        });
        if let Err(e) = merged {
            warn!(batch, error = %e, "batch failed, draining remaining batches");
            last_err = Some(e);
        }
    }
    match last_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
