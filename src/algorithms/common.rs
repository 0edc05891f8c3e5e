use std::sync::Arc;

use realfft::num_complex::Complex;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};

use crate::error::{Error, Result};

/// Fourier-domain sliding dot product against a fixed-length reference.
///
/// Holds forward and inverse plans of length `n` plus scratch buffers, so one
/// correlator serves every query a worker issues. Correlators are cheap to
/// build and are never shared between workers; only the reference spectrum
/// produced by [`CrossCorrelator::spectrum`] is.
pub struct CrossCorrelator {
    n: usize,
    forward: Arc<dyn RealToComplex<f64>>,
    inverse: Arc<dyn ComplexToReal<f64>>,
    padded: Vec<f64>,
    freq: Vec<Complex<f64>>,
    output: Vec<f64>,
}

impl CrossCorrelator {
    /// Plan transforms for a reference series of length `n`.
    pub fn new(n: usize) -> Self {
        let mut planner = RealFftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(n);
        let inverse = planner.plan_fft_inverse(n);
        let padded = forward.make_input_vec();
        let freq = forward.make_output_vec();
        let output = inverse.make_output_vec();
        Self {
            n,
            forward,
            inverse,
            padded,
            freq,
            output,
        }
    }

    /// Length of the reference series this correlator was planned for.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Forward transform of a full reference series.
    pub fn spectrum(&mut self, ts: &[f64]) -> Result<Vec<Complex<f64>>> {
        if ts.len() != self.n {
            return Err(Error::LengthMismatch {
                profile: self.n,
                dot: ts.len(),
            });
        }
        self.padded.copy_from_slice(ts);
        let mut out = self.forward.make_output_vec();
        self.forward.process(&mut self.padded, &mut out)?;
        Ok(out)
    }

    /// Sliding dot product of `query` with every window of the reference
    /// whose transform is `reference`.
    ///
    /// The query is reversed into a zero-padded buffer of length `n`, the two
    /// spectra are multiplied pointwise and the product inverse-transformed.
    /// The first `m - 1` outputs are wrap-around terms and are dropped, leaving
    /// `n - m + 1` values.
    pub fn correlate(&mut self, query: &[f64], reference: &[Complex<f64>]) -> Result<Vec<f64>> {
        let m = query.len();
        if m == 0 {
            return Err(Error::EmptySeries { series: "query" });
        }
        if m > self.n {
            return Err(Error::QueryTooLong { m, n: self.n });
        }
        if reference.len() != self.freq.len() {
            return Err(Error::LengthMismatch {
                profile: self.freq.len(),
                dot: reference.len(),
            });
        }

        self.padded.fill(0.0);
        for (slot, &q) in self.padded.iter_mut().zip(query.iter().rev()) {
            *slot = q;
        }
        self.forward.process(&mut self.padded, &mut self.freq)?;

        for (q, r) in self.freq.iter_mut().zip(reference) {
            *q *= r;
        }
        // DC (and Nyquist for even n) of a real signal's spectrum are real
        self.freq[0].im = 0.0;
        if self.n % 2 == 0 {
            if let Some(last) = self.freq.last_mut() {
                last.im = 0.0;
            }
        }
        self.inverse.process(&mut self.freq, &mut self.output)?;

        let norm = 1.0 / self.n as f64;
        Ok(self.output[m - 1..].iter().map(|&x| x * norm).collect())
    }
}

/// Naive O(n*m) sliding dot product.
///
/// Returns a vector of length `ts.len() - q.len() + 1` where element `i` is
/// `dot(q, ts[i..i+m])`.
pub fn sliding_dot_product_naive(q: &[f64], ts: &[f64]) -> Vec<f64> {
    let m = q.len();
    if ts.len() < m {
        return Vec::new();
    }
    let n_subs = ts.len() - m + 1;

    (0..n_subs).map(|i| dot(q, &ts[i..i + m])).collect()
}

/// Inner product of two equal-length windows.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Apply an exclusion zone around index `idx`, setting entries within the zone to infinity.
///
/// The zone covers indices `[idx - zone, idx + zone]` (clamped to bounds).
#[inline]
pub fn apply_exclusion_zone(profile: &mut [f64], idx: usize, zone: usize) {
    let start = idx.saturating_sub(zone);
    let end = (idx + zone + 1).min(profile.len());
    if start >= end {
        return;
    }
    for val in &mut profile[start..end] {
        *val = f64::INFINITY;
    }
}
