use crate::error::{Error, Result};

/// Rolling mean and standard deviation for all windows of length `m`.
///
/// Computed via a single-pass sliding window over cumulative sums and
/// sums-of-squares. Standard deviations are population (divide by `m`).
#[derive(Debug, Clone, PartialEq)]
pub struct RollingStats {
    pub mean: Vec<f64>,
    pub std: Vec<f64>,
}

impl RollingStats {
    /// Compute rolling statistics for windows of length `m`.
    pub fn compute(ts: &[f64], m: usize) -> Result<Self> {
        if m == 0 {
            return Err(Error::SubsequenceTooShort { m });
        }
        if ts.len() < m {
            return Err(Error::QueryTooShort { len: ts.len(), m });
        }

        let n = ts.len();
        let n_subs = n - m + 1;

        let mut cumsum = vec![0.0; n + 1];
        let mut cumsum_sq = vec![0.0; n + 1];
        for i in 0..n {
            cumsum[i + 1] = cumsum[i] + ts[i];
            cumsum_sq[i + 1] = cumsum_sq[i] + ts[i] * ts[i];
        }

        let mut mean = Vec::with_capacity(n_subs);
        let mut std = Vec::with_capacity(n_subs);
        let m_f = m as f64;
        for i in 0..n_subs {
            let mu = (cumsum[i + m] - cumsum[i]) / m_f;
            // E[X^2] - E[X]^2 can dip below zero by rounding
            let var = ((cumsum_sq[i + m] - cumsum_sq[i]) / m_f - mu * mu).max(0.0);
            mean.push(mu);
            std.push(var.sqrt());
        }

        Ok(Self { mean, std })
    }

    /// Number of windows covered.
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }
}

/// Z-normalize a window: subtract its mean and divide by its population
/// standard deviation.
pub fn z_normalize(window: &[f64]) -> Result<Vec<f64>> {
    if window.is_empty() {
        return Err(Error::EmptySeries { series: "query" });
    }
    let n = window.len() as f64;
    let mu = window.iter().sum::<f64>() / n;
    let mut out: Vec<f64> = window.iter().map(|x| x - mu).collect();
    let sigma = (out.iter().map(|x| x * x).sum::<f64>() / n).sqrt();
    if sigma == 0.0 {
        return Err(Error::ZeroVariance);
    }
    for x in &mut out {
        *x /= sigma;
    }
    Ok(out)
}

/// Per-window mean and inverse centred norm `1 / sqrt(sum((x - mu)^2))`.
///
/// The product of two inverse norms turns a centred covariance into a
/// Pearson correlation, which is what MPX tracks along each diagonal.
#[derive(Debug, Clone)]
pub struct MeanInvNorm {
    pub mean: Vec<f64>,
    pub inv_norm: Vec<f64>,
}

impl MeanInvNorm {
    /// Means are summed per window rather than from cumulative sums, so a
    /// constant window gets an exactly zero norm and an infinite inverse.
    pub fn compute(ts: &[f64], m: usize) -> Result<Self> {
        if m == 0 || ts.len() < m {
            return Err(Error::QueryTooShort { len: ts.len(), m });
        }
        let (mean, inv_norm) = ts
            .windows(m)
            .map(|w| {
                let mu = w.iter().sum::<f64>() / m as f64;
                let ss: f64 = w.iter().map(|x| (x - mu) * (x - mu)).sum();
                (mu, 1.0 / ss.sqrt())
            })
            .unzip();
        Ok(Self { mean, inv_norm })
    }
}
