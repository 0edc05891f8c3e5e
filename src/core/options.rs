use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Matrix profile algorithm variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Algorithm {
    /// Exhaustive: one FFT distance profile per query window.
    Stmp,
    /// Randomized order with early termination controlled by `sample`.
    Stamp,
    /// Incremental dot products, exact.
    #[default]
    Stomp,
    /// Diagonal-wise Pearson correlation, exact.
    Mpx,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Stmp => "STMP",
            Algorithm::Stamp => "STAMP",
            Algorithm::Stomp => "STOMP",
            Algorithm::Mpx => "MPX",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAlgorithm(pub String);

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown algorithm '{}', expected STMP, STAMP, STOMP or MPX", self.0)
    }
}

impl std::error::Error for UnknownAlgorithm {}

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "STMP" => Ok(Algorithm::Stmp),
            "STAMP" => Ok(Algorithm::Stamp),
            "STOMP" => Ok(Algorithm::Stomp),
            "MPX" => Ok(Algorithm::Mpx),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Parameters for [`MatrixProfile::compute`](crate::MatrixProfile::compute).
///
/// Missing fields fall back to [`ComputeOptions::default`] when deserializing:
///
/// ```
/// use matrix_profile::{Algorithm, ComputeOptions};
///
/// let opts: ComputeOptions =
///     serde_json::from_str(r#"{"algorithm": "STAMP", "sample": 0.25}"#).unwrap();
/// assert_eq!(opts.algorithm, Algorithm::Stamp);
/// assert!(opts.parallelism >= 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputeOptions {
    pub algorithm: Algorithm,
    /// Fraction of query windows STAMP visits, in (0, 1]. Ignored otherwise.
    pub sample: f64,
    /// Number of batches, and of worker threads running them.
    pub parallelism: usize,
    /// Seed for STAMP's permutation of query windows.
    pub seed: u64,
}

impl Default for ComputeOptions {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Stomp,
            sample: 1.0,
            parallelism: default_parallelism(),
            seed: 0,
        }
    }
}

impl ComputeOptions {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    pub fn with_sample(mut self, sample: f64) -> Self {
        self.sample = sample;
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the options before any work is scheduled.
    pub fn validate(&self) -> Result<()> {
        if self.parallelism == 0 {
            return Err(Error::InvalidParallelism);
        }
        if self.algorithm == Algorithm::Stamp && !(self.sample > 0.0 && self.sample <= 1.0) {
            return Err(Error::InvalidSample {
                sample: self.sample,
            });
        }
        Ok(())
    }
}

/// Twice the available hardware parallelism.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        * 2
}
