//! Error types for matrix profile construction and computation.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed parameters or inputs, detected before or during a single
    /// computation step. The call is aborted without touching the profile.
    Validation,
    /// Raised while a batch was running. Other batches still complete and
    /// are merged before the error is returned.
    Computation,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Computation => write!(f, "computation"),
        }
    }
}

/// Errors raised by matrix profile operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{series} series is empty")]
    EmptySeries { series: &'static str },

    #[error("subsequence length must be at least 2, got {m}")]
    SubsequenceTooShort { m: usize },

    #[error("subsequence length {m} must be at most half the reference length {n}")]
    SubsequenceTooLong { m: usize, n: usize },

    #[error("query series length {len} is shorter than the subsequence length {m}")]
    QueryTooShort { len: usize, m: usize },

    #[error("index {idx} is beyond the series length {len} minus the subsequence length {m}")]
    IndexOutOfRange { idx: usize, len: usize, m: usize },

    #[error("sample must be greater than 0 and at most 1, got {sample:.3}")]
    InvalidSample { sample: f64 },

    #[error("parallelism must be at least 1")]
    InvalidParallelism,

    #[error("profile length {profile} does not match the dot product length {dot}")]
    LengthMismatch { profile: usize, dot: usize },

    #[error("query length {m} exceeds the correlator length {n}")]
    QueryTooLong { m: usize, n: usize },

    #[error(
        "snapshot has {profile} profile and {profile_index} index entries, expected {expected}"
    )]
    SnapshotLength {
        expected: usize,
        profile: usize,
        profile_index: usize,
    },

    #[error("standard deviation is zero")]
    ZeroVariance,

    #[error("fft failed: {0}")]
    Fft(#[from] realfft::FftError),

    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("batch {batch} exited without reporting a result")]
    WorkerLost { batch: usize },

    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl Error {
    /// Classify this error per the validation/computation split.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::EmptySeries { .. }
            | Error::SubsequenceTooShort { .. }
            | Error::SubsequenceTooLong { .. }
            | Error::QueryTooShort { .. }
            | Error::IndexOutOfRange { .. }
            | Error::InvalidSample { .. }
            | Error::InvalidParallelism
            | Error::LengthMismatch { .. }
            | Error::QueryTooLong { .. }
            | Error::SnapshotLength { .. }
            | Error::Snapshot(_) => ErrorKind::Validation,
            Error::ZeroVariance
            | Error::Fft(_)
            | Error::WorkerPool(_)
            | Error::WorkerLost { .. } => ErrorKind::Computation,
        }
    }
}
