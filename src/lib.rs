//! Matrix profile computation for univariate time series.
//!
//! A [`MatrixProfile`] holds a query series `A`, a reference series `B` (the
//! same series for a self-join) and a subsequence length `M`. For every
//! window of `B` it records the z-normalized Euclidean distance to its
//! nearest window of `A`, and where that window starts.
//!
//! Four exact-or-approximate routes fill the profile: exhaustive STMP,
//! randomized STAMP, incremental STOMP and the diagonal correlation sweep
//! MPX. The parallel ones split work into batches on a dedicated thread pool
//! and merge the partial profiles in batch order. New samples can be streamed
//! in with [`MatrixProfile::update`].
//!
//! ```
//! use matrix_profile::{Algorithm, ComputeOptions, MatrixProfile};
//!
//! let ts: Vec<f64> = (0..64).map(|i| (i as f64 * 0.3).sin()).collect();
//! let mut mp = MatrixProfile::self_join(&ts, 8).unwrap();
//! mp.compute(&ComputeOptions::new(Algorithm::Mpx).with_parallelism(4)).unwrap();
//! assert!(mp.profile().iter().all(|d| d.is_finite()));
//! ```

pub mod algorithms;
pub mod core;
pub mod error;

pub use crate::algorithms::common::{sliding_dot_product_naive, CrossCorrelator};
pub use crate::core::matrix_profile::{JoinContext, MatrixProfile, NO_MATCH};
pub use crate::core::options::{default_parallelism, Algorithm, ComputeOptions, UnknownAlgorithm};
pub use crate::core::stats::{z_normalize, MeanInvNorm, RollingStats};
pub use crate::error::{Error, ErrorKind, Result};
