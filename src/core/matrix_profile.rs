use realfft::num_complex::Complex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::algorithms::common::CrossCorrelator;
use crate::algorithms::{mass, mpx, stamp, stampi, stmp, stomp};
use crate::core::options::{Algorithm, ComputeOptions};
use crate::core::stats::RollingStats;
use crate::error::{Error, Result};

/// Index value for a profile entry that has not been matched yet.
pub const NO_MATCH: usize = usize::MAX;

/// Query series, reference series and everything cached from them.
///
/// Read-only while a computation runs; workers borrow it concurrently.
/// A self-join stores a single buffer that serves as both `A` and `B`.
#[derive(Debug, Clone)]
pub struct JoinContext {
    a: Vec<f64>,
    b: Option<Vec<f64>>,
    m: usize,
    a_stats: RollingStats,
    b_stats: Option<RollingStats>,
    b_spectrum: Vec<Complex<f64>>,
}

impl JoinContext {
    /// Validate the inputs and build every cache.
    ///
    /// `b = None` means a self-join of `a`.
    pub fn new(a: Vec<f64>, b: Option<Vec<f64>>, m: usize) -> Result<Self> {
        if a.is_empty() {
            return Err(Error::EmptySeries { series: "query" });
        }
        if b.as_ref().is_some_and(|b| b.is_empty()) {
            return Err(Error::EmptySeries {
                series: "reference",
            });
        }
        if m < 2 {
            return Err(Error::SubsequenceTooShort { m });
        }
        let n = b.as_ref().map_or(a.len(), Vec::len);
        if 2 * m > n {
            return Err(Error::SubsequenceTooLong { m, n });
        }
        if a.len() < m {
            return Err(Error::QueryTooShort { len: a.len(), m });
        }

        let a_stats = RollingStats::compute(&a, m)?;
        let b_stats = match &b {
            Some(b) => Some(RollingStats::compute(b, m)?),
            None => None,
        };
        let reference = b.as_deref().unwrap_or(&a);
        let b_spectrum = CrossCorrelator::new(reference.len()).spectrum(reference)?;

        Ok(Self {
            a,
            b,
            m,
            a_stats,
            b_stats,
            b_spectrum,
        })
    }

    /// A copy of this context with one more sample appended, caches rebuilt.
    ///
    /// Self-joins grow the shared buffer; AB-joins grow the reference only.
    pub fn appended(&self, value: f64) -> Result<Self> {
        let mut a = self.a.clone();
        let mut b = self.b.clone();
        match &mut b {
            Some(b) => b.push(value),
            None => a.push(value),
        }
        Self::new(a, b, self.m)
    }

    /// Query series `A`.
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Reference series `B`; the same buffer as `A` for a self-join.
    pub fn b(&self) -> &[f64] {
        self.b.as_deref().unwrap_or(&self.a)
    }

    pub fn m(&self) -> usize {
        self.m
    }

    pub fn is_self_join(&self) -> bool {
        self.b.is_none()
    }

    /// Number of query windows, `len(A) - M + 1`.
    pub fn query_windows(&self) -> usize {
        self.a.len() - self.m + 1
    }

    /// Number of reference windows, which is the profile length `N - M + 1`.
    pub fn profile_len(&self) -> usize {
        self.b().len() - self.m + 1
    }

    pub fn a_stats(&self) -> &RollingStats {
        &self.a_stats
    }

    pub fn b_stats(&self) -> &RollingStats {
        self.b_stats.as_ref().unwrap_or(&self.a_stats)
    }

    /// Full Fourier coefficients of `B`.
    pub fn b_spectrum(&self) -> &[Complex<f64>] {
        &self.b_spectrum
    }

    /// Trivial-match exclusion radius for the distance-profile algorithms.
    pub fn exclusion_zone(&self) -> Option<usize> {
        self.is_self_join().then_some(self.m / 2)
    }
}

/// A matrix profile together with the series it was computed from.
///
/// `profile[j]` is the smallest distance found so far between reference
/// window `j` and any query window, and `profile_index[j]` is the start of
/// that query window (or [`NO_MATCH`]). Both always have length
/// `len(B) - M + 1`.
///
/// # Examples
///
/// ```
/// use matrix_profile::{Algorithm, ComputeOptions, MatrixProfile};
///
/// let ts = vec![0.0, 0.99, 1.0, 0.0, 0.0, 0.98, 1.0, 0.0, 0.0, 0.96, 1.0, 0.0];
/// let mut mp = MatrixProfile::self_join(&ts, 4).unwrap();
/// mp.compute(&ComputeOptions::new(Algorithm::Stomp).with_parallelism(2)).unwrap();
/// assert_eq!(mp.profile().len(), ts.len() - 4 + 1);
/// assert_eq!(mp.profile_index()[0], 4);
/// ```
#[derive(Debug, Clone)]
pub struct MatrixProfile {
    join: JoinContext,
    profile: Vec<f64>,
    profile_index: Vec<usize>,
}

impl MatrixProfile {
    /// Create a profile of `b` against `a`, or a self-join of `a` when `b` is `None`.
    ///
    /// Fails when either series is empty, `m < 2`, `m` exceeds half the
    /// reference length, or `a` is shorter than `m`.
    pub fn new(a: &[f64], b: Option<&[f64]>, m: usize) -> Result<Self> {
        let join = JoinContext::new(a.to_vec(), b.map(<[f64]>::to_vec), m)?;
        Ok(Self::from_join(join))
    }

    pub fn self_join(ts: &[f64], m: usize) -> Result<Self> {
        Self::new(ts, None, m)
    }

    pub fn ab_join(a: &[f64], b: &[f64], m: usize) -> Result<Self> {
        Self::new(a, Some(b), m)
    }

    fn from_join(join: JoinContext) -> Self {
        let len = join.profile_len();
        Self {
            join,
            profile: vec![f64::INFINITY; len],
            profile_index: vec![NO_MATCH; len],
        }
    }

    pub fn a(&self) -> &[f64] {
        self.join.a()
    }

    pub fn b(&self) -> &[f64] {
        self.join.b()
    }

    pub fn m(&self) -> usize {
        self.join.m()
    }

    pub fn is_self_join(&self) -> bool {
        self.join.is_self_join()
    }

    pub fn join(&self) -> &JoinContext {
        &self.join
    }

    pub fn profile(&self) -> &[f64] {
        &self.profile
    }

    pub fn profile_index(&self) -> &[usize] {
        &self.profile_index
    }

    /// Profile length, `N - M + 1`.
    pub fn len(&self) -> usize {
        self.profile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profile.is_empty()
    }

    /// Consume the context, keeping only the profile and index arrays.
    pub fn into_parts(self) -> (Vec<f64>, Vec<usize>) {
        (self.profile, self.profile_index)
    }

    /// Run one algorithm and fold its result into the profile.
    ///
    /// Entries only ever move to smaller distances. Validation errors leave
    /// the profile untouched. An error raised inside a batch is returned
    /// after every other batch has completed and been merged.
    pub fn compute(&mut self, options: &ComputeOptions) -> Result<()> {
        options.validate()?;
        debug!(
            algorithm = %options.algorithm,
            parallelism = options.parallelism,
            len_a = self.join.a().len(),
            len_b = self.join.b().len(),
            m = self.join.m(),
            "computing matrix profile"
        );

        let join = &self.join;
        let values = &mut self.profile;
        let indices = &mut self.profile_index;
        let result = match options.algorithm {
            Algorithm::Stmp => stmp::stmp(join, values, indices),
            Algorithm::Stamp => stamp::stamp(
                join,
                options.sample,
                options.parallelism,
                options.seed,
                values,
                indices,
            ),
            Algorithm::Stomp => stomp::stomp(join, options.parallelism, values, indices),
            Algorithm::Mpx => mpx::mpx(join, options.parallelism, values, indices),
        };

        debug!(algorithm = %options.algorithm, ok = result.is_ok(), "matrix profile computed");
        result
    }

    /// Append samples and extend the profile incrementally.
    ///
    /// Each sample recomputes the statistics caches and exactly one new
    /// distance-profile row. Samples are committed one at a time: on error the
    /// samples before the failing one remain applied.
    pub fn update(&mut self, samples: &[f64]) -> Result<()> {
        debug!(samples = samples.len(), len = self.profile.len(), "updating matrix profile");
        for &value in samples {
            stampi::append(
                &mut self.join,
                &mut self.profile,
                &mut self.profile_index,
                value,
            )?;
        }
        Ok(())
    }

    /// Distance profile of query window `idx` against every reference window.
    pub fn distance_profile(&self, idx: usize) -> Result<Vec<f64>> {
        let mut profile = vec![0.0; self.join.profile_len()];
        let mut xc = CrossCorrelator::new(self.join.b().len());
        mass::distance_profile(&self.join, idx, &mut profile, &mut xc)?;
        Ok(profile)
    }

    /// Serialize the series and the profile to JSON.
    ///
    /// Excluded or unmatched entries are written as `null`.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = Snapshot {
            a: self.join.a.clone(),
            b: self.join.b.clone(),
            m: self.join.m,
            profile: self
                .profile
                .iter()
                .map(|&d| d.is_finite().then_some(d))
                .collect(),
            profile_index: self
                .profile_index
                .iter()
                .map(|&i| (i != NO_MATCH).then_some(i))
                .collect(),
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Restore a profile written by [`MatrixProfile::to_json`], rebuilding all caches.
    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Snapshot = serde_json::from_str(json)?;
        let join = JoinContext::new(snapshot.a, snapshot.b, snapshot.m)?;
        let len = join.profile_len();
        if snapshot.profile.len() != len || snapshot.profile_index.len() != len {
            return Err(Error::SnapshotLength {
                expected: len,
                profile: snapshot.profile.len(),
                profile_index: snapshot.profile_index.len(),
            });
        }
        Ok(Self {
            join,
            profile: snapshot
                .profile
                .into_iter()
                .map(|d| d.unwrap_or(f64::INFINITY))
                .collect(),
            profile_index: snapshot
                .profile_index
                .into_iter()
                .map(|i| i.unwrap_or(NO_MATCH))
                .collect(),
        })
    }
}

#[derive(Serialize, Deserialize)]
struct Snapshot {
    a: Vec<f64>,
    b: Option<Vec<f64>>,
    m: usize,
    profile: Vec<Option<f64>>,
    profile_index: Vec<Option<usize>>,
}
