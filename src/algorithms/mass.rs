use realfft::num_complex::Complex;

use crate::algorithms::common::{apply_exclusion_zone, CrossCorrelator};
use crate::core::matrix_profile::JoinContext;
use crate::core::stats::z_normalize;
use crate::error::{Error, Result};

/// Mueen's algorithm for similarity search.
///
/// Z-normalizes `query`, cross-correlates it with the reference whose
/// spectrum and rolling standard deviations are given, and writes the
/// Euclidean distance to every reference window into `profile`:
/// `d_i = sqrt(|2m - 2 * dot_i / std_i|)`.
pub fn mass(
    query: &[f64],
    reference_std: &[f64],
    reference_spectrum: &[Complex<f64>],
    xc: &mut CrossCorrelator,
    profile: &mut [f64],
) -> Result<()> {
    let m = query.len() as f64;
    let qnorm = z_normalize(query)?;
    let dot = xc.correlate(&qnorm, reference_spectrum)?;
    if dot.len() != profile.len() || reference_std.len() != profile.len() {
        return Err(Error::LengthMismatch {
            profile: profile.len(),
            dot: dot.len(),
        });
    }

    for ((d, &qt), &sigma) in profile.iter_mut().zip(&dot).zip(reference_std) {
        *d = (2.0 * (m - qt / sigma)).abs().sqrt();
    }
    Ok(())
}

/// Distance profile of query window `idx` against all of `B`, via [`mass`].
///
/// Self-joins get an exclusion zone of `m / 2` around `idx`.
pub fn distance_profile(
    join: &JoinContext,
    idx: usize,
    profile: &mut [f64],
    xc: &mut CrossCorrelator,
) -> Result<()> {
    check_query_index(join, idx)?;
    let m = join.m();
    mass(
        &join.a()[idx..idx + m],
        &join.b_stats().std,
        join.b_spectrum(),
        xc,
        profile,
    )?;
    if let Some(zone) = join.exclusion_zone() {
        apply_exclusion_zone(profile, idx, zone);
    }
    Ok(())
}

/// Convert raw dot products of query window `idx` with every reference
/// window into distances using the cached rolling means and deviations:
///
/// `d_j = sqrt(2m * |1 - (dot_j - m * mu_b[j] * mu_a[idx]) / (m * sigma_b[j] * sigma_a[idx])|)`
pub fn distance_profile_from_dot(
    join: &JoinContext,
    dot: &[f64],
    idx: usize,
    profile: &mut [f64],
) -> Result<()> {
    check_query_index(join, idx)?;
    if profile.len() != dot.len() {
        return Err(Error::LengthMismatch {
            profile: profile.len(),
            dot: dot.len(),
        });
    }

    let m_f = join.m() as f64;
    let b_stats = join.b_stats();
    let mu_a = join.a_stats().mean[idx];
    let sigma_a = join.a_stats().std[idx];
    for (j, (d, &qt)) in profile.iter_mut().zip(dot).enumerate() {
        let r = (qt - m_f * b_stats.mean[j] * mu_a) / (m_f * b_stats.std[j] * sigma_a);
        *d = (2.0 * m_f * (1.0 - r).abs()).sqrt();
    }

    if let Some(zone) = join.exclusion_zone() {
        apply_exclusion_zone(profile, idx, zone);
    }
    Ok(())
}

fn check_query_index(join: &JoinContext, idx: usize) -> Result<()> {
    if idx >= join.query_windows() {
        return Err(Error::IndexOutOfRange {
            idx,
            len: join.a().len(),
            m: join.m(),
        });
    }
    Ok(())
}
