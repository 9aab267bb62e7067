//! Binet-Cauchy shape similarity and rigidity deviation.
//!
//! Two contracts live here and must not be mixed at a call site:
//! - [`covariance_determinant`] / [`normalized_score`] expect the first
//!   fragment to be centered already and only center the second one. The
//!   search engine centers its query once and then uses these per candidate.
//! - [`centered_covariance_determinant`] / [`bc_score`] center both
//!   fragments and are translation invariant in both arguments.
//!
//! The score is the determinant of the 3x3 cross-covariance matrix,
//! normalized by the self-determinants. It lies in `[-1, 1]`; mirror images
//! score close to `-1`.

use super::geometry::{centroid, determinant3x3, distance};
use glam::DVec3;
use tracing::warn;

/// Cross-covariance determinant, assuming `x` is already centered.
///
/// Builds `K[i][j] = sum_k (y[k][i] - cy[i]) * x[k][j]` where `cy` is the
/// centroid of `y`. `x` and `y` must have the same length.
pub fn covariance_determinant(x: &[DVec3], y: &[DVec3]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    let cy = centroid(y);
    let mut k = [[0.0f64; 3]; 3];
    for (xp, yp) in x.iter().zip(y) {
        let yc = *yp - cy;
        for i in 0..3 {
            for j in 0..3 {
                k[i][j] += yc[i] * xp[j];
            }
        }
    }
    determinant3x3(&k)
}

/// Cross-covariance determinant with both fragments centered internally.
pub fn centered_covariance_determinant(x: &[DVec3], y: &[DVec3]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    let cx = centroid(x);
    let cy = centroid(y);
    let mut k = [[0.0f64; 3]; 3];
    for (xp, yp) in x.iter().zip(y) {
        let xc = *xp - cx;
        let yc = *yp - cy;
        for i in 0..3 {
            for j in 0..3 {
                k[i][j] += yc[i] * xc[j];
            }
        }
    }
    determinant3x3(&k)
}

/// Normalized Binet-Cauchy score of `y` against a pre-centered `x`.
///
/// `sqrt_det_x` is `sqrt(covariance_determinant(x, x))`, computed once by
/// the caller. Returns `None` when `y` is degenerate (its self-determinant
/// is below `eps`, i.e. near-planar or near-collinear); a warning is logged.
pub fn normalized_score(x: &[DVec3], y: &[DVec3], sqrt_det_x: f64, eps: f64) -> Option<f64> {
    let det = covariance_determinant(x, y);
    let det_y = covariance_determinant(y, y);
    // Self-determinants are non-negative up to rounding; a slightly negative
    // value below eps must not reach the square root.
    if det_y.is_nan() || det_y < eps {
        warn!(len = y.len(), det = det_y, "null determinant for candidate fragment");
        return None;
    }
    Some(det / (sqrt_det_x * det_y.sqrt()))
}

/// Standalone normalized score between two arbitrary fragments.
///
/// Both fragments are centered before scoring, so the result does not
/// depend on where either fragment sits in space. Returns `None` if either
/// fragment is degenerate.
pub fn bc_score(x: &[DVec3], y: &[DVec3], eps: f64) -> Option<f64> {
    if x.len() != y.len() || x.is_empty() {
        return None;
    }
    let det_x = centered_covariance_determinant(x, x);
    let det_y = centered_covariance_determinant(y, y);
    if det_x.is_nan() || det_y.is_nan() || det_x < eps || det_y < eps {
        return None;
    }
    Some(centered_covariance_determinant(x, y) / (det_x.sqrt() * det_y.sqrt()))
}

/// Rigidity deviation between two fragments of equal length.
///
/// For every index the distances of `x[i]` and `y[i]` to their own centroids
/// are compared as a relative difference `|d1 - d2| / (d1 + d2)`. The
/// end-to-end spans are compared as an absolute difference. The maximum of
/// all of these is returned. Terms where both distances are zero contribute
/// nothing.
pub fn rigidity(x: &[DVec3], y: &[DVec3]) -> f64 {
    debug_assert_eq!(x.len(), y.len());
    let (Some(&x_first), Some(&x_last)) = (x.first(), x.last()) else {
        return 0.0;
    };
    let (y_first, y_last) = (y[0], y[y.len() - 1]);

    let cx = centroid(x);
    let cy = centroid(y);
    let mut dev = 0.0f64;
    for (xp, yp) in x.iter().zip(y) {
        let d1 = distance(cx, *xp);
        let d2 = distance(cy, *yp);
        // f64::max ignores the NaN produced by 0/0
        dev = dev.max(((d1 - d2) / (d1 + d2)).abs());
    }

    let span_x = distance(x_first, x_last);
    let span_y = distance(y_first, y_last);
    dev.max((span_x - span_y).abs())
}
