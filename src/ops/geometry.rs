//! Geometry kernel: centroids, 3x3 determinants and point distances.
//!
//! These are the leaf operations used by the similarity scorer and the
//! search engine. All of them work on double-precision points.

use glam::DVec3;

/// Compute centroid of a point set.
///
/// The mean of an empty set is undefined; callers must guard against it.
/// An empty slice yields a NaN vector rather than panicking.
pub fn centroid(points: &[DVec3]) -> DVec3 {
    let sum: DVec3 = points.iter().copied().sum();
    sum / points.len() as f64
}

/// Translate `points` so that their centroid sits at the origin.
/// Returns the centroid that was subtracted.
pub fn center_in_place(points: &mut [DVec3]) -> DVec3 {
    let c = centroid(points);
    for p in points.iter_mut() {
        *p -= c;
    }
    c
}

/// Closed-form cofactor expansion of a 3x3 determinant.
///
/// `k` is indexed as `k[row][col]`. The expansion runs down the first
/// column.
#[inline]
pub fn determinant3x3(k: &[[f64; 3]; 3]) -> f64 {
    k[0][0] * (k[1][1] * k[2][2] - k[2][1] * k[1][2])
        + k[1][0] * (k[2][1] * k[0][2] - k[0][1] * k[2][2])
        + k[2][0] * (k[0][1] * k[1][2] - k[1][1] * k[0][2])
}

/// Euclidean distance between two points (not squared).
#[inline]
pub fn distance(p: DVec3, q: DVec3) -> f64 {
    (p - q).length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DMat3;

    #[test]
    fn test_centroid() {
        let points = vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(0.0, 2.0, 0.0),
        ];
        let c = centroid(&points);
        assert!((c.x - 2.0 / 3.0).abs() < 1e-12);
        assert!((c.y - 2.0 / 3.0).abs() < 1e-12);
        assert!(c.z.abs() < 1e-12);
    }

    #[test]
    fn test_centroid_empty_is_nan() {
        assert!(centroid(&[]).is_nan());
    }

    #[test]
    fn test_center_in_place() {
        let mut points = vec![DVec3::new(1.0, 1.0, 1.0), DVec3::new(3.0, 5.0, -1.0)];
        let c = center_in_place(&mut points);
        assert_eq!(c, DVec3::new(2.0, 3.0, 0.0));
        assert!(centroid(&points).length() < 1e-12);
    }

    #[test]
    fn test_determinant_matches_glam() {
        let k = [[2.0, -1.0, 0.5], [0.3, 4.0, 1.0], [-2.0, 0.7, 3.0]];
        // DMat3::from_cols_array_2d takes columns, so transpose the rows.
        let m = DMat3::from_cols_array_2d(&k).transpose();
        assert!((determinant3x3(&k) - m.determinant()).abs() < 1e-12);
    }

    #[test]
    fn test_determinant_identity_and_singular() {
        let id = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        assert_eq!(determinant3x3(&id), 1.0);
        let singular = [[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 1.0, 5.0]];
        assert_eq!(determinant3x3(&singular), 0.0);
    }

    #[test]
    fn test_distance() {
        let d = distance(DVec3::new(1.0, 2.0, 3.0), DVec3::new(4.0, 6.0, 3.0));
        assert!((d - 5.0).abs() < 1e-12);
    }
}
