//! Incremental plane-fit accumulator.
//!
//! `PlanarStats` keeps the first and second moments of a point set so that
//! cells and grown regions can be fitted and merged without revisiting the
//! points. The fitted model is derived on demand by `calculate`:
//!
//! - covariance is the scatter matrix `Σ p pᵀ − n m mᵀ`;
//! - the plane normal is the eigenvector of the smallest eigenvalue,
//!   oriented towards the camera at the origin (`n̂·m < 0`);
//! - `mse` is the smallest eigenvalue over the point count;
//! - `score` is the middle-to-smallest eigenvalue ratio, a dimensionless
//!   planarity quality that grows without bound for exact planes.

use crate::error::ExtractionError;
use nalgebra::{Matrix3, SymmetricEigen, Vector3};

#[derive(Clone, Debug, Default)]
pub struct PlanarStats {
    sum_x: f64,
    sum_y: f64,
    sum_z: f64,
    sum_xx: f64,
    sum_yy: f64,
    sum_zz: f64,
    sum_xy: f64,
    sum_xz: f64,
    sum_yz: f64,
    n: usize,
    mean: Vector3<f64>,
    normal: Vector3<f64>,
    d: f64,
    mse: f64,
    score: f64,
}

impl PlanarStats {
    pub fn add_point(&mut self, p: Vector3<f32>) {
        let (x, y, z) = (f64::from(p.x), f64::from(p.y), f64::from(p.z));
        self.sum_x += x;
        self.sum_y += y;
        self.sum_z += z;
        self.sum_xx += x * x;
        self.sum_yy += y * y;
        self.sum_zz += z * z;
        self.sum_xy += x * y;
        self.sum_xz += x * z;
        self.sum_yz += y * z;
        self.n += 1;
    }

    /// Element-wise accumulation; derived quantities stay stale until the
    /// next `calculate`.
    pub fn merge(&mut self, other: &PlanarStats) {
        self.sum_x += other.sum_x;
        self.sum_y += other.sum_y;
        self.sum_z += other.sum_z;
        self.sum_xx += other.sum_xx;
        self.sum_yy += other.sum_yy;
        self.sum_zz += other.sum_zz;
        self.sum_xy += other.sum_xy;
        self.sum_xz += other.sum_xz;
        self.sum_yz += other.sum_yz;
        self.n += other.n;
    }

    /// Recomputes mean, normal, offset, MSE, and score from the sums.
    pub fn calculate(&mut self) -> Result<(), ExtractionError> {
        if self.n < 3 {
            return Err(ExtractionError::InsufficientPoints { found: self.n });
        }
        let n = self.n as f64;
        let mean = Vector3::new(self.sum_x / n, self.sum_y / n, self.sum_z / n);

        let cov_xx = self.sum_xx - self.sum_x * mean.x;
        let cov_yy = self.sum_yy - self.sum_y * mean.y;
        let cov_zz = self.sum_zz - self.sum_z * mean.z;
        let cov_xy = self.sum_xy - self.sum_x * mean.y;
        let cov_xz = self.sum_xz - self.sum_x * mean.z;
        let cov_yz = self.sum_yz - self.sum_y * mean.z;
        let cov = Matrix3::new(
            cov_xx, cov_xy, cov_xz, cov_xy, cov_yy, cov_yz, cov_xz, cov_yz, cov_zz,
        );

        let eig = SymmetricEigen::new(cov);
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| eig.eigenvalues[a].total_cmp(&eig.eigenvalues[b]));

        // Tiny negative eigenvalues from round-off read as an exact plane.
        let lambda_min = eig.eigenvalues[order[0]].max(0.0);
        let lambda_mid = eig.eigenvalues[order[1]];

        let mut normal = eig.eigenvectors.column(order[0]).clone_owned();
        if normal.dot(&mean) > 0.0 {
            normal = -normal;
        }

        self.mean = mean;
        self.normal = normal;
        self.d = -normal.dot(&mean);
        self.mse = lambda_min / n;
        self.score = if lambda_min > 0.0 {
            lambda_mid / lambda_min
        } else {
            f64::INFINITY
        };
        Ok(())
    }

    /// Signed point-to-plane distance `n̂·q + d`.
    #[inline]
    pub fn signed_distance(&self, q: &Vector3<f64>) -> f64 {
        self.normal.dot(q) + self.d
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub fn mean(&self) -> Vector3<f64> {
        self.mean
    }

    #[inline]
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    #[inline]
    pub fn offset(&self) -> f64 {
        self.d
    }

    #[inline]
    pub fn mse(&self) -> f64 {
        self.mse
    }

    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_stats(z: impl Fn(f64, f64) -> f64) -> PlanarStats {
        let mut stats = PlanarStats::default();
        for r in 0..12 {
            for c in 0..12 {
                let (x, y) = (c as f64, r as f64);
                stats.add_point(Vector3::new(x as f32, y as f32, z(x, y) as f32));
            }
        }
        stats.calculate().expect("enough points");
        stats
    }

    #[test]
    fn flat_plane_faces_camera() {
        let stats = grid_stats(|_, _| 1000.0);
        let n = stats.normal();
        assert!((n.x.abs()) < 1e-9 && (n.y.abs()) < 1e-9);
        assert!(n.z < 0.0, "normal must face the origin, got {n:?}");
        assert!((stats.offset() - 1000.0).abs() < 1e-6);
        assert!(stats.mse() < 1e-9);
        assert!(stats.score().is_infinite());
    }

    #[test]
    fn tilted_plane_normal_and_offset_are_consistent() {
        let stats = grid_stats(|x, _| 1000.0 + 0.5 * x);
        let n = stats.normal();
        let expected = Vector3::new(0.5, 0.0, -1.0).normalize();
        assert!(
            (n.dot(&expected).abs() - 1.0).abs() < 1e-6,
            "normal {n:?} not aligned with {expected:?}"
        );
        // The fitted plane passes through the centroid.
        assert!(stats.signed_distance(&stats.mean()).abs() < 1e-9);
    }

    #[test]
    fn signed_distance_is_signed() {
        let stats = grid_stats(|_, _| 1000.0);
        let above = stats.signed_distance(&Vector3::new(0.0, 0.0, 1010.0));
        assert!((above + 10.0).abs() < 1e-6, "got {above}");
    }

    #[test]
    fn merge_matches_joint_accumulation() {
        let mut left = PlanarStats::default();
        let mut right = PlanarStats::default();
        let mut joint = PlanarStats::default();
        for r in 0..12 {
            for c in 0..12 {
                let p = Vector3::new(c as f32, r as f32, 1000.0 + 0.25 * c as f32);
                joint.add_point(p);
                if c < 6 {
                    left.add_point(p);
                } else {
                    right.add_point(p);
                }
            }
        }
        left.merge(&right);
        left.calculate().expect("merged stats");
        joint.calculate().expect("joint stats");

        assert_eq!(left.n(), joint.n());
        assert!((left.mean() - joint.mean()).norm() < 1e-6);
        assert!((left.normal() - joint.normal()).norm() < 1e-6);
        assert!((left.mse() - joint.mse()).abs() < 1e-6);
    }

    #[test]
    fn too_few_points_is_an_error() {
        let mut stats = PlanarStats::default();
        stats.add_point(Vector3::new(0.0, 0.0, 1.0));
        stats.add_point(Vector3::new(1.0, 0.0, 1.0));
        let err = stats.calculate().unwrap_err();
        assert_eq!(err, ExtractionError::InsufficientPoints { found: 2 });
    }
}
