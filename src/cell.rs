//! Per-cell plane fitting and planarity classification.

use crate::params::ExtractorParams;
use crate::stats::PlanarStats;
use nalgebra::Vector3;

/// A P×P patch of the cloud with its fitted plane.
///
/// `is_planar` holds iff the cell has enough valid points, its middle row
/// and column are depth-continuous, and the fitted plane error stays under
/// the depth-noise model `(depth_sigma_coeff · mean_z² + depth_sigma_margin)²`.
#[derive(Clone, Debug)]
pub struct CellSegment {
    stats: PlanarStats,
    is_planar: bool,
}

impl CellSegment {
    /// Fits a cell from its `patch·patch` contiguous points (flat `xyz`).
    pub fn new(points: &[f32], params: &ExtractorParams) -> Self {
        let patch = params.patch_size;
        let pts_per_cell = patch * patch;
        debug_assert_eq!(points.len(), pts_per_cell * 3);

        let mut stats = PlanarStats::default();

        let valid = (0..pts_per_cell)
            .filter(|k| is_valid_depth(points[3 * k + 2]))
            .count();
        let min_valid = params.min_pts_per_cell.max(pts_per_cell / 2);
        if valid < min_valid {
            return Self {
                stats,
                is_planar: false,
            };
        }

        if !depth_continuous(points, patch, params) {
            return Self {
                stats,
                is_planar: false,
            };
        }

        for k in 0..pts_per_cell {
            let z = points[3 * k + 2];
            if is_valid_depth(z) {
                stats.add_point(Vector3::new(points[3 * k], points[3 * k + 1], z));
            }
        }
        if stats.calculate().is_err() {
            return Self {
                stats,
                is_planar: false,
            };
        }

        let sigma =
            params.depth_sigma_coeff * stats.mean().z * stats.mean().z + params.depth_sigma_margin;
        let is_planar = stats.mse() <= sigma * sigma;
        Self { stats, is_planar }
    }

    #[inline]
    pub fn is_planar(&self) -> bool {
        self.is_planar
    }

    #[inline]
    pub fn stats(&self) -> &PlanarStats {
        &self.stats
    }
}

#[inline]
fn is_valid_depth(z: f32) -> bool {
    z.is_finite() && z > 0.0
}

/// Walks the middle row and middle column counting absolute z-jumps above
/// the discontinuity threshold; either direction exceeding the allowance
/// rejects the cell.
fn depth_continuous(points: &[f32], patch: usize, params: &ExtractorParams) -> bool {
    let threshold = params.depth_discontinuity_threshold;
    let max_jumps = params.max_number_depth_discontinuity;
    let mid = patch / 2;

    let mut row_jumps = 0usize;
    for c in 1..patch {
        let prev = points[3 * (mid * patch + c - 1) + 2];
        let curr = points[3 * (mid * patch + c) + 2];
        if (curr - prev).abs() > threshold {
            row_jumps += 1;
        }
    }
    if row_jumps > max_jumps {
        return false;
    }

    let mut col_jumps = 0usize;
    for r in 1..patch {
        let prev = points[3 * ((r - 1) * patch + mid) + 2];
        let curr = points[3 * (r * patch + mid) + 2];
        if (curr - prev).abs() > threshold {
            col_jumps += 1;
        }
    }
    col_jumps <= max_jumps
}
