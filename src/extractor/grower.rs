//! Histogram-guided seeding and 4-connected region growing.

use super::pipeline::PlaneExtractor;
use crate::bitset::CellBitSet;
use crate::error::ExtractionError;
use crate::histogram::NormalHistogram;
use crate::stats::PlanarStats;

// TODO: expose as a config option
const MIN_MERGE_DIST: f64 = 20.0;

/// A grown region: accumulated stats over its member cells.
pub(super) struct PlaneSegment {
    pub stats: PlanarStats,
    pub cell_count: usize,
}

impl PlaneExtractor {
    /// Squared merge tolerance per planar cell, derived from the cell's
    /// spatial diameter and the configured merge angle.
    pub(super) fn compute_cell_dist_tols(&self, planar_flags: &CellBitSet) -> Vec<f64> {
        let mut tols = vec![0.0f64; self.n_cells];
        let cos_angle = self.params.min_cos_angle_for_merge;
        let sin_angle = (1.0 - cos_angle * cos_angle).max(0.0).sqrt();
        for cell_id in planar_flags.iter_ones() {
            let first = self.cell_major.point(cell_id * self.pts_per_cell);
            let last = self.cell_major.point((cell_id + 1) * self.pts_per_cell - 1);
            let diameter = f64::from((last - first).norm());
            let truncated = (diameter * sin_angle)
                .max(MIN_MERGE_DIST)
                .min(self.params.max_merge_dist);
            tols[cell_id] = truncated * truncated;
        }
        tols
    }

    /// Repeatedly seeds from the most populous histogram bin and grows
    /// regions until no bin holds enough candidates. Accepted regions are
    /// stamped into the cell label grid with 1-based ids.
    pub(super) fn create_plane_segments(
        &mut self,
        hist: &mut NormalHistogram,
        planar_flags: &CellBitSet,
        cell_dist_tols: &[f64],
    ) -> Result<Vec<PlaneSegment>, ExtractionError> {
        let mut segments: Vec<PlaneSegment> = Vec::new();
        let mut unassigned = planar_flags.clone();
        let mut remaining = planar_flags.count_ones();
        let mut activation = CellBitSet::new(self.n_cells);
        let mut stack: Vec<(usize, usize, usize)> = Vec::with_capacity(64);

        while remaining > 0 {
            let candidates = hist.most_frequent_bin_members();
            if candidates.len() < self.params.min_region_growing_candidate_size {
                break;
            }

            let mut seed_id = candidates[0];
            let mut min_mse = f64::INFINITY;
            for &candidate in &candidates {
                if let Some(cell) = &self.cell_grid[candidate] {
                    if cell.stats().mse() < min_mse {
                        min_mse = cell.stats().mse();
                        seed_id = candidate;
                    }
                }
            }

            activation.clear_all();
            self.grow_seed(seed_id, &unassigned, &mut activation, &mut stack, cell_dist_tols)?;

            let mut segment = PlaneSegment {
                stats: PlanarStats::default(),
                cell_count: 0,
            };
            for cell_id in activation.iter_ones() {
                if let Some(cell) = &self.cell_grid[cell_id] {
                    segment.stats.merge(cell.stats());
                }
                hist.remove(cell_id);
                remaining -= 1;
                segment.cell_count += 1;
            }
            unassigned.remove_all(&activation);

            if segment.cell_count < self.params.min_region_growing_cells_activated {
                continue;
            }

            segment.stats.calculate()?;
            if segment.stats.score() > self.params.min_region_planarity_score {
                segments.push(segment);
                let label = segments.len() as i32;
                for cell_id in activation.iter_ones() {
                    self.grid_seg_map[cell_id] = label;
                }
            }
        }

        Ok(segments)
    }

    /// Flood fill over the cell grid from `seed_id`, restricted to
    /// unassigned cells. Each expansion tests the candidate against its
    /// parent cell's plane, so the accepted model drifts with the region.
    /// The explicit stack visits neighbors in left, right, up, down order.
    fn grow_seed(
        &self,
        seed_id: usize,
        unassigned: &CellBitSet,
        activation: &mut CellBitSet,
        stack: &mut Vec<(usize, usize, usize)>,
        cell_dist_tols: &[f64],
    ) -> Result<(), ExtractionError> {
        stack.clear();
        stack.push((seed_id % self.w_cells, seed_id / self.w_cells, seed_id));

        while let Some((x, y, parent_id)) = stack.pop() {
            let index = y * self.w_cells + x;
            if index >= self.n_cells {
                return Err(ExtractionError::IndexOutOfRange {
                    index,
                    bound: self.n_cells,
                });
            }
            if !unassigned.get(index) || activation.get(index) {
                continue;
            }
            let (parent, cell) = match (&self.cell_grid[parent_id], &self.cell_grid[index]) {
                (Some(parent), Some(cell)) => (parent.stats(), cell.stats()),
                _ => continue,
            };

            let cos_angle = parent.normal().dot(&cell.normal());
            let distance = parent.signed_distance(&cell.mean());
            if cos_angle < self.params.min_cos_angle_for_merge
                || distance * distance > cell_dist_tols[index]
            {
                continue;
            }

            activation.set(index);
            // Pushed in reverse so the left neighbor is expanded first.
            if y + 1 < self.h_cells {
                stack.push((x, y + 1, index));
            }
            if y > 0 {
                stack.push((x, y - 1, index));
            }
            if x + 1 < self.w_cells {
                stack.push((x + 1, y, index));
            }
            if x > 0 {
                stack.push((x - 1, y, index));
            }
        }
        Ok(())
    }
}
