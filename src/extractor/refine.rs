//! Pixel-level boundary refinement of the merged planes.

use super::grower::PlaneSegment;
use super::pipeline::PlaneExtractor;
use crate::morph;

impl PlaneExtractor {
    /// For every merge root: erode its cell mask (interior keeps a block
    /// label), drop planes with no interior left, dilate the mask, and
    /// reassign the boundary-ring pixels by residual. Returns the segment
    /// indices that survived, in final-label order.
    pub(super) fn refine_planes(
        &mut self,
        segments: &[PlaneSegment],
        merge_labels: &[usize],
    ) -> Vec<usize> {
        let mut final_planes = Vec::new();
        for i in 0..segments.len() {
            if merge_labels[i] != i {
                continue;
            }
            for cell_id in 0..self.n_cells {
                let label = self.grid_seg_map[cell_id];
                self.mask[cell_id] = (label > 0 && merge_labels[(label - 1) as usize] == i) as u8;
            }

            morph::erode(
                &self.mask,
                self.w_cells,
                self.h_cells,
                &morph::CROSS_KERNEL,
                &mut self.mask_eroded,
            );
            if self.mask_eroded.iter().all(|&m| m == 0) {
                continue;
            }

            final_planes.push(i);
            let final_label = final_planes.len() as i32;
            for cell_id in 0..self.n_cells {
                if self.mask_eroded[cell_id] > 0 {
                    self.grid_seg_map_eroded[cell_id] = final_label;
                }
            }

            morph::dilate(
                &self.mask,
                self.w_cells,
                self.h_cells,
                &morph::SQUARE_KERNEL,
                &mut self.mask_dilated,
            );
            self.refine_cells(&segments[i], final_label);
        }
        final_planes
    }

    /// Walks the dilated-minus-eroded ring of one plane and claims every
    /// pixel whose squared residual passes the refinement gate and beats
    /// the best claim so far, so overlapping rings resolve to the closest
    /// plane.
    fn refine_cells(&mut self, segment: &PlaneSegment, final_label: i32) {
        let max_dist = self.params.refinement_multiplier_coeff * segment.stats.mse();
        for cell_id in 0..self.n_cells {
            if self.mask_dilated[cell_id] == 0 || self.mask_eroded[cell_id] > 0 {
                continue;
            }
            let offset = cell_id * self.pts_per_cell;
            for local in 0..self.pts_per_cell {
                let point = self.cell_major.point(offset + local).cast::<f64>();
                let residual = segment.stats.signed_distance(&point);
                let distance = residual * residual;
                if distance < max_dist && distance < self.distances_stacked[offset + local] {
                    self.distances_stacked[offset + local] = distance;
                    self.seg_map_stacked[offset + local] = final_label;
                }
            }
        }
    }
}
