//! Expansion of cell-level labels into the pixel label image.

use super::pipeline::PlaneExtractor;

impl PlaneExtractor {
    /// Refined output: eroded plane interiors are stamped as whole-cell
    /// blocks; everything else falls back to the per-pixel refined map.
    /// Margin pixels outside the covered region stay 0.
    pub(super) fn to_labels(&self) -> Vec<i32> {
        let mut out = vec![0i32; self.image_height * self.image_width];
        let patch = self.params.patch_size;
        for cell_r in 0..self.h_cells {
            let r_offset = cell_r * patch;
            for cell_c in 0..self.w_cells {
                let c_offset = cell_c * patch;
                let cell_id = cell_r * self.w_cells + cell_c;
                let block_label = self.grid_seg_map_eroded[cell_id];
                if block_label > 0 {
                    for r in r_offset..r_offset + patch {
                        let row_start = r * self.image_width + c_offset;
                        out[row_start..row_start + patch].fill(block_label);
                    }
                } else {
                    let mut stacked_idx = cell_id * self.pts_per_cell;
                    for r in r_offset..r_offset + patch {
                        for c in c_offset..c_offset + patch {
                            let label = self.seg_map_stacked[stacked_idx];
                            if label > 0 {
                                out[r * self.image_width + c] = label;
                            }
                            stacked_idx += 1;
                        }
                    }
                }
            }
        }
        out
    }

    /// Coarse output used when refinement is disabled: whole-cell labels
    /// with merged segments substituted by their root's id.
    pub(super) fn coarse_to_labels(&self, merge_labels: &[usize]) -> Vec<i32> {
        let mut remap = vec![0i32; merge_labels.len() + 1];
        for (i, &root) in merge_labels.iter().enumerate() {
            remap[i + 1] = root as i32 + 1;
        }

        let mut out = vec![0i32; self.image_height * self.image_width];
        let patch = self.params.patch_size;
        for cell_r in 0..self.h_cells {
            for cell_c in 0..self.w_cells {
                let cell_id = cell_r * self.w_cells + cell_c;
                let label = remap[self.grid_seg_map[cell_id] as usize];
                if label == 0 {
                    continue;
                }
                for r in cell_r * patch..(cell_r + 1) * patch {
                    let row_start = r * self.image_width + cell_c * patch;
                    out[row_start..row_start + patch].fill(label);
                }
            }
        }
        out
    }
}
