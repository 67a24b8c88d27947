//! Point-cloud views and the cell-major working layout.
//!
//! The extractor consumes a borrowed `(H·W, 3)` array in row-major pixel
//! order and re-stacks it so that the `P·P` points of every cell are
//! contiguous, which keeps per-cell fitting and refinement cache friendly.

use nalgebra::Vector3;

/// Borrowed organized point cloud: one `(x, y, z)` row per pixel.
#[derive(Clone, Debug)]
pub struct CloudView<'a> {
    /// Number of points (pixels), row-major.
    pub rows: usize,
    /// Components per point; the extractor requires 3.
    pub cols: usize,
    /// Backing storage, `rows * cols` values.
    pub data: &'a [f32],
}

impl<'a> CloudView<'a> {
    pub fn new(rows: usize, cols: usize, data: &'a [f32]) -> Self {
        Self { rows, cols, data }
    }

    #[inline]
    pub fn point(&self, idx: usize) -> Vector3<f32> {
        let base = idx * self.cols;
        Vector3::new(self.data[base], self.data[base + 1], self.data[base + 2])
    }
}

/// Owned buffer holding the cloud re-stacked in cell-major order: cell
/// `(cr, cc)` occupies `pts_per_cell` consecutive points starting at
/// `(cr * w_cells + cc) * pts_per_cell`.
#[derive(Clone, Debug)]
pub struct CellMajorCloud {
    patch: usize,
    h_cells: usize,
    w_cells: usize,
    image_width: usize,
    data: Vec<f32>,
}

impl CellMajorCloud {
    pub fn new(image_height: usize, image_width: usize, patch: usize) -> Self {
        let h_cells = image_height / patch;
        let w_cells = image_width / patch;
        let len = h_cells * w_cells * patch * patch * 3;
        Self {
            patch,
            h_cells,
            w_cells,
            image_width,
            data: vec![0.0; len],
        }
    }

    /// Copies the covered region of `cloud` into cell-major order. Margin
    /// pixels beyond the last whole cell are dropped.
    pub fn restack(&mut self, cloud: &CloudView) {
        let pts_per_cell = self.patch * self.patch;
        for r in 0..self.h_cells * self.patch {
            let cell_r = r / self.patch;
            let local_r = r % self.patch;
            for c in 0..self.w_cells * self.patch {
                let cell_c = c / self.patch;
                let local_c = c % self.patch;
                let dst = ((cell_r * self.w_cells + cell_c) * pts_per_cell
                    + local_r * self.patch
                    + local_c)
                    * 3;
                let src = (r * self.image_width + c) * 3;
                self.data[dst..dst + 3].copy_from_slice(&cloud.data[src..src + 3]);
            }
        }
    }

    /// The `patch * patch` points of one cell as a flat `xyz` slice.
    #[inline]
    pub fn cell_points(&self, cell_id: usize) -> &[f32] {
        let pts_per_cell = self.patch * self.patch;
        let base = cell_id * pts_per_cell * 3;
        &self.data[base..base + pts_per_cell * 3]
    }

    /// Point at a global cell-major index.
    #[inline]
    pub fn point(&self, idx: usize) -> Vector3<f32> {
        let base = idx * 3;
        Vector3::new(self.data[base], self.data[base + 1], self.data[base + 2])
    }

    #[inline]
    pub fn pts_per_cell(&self) -> usize {
        self.patch * self.patch
    }

    #[inline]
    pub fn n_cells(&self) -> usize {
        self.h_cells * self.w_cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lattice_cloud(height: usize, width: usize) -> Vec<f32> {
        let mut data = vec![0.0f32; height * width * 3];
        for r in 0..height {
            for c in 0..width {
                let i = (r * width + c) * 3;
                data[i] = c as f32;
                data[i + 1] = r as f32;
                data[i + 2] = 1000.0;
            }
        }
        data
    }

    #[test]
    fn restack_places_pixels_cell_major() {
        let (h, w, patch) = (24usize, 24usize, 12usize);
        let data = lattice_cloud(h, w);
        let mut stacked = CellMajorCloud::new(h, w, patch);
        stacked.restack(&CloudView::new(h * w, 3, &data));

        // Pixel (13, 2) belongs to cell (1, 0) = cell id 2, local (1, 2).
        let idx = 2 * 144 + 12 + 2;
        let p = stacked.point(idx);
        assert_eq!(p.x, 2.0);
        assert_eq!(p.y, 13.0);
        assert_eq!(p.z, 1000.0);
    }

    #[test]
    fn margins_are_dropped() {
        let (h, w, patch) = (25usize, 25usize, 12usize);
        let data = lattice_cloud(h, w);
        let mut stacked = CellMajorCloud::new(h, w, patch);
        stacked.restack(&CloudView::new(h * w, 3, &data));

        assert_eq!(stacked.n_cells(), 4);
        assert_eq!(stacked.cell_points(3).len(), 144 * 3);
        // Last point of the last cell is pixel (23, 23).
        let p = stacked.point(4 * 144 - 1);
        assert_eq!(p.x, 23.0);
        assert_eq!(p.y, 23.0);
    }
}
