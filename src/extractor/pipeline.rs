//! Extractor pipeline driving plane segmentation end-to-end.
//!
//! The [`PlaneExtractor`] exposes a simple API: feed an organized point
//! cloud and get back a pixel label image where connected coplanar
//! regions share a positive label. Internally it coordinates cell
//! fitting, histogram seeding, region growing, plane merging, and the
//! optional boundary refinement.
//!
//! Typical usage:
//! ```no_run
//! use plane_extractor::{CloudView, ExtractorParams, PlaneExtractor};
//!
//! # fn example(points: &[f32]) -> Result<(), plane_extractor::ExtractionError> {
//! let mut extractor = PlaneExtractor::new(480, 640, ExtractorParams::default())?;
//! let segmentation = extractor.process_with_planes(&CloudView::new(480 * 640, 3, points))?;
//! println!("found {} planes", segmentation.planes.len());
//! # Ok(())
//! # }
//! ```

use super::grower::PlaneSegment;
use crate::bitset::CellBitSet;
use crate::cell::CellSegment;
use crate::cloud::{CellMajorCloud, CloudView};
use crate::error::ExtractionError;
use crate::histogram::NormalHistogram;
use crate::params::ExtractorParams;
use log::debug;
use serde::Serialize;

/// Fitted model of one surviving plane.
#[derive(Clone, Debug, Serialize)]
pub struct PlaneSummary {
    /// Label the plane carries in the output image.
    pub label: i32,
    pub normal: [f64; 3],
    pub offset: f64,
    pub mse: f64,
    pub score: f64,
    pub cell_count: usize,
}

/// Result of one processed frame.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Segmentation {
    /// Row-major pixel labels; 0 means "no plane".
    pub labels: Vec<i32>,
    pub planes: Vec<PlaneSummary>,
}

/// Plane extractor owning all per-frame state for one image geometry.
///
/// A single instance processes one frame at a time; every buffer is
/// allocated at construction and reset after each call, error paths
/// included.
pub struct PlaneExtractor {
    pub(super) params: ExtractorParams,
    pub(super) image_height: usize,
    pub(super) image_width: usize,
    pub(super) h_cells: usize,
    pub(super) w_cells: usize,
    pub(super) n_cells: usize,
    pub(super) pts_per_cell: usize,
    pub(super) cell_major: CellMajorCloud,
    pub(super) cell_grid: Vec<Option<CellSegment>>,
    pub(super) grid_seg_map: Vec<i32>,
    pub(super) grid_seg_map_eroded: Vec<i32>,
    pub(super) seg_map_stacked: Vec<i32>,
    pub(super) distances_stacked: Vec<f64>,
    pub(super) mask: Vec<u8>,
    pub(super) mask_eroded: Vec<u8>,
    pub(super) mask_dilated: Vec<u8>,
}

impl PlaneExtractor {
    /// Creates an extractor for `image_height × image_width` frames.
    pub fn new(
        image_height: usize,
        image_width: usize,
        params: ExtractorParams,
    ) -> Result<Self, ExtractionError> {
        params.validate()?;
        if image_height == 0 || image_width == 0 {
            return Err(ExtractionError::InvalidConfig {
                message: "image dimensions must be positive".to_string(),
            });
        }
        let h_cells = image_height / params.patch_size;
        let w_cells = image_width / params.patch_size;
        let n_cells = h_cells * w_cells;
        let pts_per_cell = params.patch_size * params.patch_size;
        let n_pixels = image_height * image_width;
        Ok(Self {
            cell_major: CellMajorCloud::new(image_height, image_width, params.patch_size),
            params,
            image_height,
            image_width,
            h_cells,
            w_cells,
            n_cells,
            pts_per_cell,
            cell_grid: vec![None; n_cells],
            grid_seg_map: vec![0; n_cells],
            grid_seg_map_eroded: vec![0; n_cells],
            seg_map_stacked: vec![0; n_pixels],
            distances_stacked: vec![f64::INFINITY; n_pixels],
            mask: vec![0; n_cells],
            mask_eroded: vec![0; n_cells],
            mask_dilated: vec![0; n_cells],
        })
    }

    pub fn params(&self) -> &ExtractorParams {
        &self.params
    }

    pub fn image_height(&self) -> usize {
        self.image_height
    }

    pub fn image_width(&self) -> usize {
        self.image_width
    }

    /// Segments one frame and returns the pixel label image.
    pub fn process(&mut self, cloud: &CloudView) -> Result<Vec<i32>, ExtractionError> {
        Ok(self.process_with_planes(cloud)?.labels)
    }

    /// Segments one frame, returning labels plus the surviving plane models.
    pub fn process_with_planes(
        &mut self,
        cloud: &CloudView,
    ) -> Result<Segmentation, ExtractionError> {
        let expected_rows = self.image_height * self.image_width;
        if cloud.rows != expected_rows || cloud.cols != 3 || cloud.data.len() != cloud.rows * cloud.cols
        {
            return Err(ExtractionError::DimensionMismatch {
                expected_rows,
                found_rows: cloud.rows,
                found_cols: cloud.cols,
            });
        }
        let result = self.run_frame(cloud);
        self.reset_frame();
        result
    }

    fn run_frame(&mut self, cloud: &CloudView) -> Result<Segmentation, ExtractionError> {
        self.cell_major.restack(cloud);

        let planar_flags = self.find_planar_cells();
        debug!(
            "planar cells: {} / {}",
            planar_flags.count_ones(),
            self.n_cells
        );

        let mut hist = self.initialize_histogram(&planar_flags);
        let cell_dist_tols = self.compute_cell_dist_tols(&planar_flags);

        let mut segments = self.create_plane_segments(&mut hist, &planar_flags, &cell_dist_tols)?;
        debug!("plane segments grown: {}", segments.len());

        let merge_labels = self.merge_planes(&mut segments)?;
        let roots = merge_labels
            .iter()
            .enumerate()
            .filter(|&(i, &l)| l == i)
            .count();
        debug!("plane segments after merge: {roots}");

        if self.params.do_refinement {
            let final_planes = self.refine_planes(&segments, &merge_labels);
            debug!("planes after refinement: {}", final_planes.len());
            let labels = self.to_labels();
            let planes = final_planes
                .iter()
                .enumerate()
                .map(|(k, &i)| plane_summary(k as i32 + 1, &segments[i]))
                .collect();
            Ok(Segmentation { labels, planes })
        } else {
            let labels = self.coarse_to_labels(&merge_labels);
            let planes = merge_labels
                .iter()
                .enumerate()
                .filter(|&(i, &l)| l == i)
                .map(|(i, _)| plane_summary(i as i32 + 1, &segments[i]))
                .collect();
            Ok(Segmentation { labels, planes })
        }
    }

    /// Fits every cell of the grid and flags the planar ones.
    fn find_planar_cells(&mut self) -> CellBitSet {
        let mut planar_flags = CellBitSet::new(self.n_cells);
        for cell_id in 0..self.n_cells {
            let cell = CellSegment::new(self.cell_major.cell_points(cell_id), &self.params);
            if cell.is_planar() {
                planar_flags.set(cell_id);
            }
            self.cell_grid[cell_id] = Some(cell);
        }
        planar_flags
    }

    fn initialize_histogram(&self, planar_flags: &CellBitSet) -> NormalHistogram {
        let mut hist = NormalHistogram::new(self.params.histogram_bins_per_coord, self.n_cells);
        for cell_id in planar_flags.iter_ones() {
            if let Some(cell) = &self.cell_grid[cell_id] {
                hist.insert(cell_id, &cell.stats().normal());
            }
        }
        hist
    }

    fn reset_frame(&mut self) {
        for cell in &mut self.cell_grid {
            *cell = None;
        }
        self.grid_seg_map.fill(0);
        self.grid_seg_map_eroded.fill(0);
        self.seg_map_stacked.fill(0);
        self.distances_stacked.fill(f64::INFINITY);
        self.mask.fill(0);
        self.mask_eroded.fill(0);
        self.mask_dilated.fill(0);
    }
}

fn plane_summary(label: i32, segment: &PlaneSegment) -> PlaneSummary {
    let normal = segment.stats.normal();
    PlaneSummary {
        label,
        normal: [normal.x, normal.y, normal.z],
        offset: segment.stats.offset(),
        mse: segment.stats.mse(),
        score: segment.stats.score(),
        cell_count: segment.cell_count,
    }
}
