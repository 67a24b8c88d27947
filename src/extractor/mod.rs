//! Plane extractor orchestrating the per-frame pipeline end-to-end.
//!
//! Overview
//! - Re-stacks the organized cloud into cell-major order and fits every
//!   P×P cell, classifying it planar or not.
//! - Bins planar-cell normals in a spherical histogram and repeatedly
//!   grows regions from the most populous bin, lowest-fit-error seed
//!   first, over 4-connected compatible cells.
//! - Greedily merges adjacent grown segments whose plane models agree in
//!   angle and point-to-plane distance.
//! - Optionally refines plane boundaries at pixel level: each surviving
//!   plane's cell mask is eroded (interior, stamped as a block) and
//!   dilated (boundary ring, reassigned pixel by pixel to the plane with
//!   the smallest residual under the refinement gate).
//! - Writes the final label image; margin pixels not covered by a whole
//!   cell stay 0.
//!
//! Modules
//! - `pipeline` – the [`PlaneExtractor`] itself plus frame state handling.
//! - `grower` – histogram-guided seeding and region growing.
//! - `merger` – plane-adjacency graph and greedy union.
//! - `refine` – mask morphology and per-pixel boundary reassignment.
//! - `labels` – expansion of cell-level labels to the pixel label image.
//!
//! Key ideas
//! - All per-frame buffers are owned by the extractor, allocated once at
//!   construction, and reset after every call, so repeated `process`
//!   calls on the same input produce identical output.
//! - Region growing propagates the parent cell with each expansion, so
//!   the accepted plane model drifts while a region grows; traversal
//!   order is part of the output contract and is kept fixed.

mod grower;
mod labels;
mod merger;
mod pipeline;
mod refine;

pub use pipeline::{PlaneExtractor, PlaneSummary, Segmentation};
