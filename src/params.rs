//! Parameter types configuring the extraction stages.
//!
//! Defaults match the reference configuration for structured-light depth
//! sensors at millimetre depth units. For tuning, start with `patch_size`
//! and the region-growing gates.

use crate::error::ExtractionError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Extractor-wide parameters controlling the multi-stage pipeline.
///
/// Serialized names use the camel-case option keys accepted by
/// [`ExtractorParams::from_key_values`].
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractorParams {
    /// Cell side in pixels; margins not covered by a whole cell stay label 0.
    pub patch_size: usize,
    /// Histogram bins per spherical coordinate (polar and azimuth).
    pub histogram_bins_per_coord: usize,
    /// Cosine threshold applied during region growing and plane merging.
    pub min_cos_angle_for_merge: f64,
    /// Squared point-to-plane distance gate for merging; also caps the
    /// per-cell growth tolerance.
    pub max_merge_dist: f64,
    /// Minimum population of the seed bin to start a region.
    pub min_region_growing_candidate_size: usize,
    /// Minimum activated cells required to keep a grown region.
    pub min_region_growing_cells_activated: usize,
    /// Minimum planarity score for a region to be emitted as a plane.
    pub min_region_planarity_score: f64,
    /// Enables pixel-level boundary refinement.
    pub do_refinement: bool,
    /// Multiplier on the plane MSE gating pixel reassignment.
    pub refinement_multiplier_coeff: f64,
    /// Coefficient on squared mean depth in the cell fit-error threshold.
    pub depth_sigma_coeff: f64,
    /// Additive margin in the cell fit-error threshold.
    pub depth_sigma_margin: f64,
    /// Minimum valid (finite, positive depth) points per cell.
    pub min_pts_per_cell: usize,
    /// Absolute depth jump flagged as a discontinuity.
    pub depth_discontinuity_threshold: f32,
    /// Allowed discontinuities along the middle row/column of a cell.
    pub max_number_depth_discontinuity: usize,
}

impl Default for ExtractorParams {
    fn default() -> Self {
        Self {
            patch_size: 12,
            histogram_bins_per_coord: 20,
            min_cos_angle_for_merge: 0.93,
            max_merge_dist: 500.0,
            min_region_growing_candidate_size: 5,
            min_region_growing_cells_activated: 4,
            min_region_planarity_score: 50.0,
            do_refinement: true,
            refinement_multiplier_coeff: 15.0,
            depth_sigma_coeff: 1.425e-6,
            depth_sigma_margin: 10.0,
            min_pts_per_cell: 3,
            depth_discontinuity_threshold: 160.0,
            max_number_depth_discontinuity: 1,
        }
    }
}

impl ExtractorParams {
    /// Builds parameters from a string-keyed option map, starting from the
    /// defaults. Unknown keys and malformed values are rejected.
    pub fn from_key_values(options: &HashMap<String, String>) -> Result<Self, ExtractionError> {
        let mut params = Self::default();
        for (key, value) in options {
            match key.as_str() {
                "patchSize" => params.patch_size = parse_int(key, value)?,
                "histogramBinsPerCoord" => params.histogram_bins_per_coord = parse_int(key, value)?,
                "minCosAngleForMerge" => params.min_cos_angle_for_merge = parse_float(key, value)?,
                "maxMergeDist" => params.max_merge_dist = parse_float(key, value)?,
                "minRegionGrowingCandidateSize" => {
                    params.min_region_growing_candidate_size = parse_int(key, value)?
                }
                "minRegionGrowingCellsActivated" => {
                    params.min_region_growing_cells_activated = parse_int(key, value)?
                }
                "minRegionPlanarityScore" => {
                    params.min_region_planarity_score = parse_float(key, value)?
                }
                "doRefinement" => params.do_refinement = parse_bool(key, value)?,
                "refinementMultiplierCoeff" => {
                    params.refinement_multiplier_coeff = parse_float(key, value)?
                }
                "depthSigmaCoeff" => params.depth_sigma_coeff = parse_float(key, value)?,
                "depthSigmaMargin" => params.depth_sigma_margin = parse_float(key, value)?,
                "minPtsPerCell" => params.min_pts_per_cell = parse_int(key, value)?,
                "depthDiscontinuityThreshold" => {
                    params.depth_discontinuity_threshold = parse_float(key, value)? as f32
                }
                "maxNumberDepthDiscontinuity" => {
                    params.max_number_depth_discontinuity = parse_int(key, value)?
                }
                _ => {
                    return Err(ExtractionError::InvalidConfig {
                        message: format!("unknown option '{key}'"),
                    })
                }
            }
        }
        params.validate()?;
        Ok(params)
    }

    /// Checks value ranges; called by the extractor constructor.
    pub fn validate(&self) -> Result<(), ExtractionError> {
        if self.patch_size == 0 {
            return Err(invalid("patchSize must be positive"));
        }
        if self.histogram_bins_per_coord <= 1 {
            return Err(invalid("histogramBinsPerCoord must be greater than 1"));
        }
        let finite_checks = [
            ("minCosAngleForMerge", self.min_cos_angle_for_merge),
            ("maxMergeDist", self.max_merge_dist),
            ("minRegionPlanarityScore", self.min_region_planarity_score),
            ("refinementMultiplierCoeff", self.refinement_multiplier_coeff),
            ("depthSigmaCoeff", self.depth_sigma_coeff),
            ("depthSigmaMargin", self.depth_sigma_margin),
        ];
        for (name, value) in finite_checks {
            if !value.is_finite() {
                return Err(invalid(format!("{name} must be finite")));
            }
        }
        if !self.depth_discontinuity_threshold.is_finite() {
            return Err(invalid("depthDiscontinuityThreshold must be finite"));
        }
        // A cosine above 1 would make every cell incompatible with itself
        // and region growing could never consume its seeds.
        if !(-1.0..=1.0).contains(&self.min_cos_angle_for_merge) {
            return Err(invalid("minCosAngleForMerge must be within [-1, 1]"));
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> ExtractionError {
    ExtractionError::InvalidConfig {
        message: message.into(),
    }
}

fn parse_int(key: &str, value: &str) -> Result<usize, ExtractionError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| invalid(format!("option '{key}' expects a non-negative integer, got '{value}'")))
}

fn parse_float(key: &str, value: &str) -> Result<f64, ExtractionError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid(format!("option '{key}' expects a number, got '{value}'")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ExtractionError> {
    match value.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(format!(
            "option '{key}' expects a boolean, got '{value}'"
        ))),
    }
}
