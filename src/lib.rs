#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod cloud;
pub mod error;
pub mod extractor;
pub mod params;
pub mod utils;

// Building blocks of the pipeline. Public for tools and advanced users,
// but considered unstable internals.
pub mod bitset;
pub mod cell;
pub mod histogram;
pub mod morph;
pub mod stats;

// --- High-level re-exports -------------------------------------------------

pub use crate::cloud::CloudView;
pub use crate::error::ExtractionError;
pub use crate::extractor::{PlaneExtractor, PlaneSummary, Segmentation};
pub use crate::params::ExtractorParams;

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use plane_extractor::prelude::*;
///
/// # fn main() -> Result<(), plane_extractor::ExtractionError> {
/// let (h, w) = (480usize, 640usize);
/// let points = vec![0.0f32; h * w * 3];
///
/// let mut extractor = PlaneExtractor::new(h, w, ExtractorParams::default())?;
/// let labels = extractor.process(&CloudView::new(h * w, 3, &points))?;
/// println!("labeled {} pixels", labels.iter().filter(|&&l| l > 0).count());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::cloud::CloudView;
    pub use crate::extractor::{PlaneExtractor, Segmentation};
    pub use crate::params::ExtractorParams;
}
