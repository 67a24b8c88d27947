//! I/O helpers around the extractor.

mod depth;

pub use depth::{DepthImage, Intrinsics};
