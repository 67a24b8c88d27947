//! Depth-map loading and unprojection.
//!
//! - `DepthImage::open`: read a 16-bit grayscale PNG/TIFF into an owned
//!   depth buffer (sensor units, typically millimetres).
//! - `DepthImage::to_point_cloud`: unproject through pinhole intrinsics
//!   into the flat `(H·W, 3)` layout `PlaneExtractor::process` consumes.

use std::path::Path;

/// Pinhole camera intrinsics in pixel units.
#[derive(Clone, Copy, Debug)]
pub struct Intrinsics {
    pub fx: f32,
    pub fy: f32,
    pub cx: f32,
    pub cy: f32,
}

/// Owned 16-bit depth buffer in row-major order.
#[derive(Clone, Debug)]
pub struct DepthImage {
    width: usize,
    height: usize,
    depth: Vec<u16>,
}

impl DepthImage {
    /// Load a depth map from disk, converting to 16-bit grayscale.
    pub fn open(path: &Path) -> Result<Self, String> {
        let img = image::open(path)
            .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
            .into_luma16();
        let width = img.width() as usize;
        let height = img.height() as usize;
        Ok(Self {
            width,
            height,
            depth: img.into_raw(),
        })
    }

    /// Wrap an existing depth buffer; `depth` must hold `width * height`
    /// samples.
    pub fn from_raw(width: usize, height: usize, depth: Vec<u16>) -> Result<Self, String> {
        if depth.len() != width * height {
            return Err(format!(
                "depth buffer holds {} samples, expected {}",
                depth.len(),
                width * height
            ));
        }
        Ok(Self {
            width,
            height,
            depth,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Unprojects every pixel; zero depth stays a zero point, which the
    /// extractor treats as invalid.
    pub fn to_point_cloud(&self, intrinsics: &Intrinsics) -> Vec<f32> {
        let mut cloud = vec![0.0f32; self.width * self.height * 3];
        for r in 0..self.height {
            for c in 0..self.width {
                let z = f32::from(self.depth[r * self.width + c]);
                let i = (r * self.width + c) * 3;
                cloud[i] = (c as f32 - intrinsics.cx) * z / intrinsics.fx;
                cloud[i + 1] = (r as f32 - intrinsics.cy) * z / intrinsics.fy;
                cloud[i + 2] = z;
            }
        }
        cloud
    }
}
