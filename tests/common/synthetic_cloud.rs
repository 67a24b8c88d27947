//! Synthetic organized clouds for end-to-end tests.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Flat plane at constant depth: pixel (r, c) maps to (c, r, z).
pub fn flat_cloud(height: usize, width: usize, z: f32) -> Vec<f32> {
    cloud_from_depth(height, width, |_, _| z)
}

/// Plane tilted along the x axis: z = base_z + slope_x · x.
pub fn tilted_cloud(height: usize, width: usize, base_z: f32, slope_x: f32) -> Vec<f32> {
    cloud_from_depth(height, width, |_, c| base_z + slope_x * c as f32)
}

/// Two parallel planes split down the middle column.
pub fn stepped_cloud(height: usize, width: usize, z_left: f32, z_right: f32) -> Vec<f32> {
    cloud_from_depth(height, width, |_, c| if c < width / 2 { z_left } else { z_right })
}

/// Uniform random depth in [z_min, z_max), reproducible from the seed.
pub fn noise_cloud(height: usize, width: usize, z_min: f32, z_max: f32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    cloud_from_depth(height, width, |_, _| rng.gen_range(z_min..z_max))
}

/// Builds the flat `(H·W, 3)` buffer from a per-pixel depth function.
pub fn cloud_from_depth(
    height: usize,
    width: usize,
    mut depth: impl FnMut(usize, usize) -> f32,
) -> Vec<f32> {
    let mut data = vec![0.0f32; height * width * 3];
    for r in 0..height {
        for c in 0..width {
            let i = (r * width + c) * 3;
            data[i] = c as f32;
            data[i + 1] = r as f32;
            data[i + 2] = depth(r, c);
        }
    }
    data
}

/// Overwrites the depth of one pixel in an already-built cloud.
pub fn set_depth(cloud: &mut [f32], width: usize, r: usize, c: usize, z: f32) {
    cloud[(r * width + c) * 3 + 2] = z;
}
