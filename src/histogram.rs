//! Spherical histogram over planar-cell normals used to pick grow seeds.
//!
//! Normals are quantized on (polar, azimuth): `θ = acos(−n̂_z)` over
//! `[0, π]` and `φ = atan2(n̂_x/‖proj‖, n̂_y/‖proj‖)` over `[−π, π]`, with
//! `B` bins per coordinate. Cells whose normal points almost straight at
//! the camera land in polar bin 0; their azimuth is forced to 0 as the
//! projection is numerically meaningless near the pole.

use nalgebra::Vector3;
use std::f64::consts::PI;

pub struct NormalHistogram {
    bins_per_coord: usize,
    hist: Vec<u32>,
    bins: Vec<i32>,
}

impl NormalHistogram {
    pub fn new(bins_per_coord: usize, n_cells: usize) -> Self {
        Self {
            bins_per_coord,
            hist: vec![0; bins_per_coord * bins_per_coord],
            bins: vec![-1; n_cells],
        }
    }

    pub fn insert(&mut self, cell_id: usize, normal: &Vector3<f64>) {
        let quant = (self.bins_per_coord - 1) as f64;
        let polar = (-normal.z).clamp(-1.0, 1.0).acos();
        let polar_q = (quant * polar / PI) as usize;
        let azimuth_q = if polar_q == 0 {
            0
        } else {
            let proj = (normal.x * normal.x + normal.y * normal.y).sqrt();
            let azimuth = (normal.x / proj).atan2(normal.y / proj);
            (quant * (azimuth + PI) / (2.0 * PI)) as usize
        };
        let bin = azimuth_q * self.bins_per_coord + polar_q;
        self.bins[cell_id] = bin as i32;
        self.hist[bin] += 1;
    }

    /// Cells populating the currently most frequent bin, ascending by id;
    /// empty once every cell has been removed. Ties pick the lowest bin.
    pub fn most_frequent_bin_members(&self) -> Vec<usize> {
        let mut best_bin = 0usize;
        let mut best_count = 0u32;
        for (bin, &count) in self.hist.iter().enumerate() {
            if count > best_count {
                best_count = count;
                best_bin = bin;
            }
        }
        if best_count == 0 {
            return Vec::new();
        }
        self.bins
            .iter()
            .enumerate()
            .filter(|&(_, &bin)| bin == best_bin as i32)
            .map(|(cell_id, _)| cell_id)
            .collect()
    }

    pub fn remove(&mut self, cell_id: usize) {
        let bin = self.bins[cell_id];
        if bin >= 0 {
            self.hist[bin as usize] -= 1;
            self.bins[cell_id] = -1;
        }
    }

    #[cfg(test)]
    fn bin_of(&self, cell_id: usize) -> i32 {
        self.bins[cell_id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downward_normal_lands_in_pole_bin() {
        let mut hist = NormalHistogram::new(20, 4);
        hist.insert(0, &Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(hist.bin_of(0), 0);
    }

    #[test]
    fn tilted_normals_share_a_bin() {
        let mut hist = NormalHistogram::new(20, 4);
        let n = Vector3::new(0.447, 0.0, -0.894).normalize();
        hist.insert(0, &n);
        hist.insert(1, &n);
        hist.insert(2, &Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(hist.bin_of(0), hist.bin_of(1));
        assert_ne!(hist.bin_of(0), hist.bin_of(2));
        assert_eq!(hist.most_frequent_bin_members(), vec![0, 1]);
    }

    #[test]
    fn ties_prefer_the_lowest_bin() {
        let mut hist = NormalHistogram::new(20, 4);
        let tilted = Vector3::new(0.447, 0.0, -0.894).normalize();
        hist.insert(0, &Vector3::new(0.0, 0.0, -1.0));
        hist.insert(1, &Vector3::new(0.0, 0.0, -1.0));
        hist.insert(2, &tilted);
        hist.insert(3, &tilted);
        // Pole bin 0 and the tilted bin both hold two cells.
        assert_eq!(hist.most_frequent_bin_members(), vec![0, 1]);
    }

    #[test]
    fn removal_empties_the_histogram() {
        let mut hist = NormalHistogram::new(20, 2);
        hist.insert(0, &Vector3::new(0.0, 0.0, -1.0));
        hist.insert(1, &Vector3::new(0.0, 0.0, -1.0));
        hist.remove(0);
        assert_eq!(hist.most_frequent_bin_members(), vec![1]);
        hist.remove(1);
        assert!(hist.most_frequent_bin_members().is_empty());
    }
}
