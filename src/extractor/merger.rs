//! Greedy merging of adjacent plane segments.
//!
//! Adjacency is read off the cell label grid (right and down neighbors),
//! then symmetrized. The union pass walks rows of the adjacency matrix in
//! ascending order and merges compatible columns into the row's current
//! root, so the outcome is order-dependent by construction: earlier
//! planes absorb later ones.

use super::grower::PlaneSegment;
use super::pipeline::PlaneExtractor;
use crate::bitset::CellBitSet;
use crate::error::ExtractionError;

impl PlaneExtractor {
    /// Unions compatible adjacent segments in place and returns the merge
    /// labels: `labels[i] == i` marks a surviving root, anything else
    /// points at the root that absorbed segment `i`.
    pub(super) fn merge_planes(
        &mut self,
        segments: &mut Vec<PlaneSegment>,
    ) -> Result<Vec<usize>, ExtractionError> {
        let nr_planes = segments.len();
        let mut assoc = self.plane_adjacency(nr_planes);
        let mut merge_labels: Vec<usize> = (0..nr_planes).collect();

        for row_id in 0..nr_planes {
            let plane_id = merge_labels[row_id];
            let mut expanded = false;
            let mut next = assoc[row_id].next_one_after(row_id);
            while let Some(col_id) = next {
                let root_normal = segments[plane_id].stats.normal();
                let other_normal = segments[col_id].stats.normal();
                let other_mean = segments[col_id].stats.mean();
                let cos_angle = root_normal.dot(&other_normal);
                let distance = segments[plane_id].stats.signed_distance(&other_mean);

                if cos_angle > self.params.min_cos_angle_for_merge
                    && distance * distance < self.params.max_merge_dist
                {
                    let (head, tail) = segments.split_at_mut(col_id);
                    head[plane_id].stats.merge(&tail[0].stats);
                    head[plane_id].cell_count += tail[0].cell_count;
                    merge_labels[col_id] = plane_id;
                    expanded = true;
                } else {
                    assoc[row_id].clear(col_id);
                }
                next = assoc[row_id].next_one_after(col_id);
            }
            if expanded {
                segments[plane_id].stats.calculate()?;
            }
        }

        Ok(merge_labels)
    }

    /// Symmetric boolean adjacency between segment labels in the cell grid.
    fn plane_adjacency(&self, nr_planes: usize) -> Vec<CellBitSet> {
        let mut assoc: Vec<CellBitSet> = (0..nr_planes)
            .map(|_| CellBitSet::new(nr_planes))
            .collect();
        for row in 0..self.h_cells {
            for col in 0..self.w_cells {
                let label = self.grid_seg_map[row * self.w_cells + col];
                if label <= 0 {
                    continue;
                }
                if col + 1 < self.w_cells {
                    let right = self.grid_seg_map[row * self.w_cells + col + 1];
                    if right > 0 && right != label {
                        assoc[(label - 1) as usize].set((right - 1) as usize);
                    }
                }
                if row + 1 < self.h_cells {
                    let down = self.grid_seg_map[(row + 1) * self.w_cells + col];
                    if down > 0 && down != label {
                        assoc[(label - 1) as usize].set((down - 1) as usize);
                    }
                }
            }
        }
        for i in 0..nr_planes {
            for j in (i + 1)..nr_planes {
                if assoc[i].get(j) {
                    assoc[j].set(i);
                } else if assoc[j].get(i) {
                    assoc[i].set(j);
                }
            }
        }
        assoc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ExtractorParams;
    use crate::stats::PlanarStats;
    use nalgebra::Vector3;

    fn half_plane_segment(x_range: std::ops::Range<usize>, z: impl Fn(f64) -> f64) -> PlaneSegment {
        let mut stats = PlanarStats::default();
        for y in 0..24 {
            for x in x_range.clone() {
                stats.add_point(Vector3::new(x as f32, y as f32, z(x as f64) as f32));
            }
        }
        stats.calculate().expect("segment stats");
        PlaneSegment {
            stats,
            cell_count: 8,
        }
    }

    fn extractor_with_two_halves() -> PlaneExtractor {
        let mut extractor =
            PlaneExtractor::new(48, 48, ExtractorParams::default()).expect("extractor");
        for row in 0..4 {
            for col in 0..4 {
                extractor.grid_seg_map[row * 4 + col] = if col < 2 { 1 } else { 2 };
            }
        }
        extractor
    }

    #[test]
    fn coplanar_neighbors_are_merged() {
        let mut extractor = extractor_with_two_halves();
        let mut segments = vec![
            half_plane_segment(0..24, |_| 1000.0),
            half_plane_segment(24..48, |_| 1000.0),
        ];
        let labels = extractor.merge_planes(&mut segments).expect("merge");
        assert_eq!(labels, vec![0, 0]);
        assert_eq!(segments[0].cell_count, 16);
        assert_eq!(segments[0].stats.n(), 48 * 24);
    }

    #[test]
    fn distant_parallel_planes_stay_apart() {
        let mut extractor = extractor_with_two_halves();
        let mut segments = vec![
            half_plane_segment(0..24, |_| 1000.0),
            half_plane_segment(24..48, |_| 1500.0),
        ];
        let labels = extractor.merge_planes(&mut segments).expect("merge");
        assert_eq!(labels, vec![0, 1]);
        assert_eq!(segments[0].cell_count, 8);
    }

    #[test]
    fn steep_angle_blocks_the_merge() {
        let mut extractor = extractor_with_two_halves();
        // Roof ridge: ±0.45 slope, cosine between the normals ≈ 0.67.
        let mut segments = vec![
            half_plane_segment(0..24, |x| 1000.0 + 0.45 * x),
            half_plane_segment(24..48, |x| 1000.0 + 0.45 * (48.0 - x)),
        ];
        let labels = extractor.merge_planes(&mut segments).expect("merge");
        assert_eq!(labels, vec![0, 1]);
    }
}
