//! Binary morphology on the cell grid.
//!
//! Kernels are offset lists around the anchor. Out-of-grid neighbors count
//! as set for erosion and unset for dilation, so a mask touching the image
//! border is not eroded from outside.

/// 3×3 cross: anchor plus its 4-neighborhood.
pub const CROSS_KERNEL: [(i32, i32); 5] = [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)];

/// Full 3×3 square.
pub const SQUARE_KERNEL: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

pub fn erode(src: &[u8], width: usize, height: usize, kernel: &[(i32, i32)], dst: &mut [u8]) {
    for y in 0..height {
        for x in 0..width {
            let mut keep = 1u8;
            for &(dx, dy) in kernel {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                    continue;
                }
                if src[ny as usize * width + nx as usize] == 0 {
                    keep = 0;
                    break;
                }
            }
            dst[y * width + x] = keep;
        }
    }
}

pub fn dilate(src: &[u8], width: usize, height: usize, kernel: &[(i32, i32)], dst: &mut [u8]) {
    for y in 0..height {
        for x in 0..width {
            let mut hit = 0u8;
            for &(dx, dy) in kernel {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                    continue;
                }
                if src[ny as usize * width + nx as usize] != 0 {
                    hit = 1;
                    break;
                }
            }
            dst[y * width + x] = hit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_cell_erodes_away() {
        let mut src = vec![0u8; 16];
        src[5] = 1;
        let mut dst = vec![0u8; 16];
        erode(&src, 4, 4, &CROSS_KERNEL, &mut dst);
        assert!(dst.iter().all(|&v| v == 0));
    }

    #[test]
    fn full_mask_survives_erosion_at_borders() {
        let src = vec![1u8; 16];
        let mut dst = vec![0u8; 16];
        erode(&src, 4, 4, &CROSS_KERNEL, &mut dst);
        assert!(dst.iter().all(|&v| v == 1));
    }

    #[test]
    fn lone_cell_dilates_to_a_square() {
        let mut src = vec![0u8; 16];
        src[5] = 1; // (1, 1)
        let mut dst = vec![0u8; 16];
        dilate(&src, 4, 4, &SQUARE_KERNEL, &mut dst);
        let expected: Vec<u8> = vec![
            1, 1, 1, 0, //
            1, 1, 1, 0, //
            1, 1, 1, 0, //
            0, 0, 0, 0,
        ];
        assert_eq!(dst, expected);
    }

    #[test]
    fn erosion_is_contained_in_dilation() {
        let src: Vec<u8> = vec![
            0, 1, 1, 0, //
            1, 1, 1, 0, //
            0, 1, 0, 0, //
            0, 0, 0, 0,
        ];
        let mut eroded = vec![0u8; 16];
        let mut dilated = vec![0u8; 16];
        erode(&src, 4, 4, &CROSS_KERNEL, &mut eroded);
        dilate(&src, 4, 4, &SQUARE_KERNEL, &mut dilated);
        for i in 0..16 {
            assert!(eroded[i] <= src[i]);
            assert!(src[i] <= dilated[i]);
        }
    }
}
