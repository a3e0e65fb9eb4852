use ndarray::{Array2, Axis};

/// Morphological opening (erosion followed by dilation) with a square kernel
/// of side `2 * radius + 1`.
///
/// Removes specks of foreground narrower than the kernel (weeds, sensor noise)
/// while preserving larger plant clumps. `radius == 0` returns the mask as is.
pub fn morphological_opening(mask: &Array2<bool>, radius: usize) -> Array2<bool> {
    if radius == 0 {
        return mask.clone();
    }
    let eroded = erode(mask, radius);
    dilate(&eroded, radius)
}

/// Binary erosion: a pixel stays true only if every pixel of its square
/// neighbourhood is true. The window is clipped to the image, so plants cut
/// by the border are not eaten from that side.
fn erode(mask: &Array2<bool>, radius: usize) -> Array2<bool> {
    let rows = sweep(mask, radius, Axis(1), true);
    sweep(&rows, radius, Axis(0), true)
}

/// Binary dilation: a pixel becomes true if any pixel of its square
/// neighbourhood is true.
fn dilate(mask: &Array2<bool>, radius: usize) -> Array2<bool> {
    let rows = sweep(mask, radius, Axis(1), false);
    sweep(&rows, radius, Axis(0), false)
}

/// One-dimensional min (`all == true`) or max filter along `axis`.
fn sweep(mask: &Array2<bool>, radius: usize, axis: Axis, all: bool) -> Array2<bool> {
    let mut result = Array2::from_elem(mask.dim(), false);

    for (src, mut dst) in mask.lanes(axis).into_iter().zip(result.lanes_mut(axis)) {
        let n = src.len();
        for i in 0..n {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(n - 1);
            let mut window = (lo..=hi).map(|j| src[j]);
            dst[i] = if all { window.all(|v| v) } else { window.any(|v| v) };
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_removes_isolated_pixel_keeps_block() {
        let mut mask = Array2::from_elem((9, 9), false);
        mask[[1, 1]] = true;
        for row in 4..8 {
            for col in 4..8 {
                mask[[row, col]] = true;
            }
        }
        let opened = morphological_opening(&mask, 1);
        assert!(!opened[[1, 1]]);
        for row in 4..8 {
            for col in 4..8 {
                assert!(opened[[row, col]], "lost ({row},{col})");
            }
        }
        assert_eq!(opened.iter().filter(|&&v| v).count(), 16);
    }

    #[test]
    fn opening_keeps_blocks_touching_the_border() {
        let mut mask = Array2::from_elem((6, 10), false);
        // 2x2 in the corner, 3x2 on the right edge.
        for (row, col) in [(0, 0), (0, 1), (1, 0), (1, 1)] {
            mask[[row, col]] = true;
        }
        for row in 2..5 {
            for col in 8..10 {
                mask[[row, col]] = true;
            }
        }
        let opened = morphological_opening(&mask, 1);
        assert_eq!(opened, mask);
    }

    #[test]
    fn opening_still_removes_thin_border_lines() {
        let mut mask = Array2::from_elem((5, 5), false);
        for col in 0..5 {
            mask[[0, col]] = true;
        }
        mask[[4, 4]] = true;
        let opened = morphological_opening(&mask, 1);
        assert!(opened.iter().all(|&v| !v));
    }

    #[test]
    fn zero_radius_is_identity() {
        let mut mask = Array2::from_elem((3, 3), false);
        mask[[0, 2]] = true;
        assert_eq!(morphological_opening(&mask, 0), mask);
    }
}
