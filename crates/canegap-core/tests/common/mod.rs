#![allow(dead_code)]

use std::sync::Mutex;

use ndarray::Array2;

use canegap_core::frame::{ColorFrame, Frame};
use canegap_core::pipeline::{PipelineStage, ProgressReporter};

/// A black image of the given size.
pub fn black_frame(width: usize, height: usize) -> ColorFrame {
    ColorFrame::from_gray(&Frame::new(Array2::zeros((height, width)), 8))
}

/// Paint a `size` x `size` pure-green square with its top-left corner at
/// `(x, y)`, clipped to the image.
pub fn paint_plant(frame: &mut ColorFrame, x: usize, y: usize, size: usize) {
    let (h, w) = (frame.height(), frame.width());
    for row in y..(y + size).min(h) {
        for col in x..(x + size).min(w) {
            frame.red.data[[row, col]] = 0.0;
            frame.green.data[[row, col]] = 1.0;
            frame.blue.data[[row, col]] = 0.0;
        }
    }
}

/// Green squares on black soil.
pub fn plants_frame(width: usize, height: usize, plants: &[(usize, usize)], size: usize) -> ColorFrame {
    let mut frame = black_frame(width, height);
    for &(x, y) in plants {
        paint_plant(&mut frame, x, y, size);
    }
    frame
}

/// The 100x10 reference scene: one row with plants at x = 0, 10, 20, 40, 50
/// (the plant at 30 is missing).
pub fn single_row_scene() -> ColorFrame {
    let plants: Vec<(usize, usize)> = [0, 10, 20, 40, 50].iter().map(|&x| (x, 4)).collect();
    plants_frame(100, 10, &plants, 2)
}

/// The same scene as a binary grayscale image: white 2x2 plants on black.
pub fn binary_row_scene() -> ColorFrame {
    let mut mask = Array2::from_elem((10, 100), false);
    for x in [0, 10, 20, 40, 50] {
        for row in 4..6 {
            for col in x..x + 2 {
                mask[[row, col]] = true;
            }
        }
    }
    frame_from_mask(&mask)
}

/// Horizontal rows of plants. `rows` lists, per row, its y coordinate and
/// the x coordinates of the plants present.
pub fn field_scene(width: usize, height: usize, rows: &[(usize, Vec<usize>)], size: usize) -> ColorFrame {
    let plants: Vec<(usize, usize)> = rows
        .iter()
        .flat_map(|(y, xs)| xs.iter().map(move |&x| (x, *y)))
        .collect();
    plants_frame(width, height, &plants, size)
}

/// Deterministic pseudo-random binary pattern (LCG), for partition checks.
pub fn noise_mask(width: usize, height: usize, seed: u64, density: f64) -> Array2<bool> {
    let mut state = seed;
    Array2::from_shape_fn((height, width), |_| {
        state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        ((state >> 33) as f64 / (1u64 << 31) as f64) < density
    })
}

/// Grayscale image whose white pixels are exactly `mask`.
pub fn frame_from_mask(mask: &Array2<bool>) -> ColorFrame {
    ColorFrame::from_gray(&Frame::new(mask.mapv(|m| if m { 1.0 } else { 0.0 }), 8))
}

/// Records every reporter call.
#[derive(Default)]
pub struct RecordingReporter {
    pub stages: Mutex<Vec<(PipelineStage, Option<usize>)>>,
    pub advances: Mutex<usize>,
    pub cancel: bool,
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.stages.lock().unwrap().push((stage, total_items));
    }

    fn advance(&self, _items_done: usize) {
        *self.advances.lock().unwrap() += 1;
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
    }
}
