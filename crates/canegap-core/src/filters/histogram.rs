use crate::consts::EPSILON;
use crate::frame::{ColorFrame, Frame};

/// Linear histogram stretch: maps [black_point, white_point] → [0.0, 1.0].
pub fn histogram_stretch(frame: &Frame, black_point: f32, white_point: f32) -> Frame {
    let range = white_point - black_point;
    let range = if range.abs() < EPSILON { 1.0 } else { range };

    let data = frame.data.mapv(|v| ((v - black_point) / range).clamp(0.0, 1.0));
    Frame::new(data, frame.original_bit_depth)
}

/// Black and white points at the given percentiles of the frame's values.
///
/// Returns `None` for an empty frame.
pub fn percentile_points(frame: &Frame, low_percentile: f32, high_percentile: f32) -> Option<(f32, f32)> {
    let mut sorted: Vec<f32> = frame.data.iter().copied().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_unstable_by(f32::total_cmp);

    let n = sorted.len();
    let lo_idx = ((n as f32 * low_percentile) as usize).min(n - 1);
    let hi_idx = ((n as f32 * high_percentile) as usize).min(n - 1);
    Some((sorted[lo_idx], sorted[hi_idx]))
}

/// Automatic histogram stretch using percentile-based black/white points.
///
/// `low_percentile` and `high_percentile` are in [0.0, 1.0].
/// A flat channel (no spread between the points) is returned unchanged so
/// that a uniform image does not gain artificial contrast.
pub fn auto_stretch(frame: &Frame, low_percentile: f32, high_percentile: f32) -> Frame {
    match percentile_points(frame, low_percentile, high_percentile) {
        Some((black, white)) if white - black > EPSILON => histogram_stretch(frame, black, white),
        _ => frame.clone(),
    }
}

/// Stretch each channel of a color frame independently.
pub fn auto_stretch_color(color: &ColorFrame, low_percentile: f32, high_percentile: f32) -> ColorFrame {
    ColorFrame {
        red: auto_stretch(&color.red, low_percentile, high_percentile),
        green: auto_stretch(&color.green, low_percentile, high_percentile),
        blue: auto_stretch(&color.blue, low_percentile, high_percentile),
    }
}
