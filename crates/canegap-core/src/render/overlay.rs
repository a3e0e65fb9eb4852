use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_cross_mut, draw_line_segment_mut};

use crate::frame::ColorFrame;
use crate::geometry::Point;
use crate::io::image_io::{from_rgb8, to_rgb8};
use crate::rows::{GapInterval, RowLine};

use super::config::OverlayConfig;

/// Draw row lines and gap intervals onto a copy of `image`.
///
/// Rows are drawn first in the row colour; gaps are drawn over them in the
/// gap colour so a failure stands out along its row. The input is left
/// untouched.
pub fn render_overlay(
    image: &ColorFrame,
    lines: &[RowLine],
    gaps: &[GapInterval],
    config: &OverlayConfig,
) -> ColorFrame {
    let mut canvas = to_rgb8(image);
    let row_color = Rgb(config.row_color);
    let gap_color = Rgb(config.gap_color);

    for line in lines {
        for (a, b) in line.segments() {
            draw_stroke(&mut canvas, a, b, config.stroke_width, row_color);
        }
    }

    for gap in gaps {
        draw_stroke(&mut canvas, gap.start, gap.end, config.stroke_width, gap_color);
    }

    if config.draw_markers {
        let marker = Rgb(config.marker_color);
        for p in lines.iter().flat_map(|l| l.points.iter()) {
            draw_cross_mut(&mut canvas, marker, p.x.round() as i32, p.y.round() as i32);
        }
    }

    from_rgb8(&canvas)
}

/// A segment of the given width, built from parallel one-pixel lines offset
/// along the segment normal.
fn draw_stroke(canvas: &mut RgbImage, a: Point, b: Point, width: u32, color: Rgb<u8>) {
    let len = a.distance(&b);
    let (nx, ny) = if len > 0.0 {
        (-(b.y - a.y) / len, (b.x - a.x) / len)
    } else {
        (0.0, 1.0)
    };

    let half = (width as f64 - 1.0) / 2.0;
    for i in 0..width {
        let off = i as f64 - half;
        let (ox, oy) = (nx * off, ny * off);
        draw_line_segment_mut(
            canvas,
            ((a.x + ox) as f32, (a.y + oy) as f32),
            ((b.x + ox) as f32, (b.y + oy) as f32),
            color,
        );
    }
}
