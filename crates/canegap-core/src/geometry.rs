//! Small 2D geometry primitives shared by segmentation and row detection.

use serde::{Deserialize, Serialize};

/// A real-valued point in image coordinates (`x` = column, `y` = row).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Dot product with a direction vector.
    pub fn dot(&self, dir: &Direction) -> f64 {
        self.x * dir.dx + self.y * dir.dy
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A unit direction vector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Direction {
    pub dx: f64,
    pub dy: f64,
}

impl Direction {
    /// Unit vector at `angle` radians from the x axis.
    pub fn from_angle(angle: f64) -> Self {
        Self {
            dx: angle.cos(),
            dy: angle.sin(),
        }
    }

    /// The x axis.
    pub fn horizontal() -> Self {
        Self { dx: 1.0, dy: 0.0 }
    }

    /// The direction rotated by +90 degrees.
    pub fn normal(&self) -> Direction {
        Direction {
            dx: -self.dy,
            dy: self.dx,
        }
    }

    /// Angle from the x axis in radians, in (-pi, pi].
    pub fn angle(&self) -> f64 {
        self.dy.atan2(self.dx)
    }
}

/// Inclusive pixel bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: usize,
    pub min_y: usize,
    pub max_x: usize,
    pub max_y: usize,
}

impl BoundingBox {
    /// A box covering a single pixel.
    pub fn at(x: usize, y: usize) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    pub fn include(&mut self, x: usize, y: usize) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn width(&self) -> usize {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> usize {
        self.max_y - self.min_y + 1
    }

    /// Extent of the box measured along `dir`: the width of its projection.
    pub fn extent_along(&self, dir: &Direction) -> f64 {
        self.width() as f64 * dir.dx.abs() + self.height() as f64 * dir.dy.abs()
    }
}

/// Median of a slice of finite values. Even counts average the two middle
/// values. Returns `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[10.0, 20.0, 10.0, 10.0]), Some(10.0));
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn extent_along_axes() {
        let mut b = BoundingBox::at(2, 3);
        b.include(6, 4);
        assert_eq!(b.extent_along(&Direction::horizontal()), 5.0);
        assert_eq!(b.extent_along(&Direction::horizontal().normal()), 2.0);
    }
}
