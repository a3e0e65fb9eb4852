//! Dominant row orientation from nearest-neighbour centroid vectors.
//!
//! Plants within a row sit closer together than plants in adjacent rows, so
//! the vector from each centroid to its nearest neighbour mostly points
//! along the row. The peak of the angular histogram of those vectors gives
//! the row direction.

use std::f64::consts::PI;

use rayon::prelude::*;

use crate::consts::{DIRECTION_HISTOGRAM_BINS, PARALLEL_COMPONENT_THRESHOLD};
use crate::geometry::{Direction, Point};

/// Estimate the dominant row direction of a set of centroids.
///
/// Fewer than two distinct points carry no orientation; the x axis is
/// returned in that case.
pub fn dominant_direction(points: &[Point]) -> Direction {
    let angles = nearest_neighbour_angles(points);
    if angles.is_empty() {
        return Direction::horizontal();
    }

    let bins = DIRECTION_HISTOGRAM_BINS;
    let mut histogram = vec![0usize; bins];
    for &a in &angles {
        histogram[angle_bin(a, bins)] += 1;
    }

    let peak = histogram
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.cmp(b.1).then(b.0.cmp(&a.0)))
        .map(|(i, _)| i)
        .unwrap_or(0);

    // Refine with the doubled-angle mean over the peak and its neighbours,
    // which handles the wrap between 0 and pi.
    let window = [(peak + bins - 1) % bins, peak, (peak + 1) % bins];
    let (mut sum_cos, mut sum_sin) = (0.0, 0.0);
    for &a in &angles {
        if window.contains(&angle_bin(a, bins)) {
            sum_cos += (2.0 * a).cos();
            sum_sin += (2.0 * a).sin();
        }
    }
    Direction::from_angle(sum_sin.atan2(sum_cos) / 2.0)
}

/// Angle in [0, pi) of the vector from each point to its nearest neighbour.
///
/// Coincident points are skipped. Ties go to the lowest index.
fn nearest_neighbour_angles(points: &[Point]) -> Vec<f64> {
    if points.len() < 2 {
        return Vec::new();
    }

    let grid = PointGrid::new(points);
    let angle = |i: usize| -> Option<f64> {
        let (p, q) = (points[i], points[grid.nearest(i)?]);
        Some(fold_angle((q.y - p.y).atan2(q.x - p.x)))
    };

    if points.len() >= PARALLEL_COMPONENT_THRESHOLD {
        (0..points.len()).into_par_iter().filter_map(angle).collect()
    } else {
        (0..points.len()).filter_map(angle).collect()
    }
}

/// Uniform bucket grid over the points' bounding box, about one point per
/// cell.
struct PointGrid<'a> {
    points: &'a [Point],
    origin: Point,
    cell: f64,
    cols: usize,
    rows: usize,
    buckets: Vec<Vec<usize>>,
}

impl<'a> PointGrid<'a> {
    fn new(points: &'a [Point]) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let (width, height) = ((max_x - min_x).max(0.0), (max_y - min_y).max(0.0));
        let n = points.len() as f64;

        // The second term bounds the cell count for near-collinear sets.
        let cell = (width * height / n)
            .sqrt()
            .max(width.max(height) / n)
            .max(1.0);
        let cols = (width / cell) as usize + 1;
        let rows = (height / cell) as usize + 1;

        let mut grid = Self {
            points,
            origin: Point::new(min_x, min_y),
            cell,
            cols,
            rows,
            buckets: vec![Vec::new(); cols * rows],
        };
        for (i, p) in points.iter().enumerate() {
            let (cx, cy) = grid.cell_of(p);
            grid.buckets[cy * cols + cx].push(i);
        }
        grid
    }

    fn cell_of(&self, p: &Point) -> (usize, usize) {
        let cx = ((p.x - self.origin.x) / self.cell) as usize;
        let cy = ((p.y - self.origin.y) / self.cell) as usize;
        (cx.min(self.cols - 1), cy.min(self.rows - 1))
    }

    /// Index of the closest distinct point to `points[i]`.
    ///
    /// Rings of cells are visited outwards. Every point beyond ring `r` is at
    /// least `r * cell` away, so the search ends once the best distance is
    /// below that.
    fn nearest(&self, i: usize) -> Option<usize> {
        let p = self.points[i];
        let (cx, cy) = self.cell_of(&p);
        let (cx, cy) = (cx as isize, cy as isize);
        let mut best: Option<(f64, usize)> = None;

        for r in 0..=self.cols.max(self.rows) as isize {
            if let Some((d, _)) = best {
                if d < r as f64 * self.cell {
                    break;
                }
            }
            for gy in (cy - r).max(0)..=(cy + r).min(self.rows as isize - 1) {
                let edge_row = gy == cy - r || gy == cy + r;
                let step = if edge_row || r == 0 { 1 } else { (2 * r) as usize };
                for gx in (cx - r..=cx + r).step_by(step) {
                    if gx < 0 || gx >= self.cols as isize {
                        continue;
                    }
                    for &j in &self.buckets[gy as usize * self.cols + gx as usize] {
                        let d = p.distance(&self.points[j]);
                        if j == i || d <= 0.0 {
                            continue;
                        }
                        let closer = match best {
                            Some((bd, bj)) => d < bd || (d == bd && j < bj),
                            None => true,
                        };
                        if closer {
                            best = Some((d, j));
                        }
                    }
                }
            }
        }
        best.map(|(_, j)| j)
    }
}

fn fold_angle(a: f64) -> f64 {
    let folded = a.rem_euclid(PI);
    if folded >= PI {
        0.0
    } else {
        folded
    }
}

fn angle_bin(a: f64, bins: usize) -> usize {
    ((a / PI * bins as f64) as usize).min(bins - 1)
}
