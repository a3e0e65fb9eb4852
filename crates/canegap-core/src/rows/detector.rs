use tracing::{debug, info};

use crate::consts::MIN_ROW_TOLERANCE_PX;
use crate::error::{CanegapError, Result};
use crate::geometry::{median, Direction, Point};
use crate::segmentation::{Component, ComponentMap};

use super::config::RowConfig;
use super::direction::dominant_direction;

/// One plantation row: the centroids of its components, ordered along the
/// row direction.
#[derive(Clone, Debug, PartialEq)]
pub struct RowLine {
    /// Position of the row in the layout, ordered across the rows.
    pub index: usize,
    /// Component ids in polyline order.
    pub component_ids: Vec<u32>,
    /// Polyline vertices (component centroids). Monotonic along the row
    /// direction.
    pub points: Vec<Point>,
    /// Mean position of the row's centroids across the row direction.
    pub offset: f64,
}

impl RowLine {
    /// Total polyline length in pixels.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|p| p[0].distance(&p[1])).sum()
    }

    /// Consecutive vertex pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.points.windows(2).map(|p| (p[0], p[1]))
    }

    /// A row needs at least two plants before any spacing can be measured.
    pub fn is_measurable(&self) -> bool {
        self.points.len() >= 2
    }
}

/// The rows found in one image, with the geometry used to find them.
#[derive(Clone, Debug)]
pub struct RowLayout {
    /// Dominant row direction.
    pub direction: Direction,
    /// Across-row clustering tolerance that was applied, in pixels.
    pub tolerance: f64,
    pub lines: Vec<RowLine>,
}

impl RowLayout {
    /// Total length of all row polylines, in pixels.
    pub fn total_length(&self) -> f64 {
        self.lines.iter().map(RowLine::length).sum()
    }

    /// Median distance between adjacent rows, measured across the row
    /// direction. `None` with fewer than two rows.
    pub fn row_spacing(&self) -> Option<f64> {
        let gaps: Vec<f64> = self
            .lines
            .windows(2)
            .map(|pair| (pair[1].offset - pair[0].offset).abs())
            .collect();
        median(&gaps)
    }
}

/// Projected position of one component.
struct Placed<'a> {
    component: &'a Component,
    along: f64,
    across: f64,
}

/// Partition the components of `map` into plantation rows.
///
/// The dominant direction comes from the centroids; components are then
/// grouped by their position across that direction and each group is
/// ordered along it.
///
/// A component with a non-finite centroid means the labeling produced
/// garbage and fails the whole call.
pub fn detect_rows(map: &ComponentMap, config: &RowConfig) -> Result<RowLayout> {
    config.validate()?;
    let components = map.components();

    if let Some(bad) = components.iter().find(|c| !c.centroid.is_finite()) {
        return Err(CanegapError::InvariantViolation(format!(
            "component {} has a non-finite centroid ({}, {})",
            bad.id, bad.centroid.x, bad.centroid.y
        )));
    }

    let centroids: Vec<Point> = components.iter().map(|c| c.centroid).collect();
    let direction = dominant_direction(&centroids);
    let normal = direction.normal();

    let tolerance = match config.row_tolerance {
        Some(t) => t,
        None => {
            let extents: Vec<f64> = components
                .iter()
                .map(|c| c.bbox.extent_along(&normal))
                .collect();
            median(&extents).unwrap_or(MIN_ROW_TOLERANCE_PX).max(MIN_ROW_TOLERANCE_PX)
        }
    };

    let mut placed: Vec<Placed> = components
        .iter()
        .map(|c| Placed {
            component: c,
            along: c.centroid.dot(&direction),
            across: c.centroid.dot(&normal),
        })
        .collect();
    placed.sort_by(|a, b| a.across.total_cmp(&b.across).then(a.component.id.cmp(&b.component.id)));

    // Single-linkage clustering on the across coordinate.
    let mut clusters: Vec<Vec<Placed>> = Vec::new();
    let mut last_across = f64::NEG_INFINITY;
    for p in placed {
        let starts_new_row = clusters.is_empty() || p.across - last_across > tolerance;
        last_across = p.across;
        if starts_new_row {
            clusters.push(Vec::new());
        }
        if let Some(current) = clusters.last_mut() {
            current.push(p);
        }
    }

    let lines: Vec<RowLine> = clusters
        .into_iter()
        .enumerate()
        .map(|(index, mut cluster)| {
            cluster.sort_by(|a, b| a.along.total_cmp(&b.along).then(a.component.id.cmp(&b.component.id)));
            let offset = cluster.iter().map(|p| p.across).sum::<f64>() / cluster.len() as f64;
            RowLine {
                index,
                component_ids: cluster.iter().map(|p| p.component.id).collect(),
                points: cluster.iter().map(|p| p.component.centroid).collect(),
                offset,
            }
        })
        .collect();

    let short_rows = lines.iter().filter(|l| !l.is_measurable()).count();
    debug!(
        angle_deg = direction.angle().to_degrees(),
        tolerance,
        short_rows,
        "Row geometry"
    );
    info!(rows = lines.len(), components = components.len(), "Detected rows");

    Ok(RowLayout {
        direction,
        tolerance,
        lines,
    })
}
