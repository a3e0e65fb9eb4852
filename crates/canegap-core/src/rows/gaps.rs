use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::consts::PARALLEL_ROW_THRESHOLD;
use crate::error::Result;
use crate::geometry::{median, Point};

use super::config::GapConfig;
use super::detector::RowLine;

/// A stretch of row where at least one plant is missing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GapInterval {
    /// Index of the row the gap lies on.
    pub row: usize,
    pub start: Point,
    pub end: Point,
    /// Full distance between the two bordering plants, in pixels.
    pub span: f64,
    /// Failure length in pixels: the span minus one expected spacing.
    pub length: f64,
}

/// Gap measurements for a single row.
#[derive(Clone, Debug, PartialEq)]
pub struct RowGaps {
    pub row: usize,
    /// Polyline length of the row, in pixels.
    pub row_length: f64,
    pub gaps: Vec<GapInterval>,
    /// Sum of `gaps[..].length`.
    pub gap_length: f64,
}

/// Gap measurements over every row of an image.
#[derive(Clone, Debug, PartialEq)]
pub struct GapReport {
    /// Spacing the gaps were measured against. `None` when no row has two
    /// plants to measure it from.
    pub expected_spacing: Option<f64>,
    pub rows: Vec<RowGaps>,
    pub total_row_length: f64,
    pub total_gap_length: f64,
}

impl GapReport {
    /// Every gap interval, row by row.
    pub fn intervals(&self) -> Vec<GapInterval> {
        self.rows.iter().flat_map(|r| r.gaps.iter().cloned()).collect()
    }

    pub fn gap_count(&self) -> usize {
        self.rows.iter().map(|r| r.gaps.len()).sum()
    }
}

/// The spacing plants are expected at: the configured value, or the median
/// distance between consecutive centroids across all rows. The median keeps
/// a handful of real gaps from inflating the estimate.
pub fn expected_spacing(lines: &[RowLine], config: &GapConfig) -> Option<f64> {
    if let Some(s) = config.expected_spacing {
        return Some(s);
    }
    let distances: Vec<f64> = lines
        .iter()
        .flat_map(|l| l.segments().map(|(a, b)| a.distance(&b)))
        .collect();
    median(&distances).filter(|s| *s > 0.0)
}

/// Walk each row and record the pairs of consecutive plants that sit
/// further apart than the expected spacing allows.
///
/// Rows are independent, so they are measured in parallel when there are
/// enough of them. Rows with fewer than two plants contribute their (zero)
/// length and no gaps.
pub fn measure_gaps(lines: &[RowLine], config: &GapConfig) -> Result<GapReport> {
    config.validate()?;
    let expected = expected_spacing(lines, config);

    let rows: Vec<RowGaps> = if lines.len() >= PARALLEL_ROW_THRESHOLD {
        lines
            .par_iter()
            .map(|l| measure_row(l, expected, config.spacing_tolerance))
            .collect()
    } else {
        lines
            .iter()
            .map(|l| measure_row(l, expected, config.spacing_tolerance))
            .collect()
    };

    let total_row_length = rows.iter().map(|r| r.row_length).sum();
    let total_gap_length = rows.iter().map(|r| r.gap_length).sum();
    let report = GapReport {
        expected_spacing: expected,
        rows,
        total_row_length,
        total_gap_length,
    };

    info!(
        expected_spacing = ?expected,
        gaps = report.gap_count(),
        total_gap_px = total_gap_length,
        total_row_px = total_row_length,
        "Measured gaps"
    );
    Ok(report)
}

fn measure_row(line: &RowLine, expected: Option<f64>, tolerance: f64) -> RowGaps {
    let row_length = line.length();
    let mut gaps = Vec::new();

    if let Some(expected) = expected {
        let limit = expected * (1.0 + tolerance);
        for (start, end) in line.segments() {
            let span = start.distance(&end);
            if span > limit {
                gaps.push(GapInterval {
                    row: line.index,
                    start,
                    end,
                    span,
                    length: span - expected,
                });
            }
        }
    }

    if !line.is_measurable() {
        debug!(row = line.index, plants = line.points.len(), "Row too short to measure");
    }

    let gap_length = gaps.iter().map(|g| g.length).sum();
    RowGaps {
        row: line.index,
        row_length,
        gaps,
        gap_length,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(index: usize, xs: &[f64]) -> RowLine {
        RowLine {
            index,
            component_ids: (1..=xs.len() as u32).collect(),
            points: xs.iter().map(|&x| Point::new(x, 5.0)).collect(),
            offset: 5.0,
        }
    }

    #[test]
    fn only_excess_over_one_spacing_counts() {
        let lines = [line(0, &[0.0, 10.0, 20.0, 40.0, 50.0])];
        let report = measure_gaps(&lines, &GapConfig::default()).unwrap();
        assert_eq!(report.expected_spacing, Some(10.0));
        assert_eq!(report.gap_count(), 1);
        let gap = &report.rows[0].gaps[0];
        assert_eq!(gap.span, 20.0);
        assert_eq!(gap.length, 10.0);
        assert_eq!(report.total_row_length, 50.0);
    }

    #[test]
    fn tolerance_suppresses_small_irregularities() {
        let lines = [line(0, &[0.0, 10.0, 24.0, 34.0])];
        let report = measure_gaps(&lines, &GapConfig::default()).unwrap();
        assert_eq!(report.gap_count(), 0);
    }

    #[test]
    fn configured_spacing_overrides_median() {
        let lines = [line(0, &[0.0, 10.0, 20.0])];
        let config = GapConfig {
            expected_spacing: Some(4.0),
            ..Default::default()
        };
        let report = measure_gaps(&lines, &config).unwrap();
        assert_eq!(report.gap_count(), 2);
        assert_eq!(report.total_gap_length, 12.0);
    }

    #[test]
    fn single_plant_rows_have_no_gaps() {
        let lines = [line(0, &[3.0]), line(1, &[])];
        let report = measure_gaps(&lines, &GapConfig::default()).unwrap();
        assert_eq!(report.expected_spacing, None);
        assert_eq!(report.total_row_length, 0.0);
        assert_eq!(report.gap_count(), 0);
    }
}
