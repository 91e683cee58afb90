//! # Chart Layout
//!
//! Composes the mapper, curve builder and interpolator into everything a
//! presentation backend needs for one draw: curve path, grid path, optional
//! live marker and label placements. Layout is recomputed from scratch on
//! every call.

use crate::curve::{
    build_curve, build_grid, build_labels, LabelPlacement, Path, DEFAULT_GRID_LINES,
    DEFAULT_LABEL_OFFSET,
};
use crate::interpolator::current_marker;
use crate::mapper::map_points;
use crate::{check_series, ChartError, PlotPoint, Sample, Viewport};
use chrono::{DateTime, TimeZone, Utc};
use std::fmt;

/// Tunables for a chart layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartStyle {
    /// Horizontal guide lines in the grid
    pub grid_lines: usize,
    /// Pixels between a point and its label anchor
    pub label_offset: f64,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            grid_lines: DEFAULT_GRID_LINES,
            label_offset: DEFAULT_LABEL_OFFSET,
        }
    }
}

/// Drawable chart data for one viewport and one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartLayout {
    pub viewport: Viewport,
    pub curve: Path,
    pub grid: Path,
    /// Live marker for the current tide, absent when `now` is outside the series
    pub marker: Option<PlotPoint>,
    pub labels: Vec<LabelPlacement>,
}

impl ChartLayout {
    /// True when there is no curve to draw.
    pub fn is_blank(&self) -> bool {
        self.curve.is_empty()
    }
}

/// Lay out a full chart.
///
/// Empty and single-sample series produce a layout with an empty curve, which
/// is not an error.
///
/// # Errors
/// [`ChartError::MalformedSeries`] if timestamps are not strictly increasing.
pub fn layout_chart<Tz>(
    samples: &[Sample],
    viewport: Viewport,
    now: DateTime<Utc>,
    tz: &Tz,
    style: ChartStyle,
) -> Result<ChartLayout, ChartError>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    check_series(samples)?;

    let points = map_points(samples, viewport);
    let marker = current_marker(samples, viewport, now)?;
    tracing::debug!(
        samples = samples.len(),
        has_marker = marker.is_some(),
        "laid out tide chart"
    );

    Ok(ChartLayout {
        viewport,
        curve: build_curve(&points),
        grid: build_grid(&points, viewport, style.grid_lines),
        marker,
        labels: build_labels(&points, samples, tz, style.label_offset),
    })
}
