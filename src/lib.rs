//! # Tide Chart Core Library
//!
//! This library provides the data structures, geometry and data access for the
//! tide chart application: a 48-hour window of tide heights around "now" for a
//! single selected location, drawn as a smoothed curve with high/low labels and
//! a live marker for the current tide.
//!
//! ## Data Flow
//! 1. **Location**: the selected coordinate is loaded from a [`location::LocationStore`]
//! 2. **Fetch**: [`tide_data::WorldTidesClient`] downloads heights for `[now-24h, now+24h]`
//! 3. **Layout**: [`chart::layout_chart`] maps samples to pixel space and builds
//!    the curve, grid, labels and marker
//! 4. **Present**: [`renderer`] rasterizes the layout, [`svg`] serializes it
//!
//! Layout is pure and recomputed on every draw; nothing is cached between
//! fetches.
//!
//! ## Core Types
//! - [`Sample`]: one timestamped tide height with its high/low tag
//! - [`PlotPoint`]: a sample projected into pixel space
//! - [`Viewport`]: the pixel rectangle available for drawing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// Module declarations
pub mod chart;
pub mod config;
pub mod curve;
pub mod interpolator;
pub mod location;
pub mod mapper;
pub mod renderer;
pub mod svg;
pub mod tide_data;

/// Coarse classification of a sample relative to its batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TideKind {
    High,
    Low,
}

impl TideKind {
    /// Tag shown in chart labels.
    pub fn as_str(self) -> &'static str {
        match self {
            TideKind::High => "high",
            TideKind::Low => "low",
        }
    }
}

impl fmt::Display for TideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single tide height observation.
///
/// Series of samples are always ordered by strictly increasing `timestamp`.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use tide_chart_lib::{Sample, TideKind};
///
/// let sample = Sample {
///     timestamp: Utc.timestamp_opt(0, 0).unwrap(),
///     height: 1.2,
///     kind: TideKind::High,
/// };
/// assert_eq!(sample.kind.as_str(), "high");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Instant of the prediction
    pub timestamp: DateTime<Utc>,
    /// Tide height in meters
    pub height: f64,
    /// High/low tag derived from the batch mean
    pub kind: TideKind,
}

/// A sample projected into pixel space. `y` grows downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
}

impl PlotPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pixel-space rectangle available for rendering, supplied at draw time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Errors raised by the chart core for input it cannot lay out.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChartError {
    /// Timestamps are not strictly increasing at `index`
    #[error("malformed tide series: sample {index} is not later than its predecessor")]
    MalformedSeries { index: usize },
}

/// Check that timestamps are strictly increasing.
///
/// Returns the index of the first sample whose timestamp does not come after
/// its predecessor.
pub fn check_series(samples: &[Sample]) -> Result<(), ChartError> {
    match samples
        .windows(2)
        .position(|w| w[1].timestamp <= w[0].timestamp)
    {
        Some(pos) => Err(ChartError::MalformedSeries { index: pos + 1 }),
        None => Ok(()),
    }
}
