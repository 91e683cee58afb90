//! # Sample to Pixel Mapping
//!
//! Projects a time-ordered tide series into a [`Viewport`]:
//! - **X axis**: linear in time, first sample at `x = 0`, last at `x = width`
//! - **Y axis**: linear in height and inverted, lowest tide at `y = height`,
//!   highest at `y = 0` (screen coordinates grow downwards)
//!
//! Flat tides and single-sample series have a zero height range or time span;
//! both are replaced by `1` so the projection stays finite.

use crate::{PlotPoint, Sample, Viewport};
use chrono::{DateTime, Utc};

/// Projection fitted to one series and one viewport.
///
/// Shared by [`map_points`] and the live marker so both land on the same
/// coordinate system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scale {
    t0: DateTime<Utc>,
    time_span_secs: f64,
    min_height: f64,
    height_range: f64,
    viewport: Viewport,
}

impl Scale {
    /// Fit a scale to `samples`. Returns `None` for an empty series.
    pub fn fit(samples: &[Sample], viewport: Viewport) -> Option<Self> {
        let first = samples.first()?;
        let last = samples.last()?;

        let (min_height, max_height) = samples
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), s| {
                (min.min(s.height), max.max(s.height))
            });

        Some(Self {
            t0: first.timestamp,
            time_span_secs: non_zero(seconds_between(first.timestamp, last.timestamp)),
            min_height,
            height_range: non_zero(max_height - min_height),
            viewport,
        })
    }

    /// Project an arbitrary `(instant, height)` pair.
    pub fn project(&self, timestamp: DateTime<Utc>, height: f64) -> PlotPoint {
        let x = self.viewport.width * seconds_between(self.t0, timestamp) / self.time_span_secs;
        let y = self.viewport.height * (1.0 - (height - self.min_height) / self.height_range);
        PlotPoint::new(x, y)
    }
}

/// Map every sample to a plot point, preserving order.
///
/// An empty series yields an empty vector, which callers treat as "nothing to
/// draw".
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use tide_chart_lib::{mapper::map_points, PlotPoint, Sample, TideKind, Viewport};
///
/// let samples: Vec<Sample> = [(0, 1.0), (3600, 2.0), (7200, 1.0)]
///     .iter()
///     .map(|&(t, h)| Sample {
///         timestamp: Utc.timestamp_opt(t, 0).unwrap(),
///         height: h,
///         kind: TideKind::Low,
///     })
///     .collect();
///
/// let points = map_points(&samples, Viewport::new(200.0, 100.0));
/// assert_eq!(points[1], PlotPoint::new(100.0, 0.0));
/// ```
pub fn map_points(samples: &[Sample], viewport: Viewport) -> Vec<PlotPoint> {
    let Some(scale) = Scale::fit(samples, viewport) else {
        return Vec::new();
    };
    samples
        .iter()
        .map(|s| scale.project(s.timestamp, s.height))
        .collect()
}

/// Seconds from `from` to `to`, millisecond precision.
pub(crate) fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

fn non_zero(value: f64) -> f64 {
    if value == 0.0 {
        1.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TideKind;
    use chrono::TimeZone;

    fn series(points: &[(i64, f64)]) -> Vec<Sample> {
        points
            .iter()
            .map(|&(t, h)| Sample {
                timestamp: Utc.timestamp_opt(t, 0).unwrap(),
                height: h,
                kind: TideKind::Low,
            })
            .collect()
    }

    #[test]
    fn test_empty_series_maps_to_nothing() {
        assert!(map_points(&[], Viewport::new(200.0, 100.0)).is_empty());
        assert!(Scale::fit(&[], Viewport::new(200.0, 100.0)).is_none());
    }

    #[test]
    fn test_three_sample_example() {
        let samples = series(&[(0, 1.0), (3600, 2.0), (7200, 1.0)]);
        let points = map_points(&samples, Viewport::new(200.0, 100.0));
        assert_eq!(
            points,
            vec![
                PlotPoint::new(0.0, 100.0),
                PlotPoint::new(100.0, 0.0),
                PlotPoint::new(200.0, 100.0),
            ]
        );
    }

    #[test]
    fn test_single_sample_uses_guards() {
        let samples = series(&[(1_700_000_000, 3.4)]);
        let points = map_points(&samples, Viewport::new(200.0, 100.0));
        // Zero span and range both become 1, so the point sits at the origin
        // column with the sample on the baseline.
        assert_eq!(points, vec![PlotPoint::new(0.0, 100.0)]);
    }

    #[test]
    fn test_flat_tide_has_equal_y() {
        let samples = series(&[(0, 0.8), (600, 0.8), (1200, 0.8), (1800, 0.8)]);
        let points = map_points(&samples, Viewport::new(320.0, 240.0));
        assert_eq!(points.len(), 4);
        assert!(points.iter().all(|p| p.y == points[0].y));
        assert!(points.iter().all(|p| p.y.is_finite()));
    }

    #[test]
    fn test_points_stay_inside_viewport() {
        let samples = series(&[
            (0, -0.4),
            (1800, 0.3),
            (3600, 1.9),
            (5400, 2.7),
            (9000, 1.1),
            (12_600, -0.2),
            (16_200, 0.0),
        ]);
        let viewport = Viewport::new(400.0, 300.0);
        let points = map_points(&samples, viewport);

        assert_eq!(points.len(), samples.len());
        for p in &points {
            assert!((0.0..=viewport.width).contains(&p.x), "x out of range: {}", p.x);
            assert!((0.0..=viewport.height).contains(&p.y), "y out of range: {}", p.y);
        }
        // Order preserved along the time axis
        assert!(points.windows(2).all(|w| w[0].x < w[1].x));
        // Highest sample at the top, lowest at the bottom
        assert_eq!(points[3].y, 0.0);
        assert_eq!(points[0].y, viewport.height);
    }

    #[test]
    fn test_project_between_samples() {
        let samples = series(&[(0, 0.0), (100, 2.0)]);
        let scale = Scale::fit(&samples, Viewport::new(100.0, 50.0)).unwrap();
        let p = scale.project(Utc.timestamp_opt(25, 0).unwrap(), 1.0);
        assert_eq!(p, PlotPoint::new(25.0, 25.0));
    }
}
