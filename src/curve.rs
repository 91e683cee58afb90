//! # Curve, Grid and Label Construction
//!
//! Builds the drawable pieces of a tide chart from mapped points. Everything
//! here is backend-neutral data: a [`Path`] of move/line/cubic commands and a
//! list of [`LabelPlacement`]s. The [`crate::renderer`] and [`crate::svg`]
//! modules turn them into pixels or markup.
//!
//! ## Curve Smoothing
//! Consecutive points are joined by cubic Bezier segments whose control points
//! sit one third and two thirds of the way along the x delta, each level with
//! its nearer endpoint:
//!
//! ```text
//! c1 = (prev.x +     dx / 3, prev.y)
//! c2 = (prev.x + 2 * dx / 3, p.y)
//! ```
//!
//! The curve flattens out at every sample, so sharp reversals can look
//! rounder than the data. It is a visual smoothing, not a spline fit.

use crate::{PlotPoint, Sample, TideKind, Viewport};
use chrono::{DateTime, TimeZone};
use std::fmt::{self, Write};

/// Number of horizontal guide lines in the default grid.
pub const DEFAULT_GRID_LINES: usize = 4;

/// Vertical distance in pixels between a point and its label anchor.
pub const DEFAULT_LABEL_OFFSET: f64 = 40.0;

/// A single drawing command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(PlotPoint),
    LineTo(PlotPoint),
    CubicTo {
        c1: PlotPoint,
        c2: PlotPoint,
        to: PlotPoint,
    },
}

/// An ordered list of drawing commands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: Vec<PathCommand>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: PlotPoint) {
        self.commands.push(PathCommand::MoveTo(p));
    }

    pub fn line_to(&mut self, p: PlotPoint) {
        self.commands.push(PathCommand::LineTo(p));
    }

    pub fn cubic_to(&mut self, c1: PlotPoint, c2: PlotPoint, to: PlotPoint) {
        self.commands.push(PathCommand::CubicTo { c1, c2, to });
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Approximate the path with polylines, one per `MoveTo`.
    ///
    /// Each cubic segment is sampled at `steps` evenly spaced parameter values.
    pub fn flatten(&self, steps: usize) -> Vec<Vec<PlotPoint>> {
        let steps = steps.max(1);
        let mut polylines: Vec<Vec<PlotPoint>> = Vec::new();

        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => polylines.push(vec![p]),
                PathCommand::LineTo(p) => current(&mut polylines, p).push(p),
                PathCommand::CubicTo { c1, c2, to } => {
                    let line = current(&mut polylines, to);
                    let Some(&start) = line.last() else { continue };
                    for i in 1..=steps {
                        let t = i as f64 / steps as f64;
                        line.push(cubic_at(start, c1, c2, to, t));
                    }
                }
            }
        }

        polylines
    }
}

/// The polyline being extended; a path that starts without `MoveTo` begins at
/// its first drawn point.
fn current(polylines: &mut Vec<Vec<PlotPoint>>, fallback: PlotPoint) -> &mut Vec<PlotPoint> {
    if polylines.is_empty() {
        polylines.push(vec![fallback]);
    }
    let last = polylines.len() - 1;
    &mut polylines[last]
}

fn cubic_at(p0: PlotPoint, c1: PlotPoint, c2: PlotPoint, p3: PlotPoint, t: f64) -> PlotPoint {
    let u = 1.0 - t;
    let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
    PlotPoint::new(
        a * p0.x + b * c1.x + c * c2.x + d * p3.x,
        a * p0.y + b * c1.y + c * c2.y + d * p3.y,
    )
}

/// SVG path data (`d` attribute).
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for command in &self.commands {
            if !first {
                f.write_char(' ')?;
            }
            first = false;
            match command {
                PathCommand::MoveTo(p) => write!(f, "M{} {}", p.x, p.y)?,
                PathCommand::LineTo(p) => write!(f, "L{} {}", p.x, p.y)?,
                PathCommand::CubicTo { c1, c2, to } => write!(
                    f,
                    "C{} {} {} {} {} {}",
                    c1.x, c1.y, c2.x, c2.y, to.x, to.y
                )?,
            }
        }
        Ok(())
    }
}

/// Build the smoothed tide curve through `points`.
///
/// Fewer than two points produce an empty path.
pub fn build_curve(points: &[PlotPoint]) -> Path {
    let mut path = Path::new();
    if points.len() < 2 {
        return path;
    }

    path.move_to(points[0]);
    for pair in points.windows(2) {
        let (prev, p) = (pair[0], pair[1]);
        let dx = p.x - prev.x;
        let c1 = PlotPoint::new(prev.x + dx / 3.0, prev.y);
        let c2 = PlotPoint::new(prev.x + 2.0 * dx / 3.0, p.y);
        path.cubic_to(c1, c2, p);
    }
    path
}

/// Build the decorative grid: `lines` evenly spaced horizontal guides plus a
/// full-height vertical guide at every point.
pub fn build_grid(points: &[PlotPoint], viewport: Viewport, lines: usize) -> Path {
    let mut path = Path::new();

    let spacing = viewport.height / (lines + 1) as f64;
    for i in 1..=lines {
        let y = spacing * i as f64;
        path.move_to(PlotPoint::new(0.0, y));
        path.line_to(PlotPoint::new(viewport.width, y));
    }

    for point in points {
        path.move_to(PlotPoint::new(point.x, 0.0));
        path.line_to(PlotPoint::new(point.x, viewport.height));
    }

    path
}

/// Text shown next to one sample.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelPlacement {
    /// Where the label is centered, `offset` pixels above its point
    pub anchor: PlotPoint,
    /// `HH:MM`, 24-hour clock
    pub time: String,
    /// Height in meters, one decimal, e.g. `1.5m`
    pub height: String,
    pub kind: TideKind,
}

/// Build one label per `(point, sample)` pair, formatting times in `tz`.
///
/// Pairs beyond the shorter of the two slices are ignored.
pub fn build_labels<Tz>(
    points: &[PlotPoint],
    samples: &[Sample],
    tz: &Tz,
    offset: f64,
) -> Vec<LabelPlacement>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    points
        .iter()
        .zip(samples)
        .map(|(point, sample)| LabelPlacement {
            anchor: PlotPoint::new(point.x, point.y - offset),
            time: format_time(&sample.timestamp.with_timezone(tz)),
            height: format_height(sample.height),
            kind: sample.kind,
        })
        .collect()
}

/// Format an instant as a 24-hour `HH:MM` clock time.
pub fn format_time<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    time.format("%H:%M").to_string()
}

/// Format a height in meters with one decimal place.
pub fn format_height(height: f64) -> String {
    format!("{:.1}m", height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn sample(secs: i64, height: f64, kind: TideKind) -> Sample {
        Sample {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            height,
            kind,
        }
    }

    #[test]
    fn test_short_input_gives_empty_curve() {
        assert!(build_curve(&[]).is_empty());
        assert!(build_curve(&[PlotPoint::new(0.0, 100.0)]).is_empty());
    }

    #[test]
    fn test_two_points_give_one_cubic() {
        let a = PlotPoint::new(30.0, 80.0);
        let b = PlotPoint::new(120.0, 20.0);
        let path = build_curve(&[a, b]);

        assert_eq!(
            path.commands(),
            &[
                PathCommand::MoveTo(a),
                PathCommand::CubicTo {
                    c1: PlotPoint::new(60.0, 80.0),
                    c2: PlotPoint::new(90.0, 20.0),
                    to: b,
                },
            ]
        );
    }

    #[test]
    fn test_curve_passes_through_every_point() {
        let points = [
            PlotPoint::new(0.0, 100.0),
            PlotPoint::new(100.0, 0.0),
            PlotPoint::new(200.0, 100.0),
        ];
        let path = build_curve(&points);
        assert_eq!(path.commands().len(), 3);

        let ends: Vec<PlotPoint> = path
            .commands()
            .iter()
            .map(|c| match *c {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => p,
                PathCommand::CubicTo { to, .. } => to,
            })
            .collect();
        assert_eq!(ends, points);
    }

    #[test]
    fn test_flatten_samples_cubics() {
        let path = build_curve(&[PlotPoint::new(0.0, 0.0), PlotPoint::new(90.0, 60.0)]);
        let lines = path.flatten(6);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 7);
        assert_eq!(lines[0][0], PlotPoint::new(0.0, 0.0));
        assert_eq!(lines[0][6], PlotPoint::new(90.0, 60.0));
        // Control points are level with the endpoints, so the midpoint is the
        // center of the segment.
        assert_eq!(lines[0][3], PlotPoint::new(45.0, 30.0));
    }

    #[test]
    fn test_grid_lines() {
        let points = [PlotPoint::new(0.0, 10.0), PlotPoint::new(50.0, 90.0)];
        let grid = build_grid(&points, Viewport::new(200.0, 100.0), DEFAULT_GRID_LINES);

        // 4 horizontal + 2 vertical guides, two commands each
        assert_eq!(grid.commands().len(), 12);
        assert_eq!(grid.commands()[0], PathCommand::MoveTo(PlotPoint::new(0.0, 20.0)));
        assert_eq!(grid.commands()[1], PathCommand::LineTo(PlotPoint::new(200.0, 20.0)));
        assert_eq!(grid.commands()[6], PathCommand::MoveTo(PlotPoint::new(0.0, 80.0)));
        assert_eq!(grid.commands()[10], PathCommand::MoveTo(PlotPoint::new(50.0, 0.0)));
        assert_eq!(grid.commands()[11], PathCommand::LineTo(PlotPoint::new(50.0, 100.0)));
        assert_eq!(grid.flatten(1).len(), 6);
    }

    #[test]
    fn test_labels_format_time_height_and_kind() {
        let samples = [
            sample(0, 1.0, TideKind::Low),
            sample(3600 + 5 * 60, 2.04, TideKind::High),
        ];
        let points = [PlotPoint::new(0.0, 100.0), PlotPoint::new(200.0, 0.0)];
        let labels = build_labels(&points, &samples, &Utc, DEFAULT_LABEL_OFFSET);

        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].time, "00:00");
        assert_eq!(labels[0].height, "1.0m");
        assert_eq!(labels[0].kind, TideKind::Low);
        assert_eq!(labels[0].anchor, PlotPoint::new(0.0, 60.0));
        assert_eq!(labels[1].time, "01:05");
        assert_eq!(labels[1].height, "2.0m");
        assert_eq!(labels[1].anchor, PlotPoint::new(200.0, -40.0));
    }

    #[test]
    fn test_labels_use_given_time_zone() {
        let samples = [sample(13 * 3600, 0.5, TideKind::Low)];
        let points = [PlotPoint::new(0.0, 0.0)];
        let tz = FixedOffset::east_opt(10 * 3600).unwrap();
        let labels = build_labels(&points, &samples, &tz, 0.0);
        assert_eq!(labels[0].time, "23:00");
    }

    #[test]
    fn test_svg_path_data() {
        let path = build_curve(&[PlotPoint::new(0.0, 90.0), PlotPoint::new(30.0, 0.0)]);
        assert_eq!(path.to_string(), "M0 90 C10 90 20 0 30 0");
    }
}
