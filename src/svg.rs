//! SVG output for a [`ChartLayout`].
//!
//! Colors follow the chart's conventions: a faint gray grid, a blue tide
//! curve, a red dot for the current tide, and labels tinted blue for high and
//! red for low samples.

use crate::chart::ChartLayout;
use crate::TideKind;
use quick_xml::escape::escape;
use std::fmt;

const GRID_STYLE: &str = r#"stroke="gray" stroke-opacity="0.3" stroke-width="1" fill="none""#;
const CURVE_STYLE: &str = r#"stroke="blue" stroke-width="2" fill="none""#;
const MARKER_RADIUS: f64 = 5.0;
const LABEL_LINE_HEIGHT: f64 = 12.0;

/// Horizontal room on each side for labels centered on the edge columns.
const SIDE_MARGIN: f64 = 20.0;
/// Extra height below the chart holding the title.
const TITLE_BAND: f64 = 28.0;
const TITLE_BASELINE: f64 = 20.0;

/// Serialize `layout` as a standalone SVG document, with an optional title
/// drawn under the chart.
///
/// The view box is padded so that labels above the highest samples and the
/// title below the chart stay visible.
pub fn render_svg(layout: &ChartLayout, title: Option<&str>) -> String {
    SvgChart { layout, title }.to_string()
}

struct SvgChart<'a> {
    layout: &'a ChartLayout,
    title: Option<&'a str>,
}

/// Vertical extent of the drawn content, in viewport coordinates.
struct Extent {
    top: f64,
    bottom: f64,
}

impl SvgChart<'_> {
    fn extent(&self) -> Extent {
        let layout = self.layout;
        let mut extent = Extent {
            top: 0.0,
            bottom: layout.viewport.height,
        };
        for label in &layout.labels {
            // Three lines: baselines at anchor - line, anchor, anchor + line
            extent.top = extent.top.min(label.anchor.y - 2.0 * LABEL_LINE_HEIGHT);
            extent.bottom = extent.bottom.max(label.anchor.y + LABEL_LINE_HEIGHT + 4.0);
        }
        if let Some(marker) = layout.marker {
            extent.top = extent.top.min(marker.y - MARKER_RADIUS);
            extent.bottom = extent.bottom.max(marker.y + MARKER_RADIUS);
        }
        extent
    }
}

impl fmt::Display for SvgChart<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = self.layout;
        let viewport = layout.viewport;
        let extent = self.extent();
        let bottom = match self.title {
            Some(_) => extent.bottom + TITLE_BAND,
            None => extent.bottom,
        };

        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="{x} {y} {w} {h}">"#,
            x = -SIDE_MARGIN,
            y = extent.top,
            w = viewport.width + 2.0 * SIDE_MARGIN,
            h = bottom - extent.top,
        )?;

        if !layout.grid.is_empty() {
            writeln!(f, r#"  <path class="grid" d="{}" {}/>"#, layout.grid, GRID_STYLE)?;
        }
        if !layout.curve.is_empty() {
            writeln!(f, r#"  <path class="curve" d="{}" {}/>"#, layout.curve, CURVE_STYLE)?;
        }
        if let Some(marker) = layout.marker {
            writeln!(
                f,
                r#"  <circle class="marker" cx="{}" cy="{}" r="{}" fill="red"/>"#,
                marker.x, marker.y, MARKER_RADIUS
            )?;
        }

        for label in &layout.labels {
            let color = match label.kind {
                TideKind::High => "blue",
                TideKind::Low => "red",
            };
            writeln!(
                f,
                r#"  <text class="label" x="{x}" y="{y}" font-size="10" text-anchor="middle">"#,
                x = label.anchor.x,
                y = label.anchor.y - LABEL_LINE_HEIGHT,
            )?;
            writeln!(f, r#"    <tspan x="{}" dy="0">{}</tspan>"#, label.anchor.x, escape(label.time.as_str()))?;
            writeln!(
                f,
                r#"    <tspan x="{}" dy="{}">{}</tspan>"#,
                label.anchor.x,
                LABEL_LINE_HEIGHT,
                escape(label.height.as_str())
            )?;
            writeln!(
                f,
                r#"    <tspan x="{}" dy="{}" fill="{}">{}</tspan>"#,
                label.anchor.x, LABEL_LINE_HEIGHT, color, label.kind
            )?;
            writeln!(f, "  </text>")?;
        }

        if let Some(title) = self.title {
            writeln!(
                f,
                r#"  <text class="title" x="{}" y="{}" font-size="16" text-anchor="middle">{}</text>"#,
                viewport.width / 2.0,
                extent.bottom + TITLE_BASELINE,
                escape(title)
            )?;
        }

        writeln!(f, "</svg>")
    }
}
