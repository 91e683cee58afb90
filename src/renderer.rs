//! # Tide Chart Rasterization
//!
//! This module draws a [`ChartLayout`] onto any `embedded-graphics`
//! [`DrawTarget`] with [`BinaryColor`] pixels: e-paper buffers, simulators, or
//! the [`AsciiCanvas`] used for terminal output during development.
//!
//! Layers are drawn back to front: grid, curve, marker, labels. Cubic curve
//! segments are flattened into short lines before drawing.

use crate::chart::ChartLayout;
use crate::curve::{LabelPlacement, Path};
use crate::PlotPoint;
use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle},
    text::{Alignment, Text},
};
use std::convert::Infallible;
use std::fmt;

/// Stroke widths and sizes used when rasterizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterStyle {
    pub grid_width: u32,
    pub curve_width: u32,
    /// Diameter of the live marker dot
    pub marker_diameter: u32,
    /// Line segments per cubic curve segment
    pub flatten_steps: usize,
}

impl Default for RasterStyle {
    fn default() -> Self {
        Self {
            grid_width: 1,
            curve_width: 2,
            marker_diameter: 10,
            flatten_steps: 16,
        }
    }
}

impl RasterStyle {
    /// Single-cell strokes for character grids.
    pub fn ascii() -> Self {
        Self {
            grid_width: 1,
            curve_width: 1,
            marker_diameter: 1,
            flatten_steps: 8,
        }
    }
}

/// Draw grid, curve and marker.
pub fn draw_chart<D>(layout: &ChartLayout, target: &mut D, style: RasterStyle) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    draw_grid(layout, target, style)?;
    draw_curve(layout, target, style)?;
    draw_marker(layout, target, style)
}

pub fn draw_grid<D>(layout: &ChartLayout, target: &mut D, style: RasterStyle) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    stroke_path(&layout.grid, target, style.grid_width, 1)
}

pub fn draw_curve<D>(layout: &ChartLayout, target: &mut D, style: RasterStyle) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    stroke_path(&layout.curve, target, style.curve_width, style.flatten_steps)
}

pub fn draw_marker<D>(layout: &ChartLayout, target: &mut D, style: RasterStyle) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let Some(marker) = layout.marker else {
        return Ok(());
    };
    let center = to_point(marker);
    if style.marker_diameter <= 1 {
        return Pixel(center, BinaryColor::On).draw(target);
    }
    Circle::with_center(center, style.marker_diameter)
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(target)
}

/// Draw each label as three centered lines: time, height, tag.
pub fn draw_labels<D>(labels: &[LabelPlacement], target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let text_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let line_height = FONT_6X10.character_size.height as i32;

    for label in labels {
        let anchor = to_point(label.anchor);
        let lines = [label.time.as_str(), label.height.as_str(), label.kind.as_str()];
        for (row, line) in lines.iter().enumerate() {
            let y = anchor.y + (row as i32 - 1) * line_height;
            Text::with_alignment(line, Point::new(anchor.x, y), text_style, Alignment::Center)
                .draw(target)?;
        }
    }
    Ok(())
}

fn stroke_path<D>(path: &Path, target: &mut D, width: u32, steps: usize) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let stroke = PrimitiveStyle::with_stroke(BinaryColor::On, width);
    for polyline in path.flatten(steps) {
        for pair in polyline.windows(2) {
            Line::new(to_point(pair[0]), to_point(pair[1]))
                .into_styled(stroke)
                .draw(target)?;
        }
    }
    Ok(())
}

fn to_point(p: PlotPoint) -> Point {
    Point::new(p.x.round() as i32, p.y.round() as i32)
}

/// A character grid that acts as a monochrome display.
///
/// Lit pixels are written with the current pen character, so successive
/// layers can be told apart in the output.
#[derive(Clone, Debug)]
pub struct AsciiCanvas {
    width: u32,
    height: u32,
    cells: Vec<char>,
    pen: char,
}

impl AsciiCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![' '; width as usize * height as usize],
            pen: '#',
        }
    }

    pub fn set_pen(&mut self, pen: char) {
        self.pen = pen;
    }

    pub fn get(&self, x: u32, y: u32) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.cells[self.index(x, y)])
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Draw grid as `.`, curve as `*` and the live marker as `X`.
    pub fn render(layout: &ChartLayout, width: u32, height: u32) -> Self {
        let style = RasterStyle::ascii();
        let mut canvas = Self::new(width, height);
        canvas.set_pen('.');
        infallible(draw_grid(layout, &mut canvas, style));
        canvas.set_pen('*');
        infallible(draw_curve(layout, &mut canvas, style));
        canvas.set_pen('X');
        infallible(draw_marker(layout, &mut canvas, style));
        canvas
    }
}

fn infallible(result: Result<(), Infallible>) {
    result.unwrap_or_else(|never| match never {})
}

impl OriginDimensions for AsciiCanvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for AsciiCanvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x >= self.width || y >= self.height {
                continue;
            }
            let index = self.index(x, y);
            self.cells[index] = match color {
                BinaryColor::On => self.pen,
                BinaryColor::Off => ' ',
            };
        }
        Ok(())
    }
}

impl fmt::Display for AsciiCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width.max(1) as usize) {
            let line: String = row.iter().collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
