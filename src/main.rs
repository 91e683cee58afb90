//! # Tide Chart Application Entry Point
//!
//! This binary coordinates the selected location, the tide API client and the
//! chart layout. It prints an ASCII chart to stdout by default or writes an SVG
//! document with `--svg <file>`.
//!
//! ```text
//! tide-chart [--config <file>] [--set-location <name> <lat> <lon>]
//!            [--svg <file>] [--width <px>] [--height <px>]
//! ```


use anyhow::{bail, Context};
use chrono::{Local, Utc};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tide_chart_lib::chart::{layout_chart, ChartLayout};
use tide_chart_lib::config::{Config, API_KEY_ENV, CONFIG_FILE};
use tide_chart_lib::curve::format_height;
use tide_chart_lib::interpolator::current_height;
use tide_chart_lib::location::{FileLocationStore, Location, LocationStore};
use tide_chart_lib::renderer::AsciiCanvas;
use tide_chart_lib::svg::render_svg;
use tide_chart_lib::tide_data::WorldTidesClient;
use tide_chart_lib::{Sample, Viewport};
use tracing_subscriber::EnvFilter;

/// Terminal chart size when no `--width`/`--height` is given.
const ASCII_COLUMNS: u32 = 100;
const ASCII_ROWS: u32 = 24;

/// Largest accepted `--width`/`--height`, in pixels or characters.
const MAX_DIMENSION: i64 = 4096;

/// Tide heights for the selected location, as an ASCII or SVG chart.
#[derive(Debug, Default, PartialEq, Parser)]
#[command(name = "tide-chart")]
#[command(version, about, long_about = None)]
pub(crate) struct Args {
    /// Configuration file (defaults to tide-config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Save a location before charting it
    #[arg(
        long,
        num_args = 3,
        value_names = ["NAME", "LAT", "LON"],
        allow_hyphen_values = true
    )]
    pub set_location: Option<Vec<String>>,

    /// Write an SVG document instead of printing an ASCII chart
    #[arg(long, value_name = "FILE")]
    pub svg: Option<PathBuf>,

    /// Chart width (SVG pixels or ASCII columns)
    #[arg(long, value_parser = clap::value_parser!(u32).range(2..=MAX_DIMENSION))]
    pub width: Option<u32>,

    /// Chart height (SVG pixels or ASCII rows)
    #[arg(long, value_parser = clap::value_parser!(u32).range(2..=MAX_DIMENSION))]
    pub height: Option<u32>,
}

impl Args {
    /// The location given with `--set-location`, validated.
    pub(crate) fn new_location(&self) -> anyhow::Result<Option<Location>> {
        let Some(values) = &self.set_location else {
            return Ok(None);
        };
        let [name, lat, lon] = values.as_slice() else {
            bail!("--set-location takes <NAME> <LAT> <LON>");
        };
        let lat = lat.parse::<f64>().with_context(|| format!("latitude {:?}", lat))?;
        let lon = lon.parse::<f64>().with_context(|| format!("longitude {:?}", lon))?;
        Ok(Some(Location::new(name.as_str(), lat, lon)?))
    }
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only the chart
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };
    let store = FileLocationStore::new(&config.location.store_path);

    if let Some(location) = args.new_location()? {
        store
            .save(&location)
            .with_context(|| format!("saving location to {}", store.path().display()))?;
    }

    let Some(location) = store.load().context("loading selected location")? else {
        println!("No location selected.");
        println!("Choose one with: tide-chart --set-location <name> <latitude> <longitude>");
        return Ok(());
    };

    if config.api.api_key.is_empty() {
        tracing::warn!(
            "no API key configured; set api.api_key in {} or {}",
            CONFIG_FILE,
            API_KEY_ENV
        );
    }

    // One clock reading for both the fetch window and the marker
    let now = Utc::now();
    let client = WorldTidesClient::new(&config.api.base_url, &config.api.api_key);
    let rt = tokio::runtime::Runtime::new()?;
    let samples = rt
        .block_on(client.fetch_samples(&location, now))
        .with_context(|| format!("could not load tide data for {}", location.name))?;

    if samples.is_empty() {
        tracing::warn!("tide API returned no heights");
    }

    match &args.svg {
        Some(path) => {
            let viewport = Viewport::new(
                args.width.unwrap_or(config.chart.width) as f64,
                args.height.unwrap_or(config.chart.height) as f64,
            );
            let layout = layout_chart(&samples, viewport, now, &Local, config.chart.style())?;
            fs::write(path, render_svg(&layout, Some(&location.name)))
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote tide chart");
        }
        None => {
            let columns = args.width.unwrap_or(ASCII_COLUMNS);
            let rows = args.height.unwrap_or(ASCII_ROWS);
            // Last column/row must stay on the canvas
            let viewport = Viewport::new((columns - 1) as f64, (rows - 1) as f64);
            let layout = layout_chart(&samples, viewport, now, &Local, config.chart.style())?;
            print!("{}", ascii_report(&layout, &samples, &location, now, columns, rows)?);
        }
    }

    Ok(())
}

/// Chart, title, current height and a table of labelled samples.
pub(crate) fn ascii_report(
    layout: &ChartLayout,
    samples: &[Sample],
    location: &Location,
    now: chrono::DateTime<Utc>,
    columns: u32,
    rows: u32,
) -> anyhow::Result<String> {
    let mut out = String::new();
    if layout.is_blank() {
        out.push_str("Not enough tide data to draw a chart.\n");
    } else {
        out.push_str(&AsciiCanvas::render(layout, columns, rows).to_string());
    }

    out.push_str(&format!("\n{}\n", location.name));
    match current_height(samples, now)? {
        Some(height) => out.push_str(&format!("Now: {}\n", format_height(height))),
        None => out.push_str("Now: outside forecast window\n"),
    }

    for label in &layout.labels {
        out.push_str(&format!("{}  {:>6}  {}\n", label.time, label.height, label.kind));
    }
    Ok(out)
}
