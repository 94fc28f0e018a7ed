//! Dual-panel IV charts written as SVG.
//!
//! The left panel shows the scaled current on a linear axis, the right one on
//! a logarithmic axis. Only strictly positive samples can sit on the log axis;
//! the curve there is broken wherever the current drops to zero or below.

use std::fs;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{IvError, Result};
use crate::reader::IvSeries;
use crate::scale::ScaledSeries;

/// Color cycle used for curves, first entry first.
pub const DEFAULT_PALETTE: [(&str, &str); 20] = [
    ("steel_blue", "#1F77B4"),
    ("light_steel_blue", "#AEC7E8"),
    ("orange", "#FF7F0E"),
    ("light_orange", "#FFBB78"),
    ("forest_green", "#2CA02C"),
    ("light_green", "#98DF8A"),
    ("firebrick_red", "#D62728"),
    ("soft_red", "#FF9896"),
    ("lavender", "#9467BD"),
    ("light_lavender", "#C5B0D5"),
    ("brown", "#8C564B"),
    ("tan", "#C49C94"),
    ("orchid", "#E377C2"),
    ("light_orchid", "#F7B6D2"),
    ("gray", "#7F7F7F"),
    ("light_gray", "#C7C7C7"),
    ("yellow_green", "#BCBD22"),
    ("light_yellow_green", "#DBDB8D"),
    ("turquoise", "#17BECF"),
    ("light_turquoise", "#9EDAE5"),
];

/// Fraction of the data span added on each side of a linear axis.
const AXIS_MARGIN: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartStyle {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default = "default_line_width")]
    pub line_width: u32,
    #[serde(default = "default_palette")]
    pub palette: Vec<String>,
    #[serde(default = "default_bias_label")]
    pub bias_label: String,
    #[serde(default = "default_current_label")]
    pub current_label: String,
    #[serde(default = "default_current_unit")]
    pub current_unit: String,
}

fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    400
}
fn default_font_family() -> String {
    "serif".to_string()
}
fn default_font_size() -> u32 {
    13
}
fn default_line_width() -> u32 {
    2
}
fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|(_, hex)| hex.to_string()).collect()
}
fn default_bias_label() -> String {
    "Bias (V)".to_string()
}
fn default_current_label() -> String {
    "Current".to_string()
}
fn default_current_unit() -> String {
    "A".to_string()
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            line_width: default_line_width(),
            palette: default_palette(),
            bias_label: default_bias_label(),
            current_label: default_current_label(),
            current_unit: default_current_unit(),
        }
    }
}

impl ChartStyle {
    pub fn line_color(&self) -> Result<RGBColor> {
        let hex = self
            .palette
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_PALETTE[0].1);
        parse_hex_color(hex)
            .ok_or_else(|| IvError::Render(format!("invalid palette color: {:?}", hex)))
    }

    /// Y axis description, e.g. `Current (µA)`.
    pub fn current_axis_label(&self, prefix: &str) -> String {
        format!("{} ({}{})", self.current_label, prefix, self.current_unit)
    }
}

pub fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    let digits = hex.trim().strip_prefix('#')?;
    if digits.len() != 6 || !digits.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    Some(RGBColor(channel(0)?, channel(2)?, channel(4)?))
}

pub trait ChartRenderer {
    /// Draws one sweep and returns the path of the written figure.
    fn render(&self, name: &str, series: &IvSeries, scaled: &ScaledSeries) -> Result<PathBuf>;
}

fn render_err<E: std::fmt::Display>(e: E) -> IvError {
    IvError::Render(e.to_string())
}

/// Min and max over finite values, widened so a flat series still has a span.
fn padded_range(values: &[f64]) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return (0.0, 1.0);
    }
    if lo == hi {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * AXIS_MARGIN };
        return (lo - pad, hi + pad);
    }
    let pad = (hi - lo) * AXIS_MARGIN;
    (lo - pad, hi + pad)
}

/// Bounds for a log axis over the strictly positive values.
fn log_range(values: &[f64]) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && *v > 0.0)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return (0.1, 10.0);
    }
    if lo == hi {
        return (lo / 10.0, hi * 10.0);
    }
    let pad = (hi / lo).powf(AXIS_MARGIN);
    (lo / pad, hi * pad)
}

/// Splits the curve into runs of strictly positive current.
fn positive_segments(bias: &[f64], current: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut run: Vec<(f64, f64)> = Vec::new();
    for (&x, &y) in bias.iter().zip(current) {
        if y > 0.0 && y.is_finite() {
            run.push((x, y));
        } else if !run.is_empty() {
            segments.push(std::mem::take(&mut run));
        }
    }
    if !run.is_empty() {
        segments.push(run);
    }
    segments
}

pub struct SvgChartRenderer {
    output_dir: PathBuf,
    style: ChartStyle,
}

impl SvgChartRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, style: ChartStyle) -> Self {
        Self {
            output_dir: output_dir.into(),
            style,
        }
    }

    /// `<output_dir>/<stem>.svg` for an input file name.
    pub fn output_path(&self, name: &str) -> PathBuf {
        let stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(name);
        self.output_dir.join(format!("{}.svg", stem))
    }

    fn draw_linear<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        bias: &[f64],
        current: &[f64],
        y_desc: &str,
        line: ShapeStyle,
    ) -> Result<()> {
        let (x0, x1) = padded_range(bias);
        let (y0, y1) = padded_range(current);
        let font = (self.style.font_family.as_str(), self.style.font_size);
        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(render_err)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_desc(self.style.bias_label.as_str())
            .y_desc(y_desc)
            .axis_desc_style(font)
            .label_style(font)
            .draw()
            .map_err(render_err)?;
        chart
            .draw_series(LineSeries::new(
                bias.iter().copied().zip(current.iter().copied()),
                line,
            ))
            .map_err(render_err)?;
        Ok(())
    }

    fn draw_log<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        bias: &[f64],
        current: &[f64],
        line: ShapeStyle,
    ) -> Result<()> {
        let (x0, x1) = padded_range(bias);
        let (y0, y1) = log_range(current);
        let font = (self.style.font_family.as_str(), self.style.font_size);
        let mut chart = ChartBuilder::on(area)
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(x0..x1, (y0..y1).log_scale())
            .map_err(render_err)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .disable_y_mesh()
            .x_desc(self.style.bias_label.as_str())
            .axis_desc_style(font)
            .label_style(font)
            .draw()
            .map_err(render_err)?;
        for segment in positive_segments(bias, current) {
            chart
                .draw_series(LineSeries::new(segment, line))
                .map_err(render_err)?;
        }
        Ok(())
    }
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, name: &str, series: &IvSeries, scaled: &ScaledSeries) -> Result<PathBuf> {
        if series.len() != scaled.values.len() {
            return Err(IvError::Render(format!(
                "{} bias samples but {} scaled current samples",
                series.len(),
                scaled.values.len()
            )));
        }
        fs::create_dir_all(&self.output_dir)?;
        let path = self.output_path(name);
        let line = self.style.line_color()?.stroke_width(self.style.line_width);
        let y_desc = self.style.current_axis_label(scaled.label());

        {
            let root = SVGBackend::new(&path, (self.style.width, self.style.height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(render_err)?;
            let (linear, log) = root.split_horizontally(self.style.width / 2);
            self.draw_linear(&linear, series.bias(), &scaled.values, &y_desc, line)?;
            self.draw_log(&log, series.bias(), &scaled.values, line)?;
            root.present().map_err(render_err)?;
        }

        info!(path = %path.display(), prefix = scaled.label(), "saved figure");
        Ok(path)
    }
}
