use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use tracing::{info, warn};

use crate::errors::{IvError, Result};
use crate::reader::{read_series, IvSeries};
use crate::render::ChartRenderer;
use crate::scale::{scale_to_prefix, ScaledSeries};
use crate::selection::{DirectorySelector, FileSelector, ModeSelector};
use crate::summary::series_frame;

/// Result of plotting one sweep file.
#[derive(Debug)]
pub struct PlotOutcome {
    pub source: PathBuf,
    pub figure: PathBuf,
    pub series: IvSeries,
    pub scaled: ScaledSeries,
}

impl PlotOutcome {
    pub fn frame(&self) -> Result<DataFrame> {
        series_frame(&self.series, &self.scaled)
    }
}

/// Reads, scales and renders a single file.
pub fn plot_file<C: ChartRenderer + ?Sized>(
    dir: &Path,
    name: &str,
    renderer: &C,
) -> Result<PlotOutcome> {
    let source = dir.join(name);
    let series = read_series(&source)?;
    let scaled = match scale_to_prefix(series.current()) {
        Ok(scaled) => scaled,
        Err(IvError::EmptySeries) => {
            warn!(path = %source.display(), "no data pairs in file");
            return Err(IvError::EmptyFile(source));
        }
        Err(e) => return Err(e),
    };
    let figure = renderer.render(name, &series, &scaled)?;
    info!(
        path = %source.display(),
        samples = series.len(),
        prefix = scaled.label(),
        "plotted"
    );
    Ok(PlotOutcome {
        source,
        figure,
        series,
        scaled,
    })
}

/// Plots files in the given order, stopping at the first failure.
pub fn plot_files<C: ChartRenderer + ?Sized>(
    dir: &Path,
    names: &[String],
    renderer: &C,
) -> Result<Vec<PlotOutcome>> {
    names
        .iter()
        .map(|name| plot_file(dir, name, renderer))
        .collect()
}

/// Runs one full session: directory, mode, files, then plotting.
pub fn run_session<S, C>(selector: &mut S, renderer: &C) -> Result<Vec<PlotOutcome>>
where
    S: DirectorySelector + ModeSelector + FileSelector,
    C: ChartRenderer + ?Sized,
{
    let dir = selector.select_directory()?;
    let mode = selector.select_mode()?;
    let names = selector.select_files(&dir, mode)?;
    plot_files(&dir, &names, renderer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ChartStyle, SvgChartRenderer};
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingRenderer {
        calls: RefCell<Vec<(String, String, Vec<f64>)>>,
    }

    impl ChartRenderer for RecordingRenderer {
        fn render(&self, name: &str, _series: &IvSeries, scaled: &ScaledSeries) -> Result<PathBuf> {
            self.calls
                .borrow_mut()
                .push((name.to_string(), scaled.label().to_string(), scaled.values.clone()));
            Ok(PathBuf::from(name))
        }
    }

    #[test]
    fn test_plot_file_scales_current() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "V I\n0 1000\n1 2000\n2 3000\n").unwrap();
        let renderer = RecordingRenderer::default();
        let outcome = plot_file(tmp.path(), "a.txt", &renderer).unwrap();
        assert_eq!(outcome.series.bias(), &[0.0, 1.0, 2.0]);
        assert_eq!(outcome.scaled.label(), "k");
        let calls = renderer.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "a.txt");
        assert_eq!(calls[0].1, "k");
    }

    #[test]
    fn test_empty_file_names_the_path() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("empty.txt"), "header only\nnot numbers\n").unwrap();
        let renderer = RecordingRenderer::default();
        match plot_file(tmp.path(), "empty.txt", &renderer) {
            Err(IvError::EmptyFile(p)) => assert_eq!(p, tmp.path().join("empty.txt")),
            other => panic!("unexpected: {:?}", other.map(|o| o.figure)),
        }
        assert!(renderer.calls.borrow().is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let renderer = RecordingRenderer::default();
        assert!(matches!(
            plot_file(tmp.path(), "nope.txt", &renderer),
            Err(IvError::IoError(_))
        ));
    }

    #[test]
    fn test_plot_files_stops_at_first_failure() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "h\n0 1\n").unwrap();
        fs::write(tmp.path().join("b.txt"), "h\n").unwrap();
        fs::write(tmp.path().join("c.txt"), "h\n0 1\n").unwrap();
        let renderer = RecordingRenderer::default();
        let names: Vec<String> = ["a.txt", "b.txt", "c.txt"].iter().map(|s| s.to_string()).collect();
        assert!(plot_files(tmp.path(), &names, &renderer).is_err());
        assert_eq!(renderer.calls.borrow().len(), 1);
    }

    #[test]
    fn test_plot_file_with_svg_renderer() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("sweep.dat"), "Bias Current\n-1 -1e-9\n0 0\n1 2e-9\n").unwrap();
        let out = tmp.path().join("figures");
        let renderer = SvgChartRenderer::new(&out, ChartStyle::default());
        let outcome = plot_file(tmp.path(), "sweep.dat", &renderer).unwrap();
        assert_eq!(outcome.figure, out.join("sweep.svg"));
        assert!(outcome.figure.is_file());
        assert_eq!(outcome.frame().unwrap().height(), 3);
    }
}
