//! Plot current-voltage sweeps stored as two-column text files.
//!
//! [`reader`] turns a file into an [`IvSeries`], [`scale`] picks an SI prefix
//! for the current, and [`render`] draws linear and logarithmic panels. The
//! interactive front-end lives in [`selection`]; [`pipeline`] ties the pieces
//! together.

pub mod config;
pub mod errors;
pub mod logging;
pub mod pipeline;
pub mod reader;
pub mod render;
pub mod scale;
pub mod selection;
pub mod summary;

pub use config::IvPlotConfig;
pub use errors::{IvError, Result};
pub use pipeline::{plot_file, plot_files, run_session, PlotOutcome};
pub use reader::{parse_series, read_series, IvSeries};
pub use render::{ChartRenderer, ChartStyle, SvgChartRenderer};
pub use scale::{scale_to_prefix, ScaledSeries, SiPrefix};
pub use selection::{
    ConsolePrompter, DirectorySelector, FileSelector, ModeSelector, Presets, SelectionMode,
    WithPresets,
};
