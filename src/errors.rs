use polars::error::PolarsError;
use std::io::Error as IoError;
use std::path::PathBuf;
use thiserror::Error;

/// Error type shared by the reader, scaler, selectors and renderer.
#[derive(Error, Debug)]
pub enum IvError {
    #[error("IO error: {0}")]
    IoError(#[from] IoError),

    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),

    #[error("Cannot scale an empty series")]
    EmptySeries,

    #[error("No data pairs found in {}", .0.display())]
    EmptyFile(PathBuf),

    #[error("No data found: {0}")]
    NoData(String),

    #[error("Selection cancelled")]
    Cancelled,

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Rendering error: {0}")]
    Render(String),

    #[error("Config error at {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl IvError {
    pub fn config(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        IvError::Config {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// True for errors that end the session without anything going wrong on
    /// disk, such as the operator closing stdin.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, IvError::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, IvError>;
