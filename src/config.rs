use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{IvError, Result};
use crate::render::ChartStyle;

fn default_config_path() -> PathBuf {
    if let Ok(p) = std::env::var("IVPLOT_CONFIG") {
        return PathBuf::from(p);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config/ivplot/config.toml");
    }
    PathBuf::from(".ivplot/config.toml")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IvPlotConfig {
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Rejected answers tolerated per prompt; unbounded when absent.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub chart: ChartStyle,
}

fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("figures")
}

impl Default for IvPlotConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            output_dir: default_output_dir(),
            max_attempts: None,
            chart: ChartStyle::default(),
        }
    }
}

impl IvPlotConfig {
    pub fn path() -> PathBuf {
        default_config_path()
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).map_err(|e| IvError::config(path, e))?;
        toml::from_str(&s).map_err(|e| IvError::config(path, e))
    }

    /// Loads from `path` if it exists, otherwise returns defaults. A file that
    /// exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load_from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| IvError::config(path, e))?;
        }
        let s = toml::to_string_pretty(self).map_err(|e| IvError::config(path, e))?;
        fs::write(path, s).map_err(|e| IvError::config(path, e))
    }
}
