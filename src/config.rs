use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::normalize::NormalizeOptions;

/// Environment variable naming a JSON settings file.
pub const CONFIG_ENV: &str = "LAB_GRAPH_CONFIG";

/// Runtime settings. Every field has a default, so a partial file is fine:
///
/// ```json
/// { "normalize": { "group_by_header": false }, "fit_grid_points": 400 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub normalize: NormalizeOptions,
    /// Samples per fitted trend curve.
    pub fit_grid_points: usize,
    /// Rows shown in the load preview.
    pub preview_rows: usize,
    /// Folder offered when the user gives none.
    pub data_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            normalize: NormalizeOptions::default(),
            fit_grid_points: 200,
            preview_rows: 5,
            data_dir: None,
        }
    }
}

impl Settings {
    /// Read the file named by `LAB_GRAPH_CONFIG`, or fall back to defaults.
    pub fn load() -> Result<Self> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings {}", path.display()))?;
        let settings: Settings = serde_json::from_str(&text)
            .with_context(|| format!("parsing settings {}", path.display()))?;
        log::debug!("Loaded settings from {}: {settings:?}", path.display());
        Ok(settings)
    }
}
