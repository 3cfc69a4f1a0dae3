//! Library configuration: where filters and the reference standard live.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::ColumnNames;
use crate::photometry::interpolate::SmoothingKind;

/// Environment variable naming the filter library root.
pub const FILTER_DIR_ENV: &str = "SYNPHOT_FILTER_DIR";

/// Environment variable naming the reference standard spectrum file.
pub const REFERENCE_SPECTRUM_ENV: &str = "SYNPHOT_REFERENCE_SPECTRUM";

/// Settings consumed by [`crate::state::init`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Root of the filter library (`<root>/<system>/<filter>.dat`).
    pub filter_dir: Option<PathBuf>,
    /// Spectrum used as the Vega-system reference standard.
    pub reference_spectrum: Option<PathBuf>,
    /// Column names read from tabular spectrum files.
    pub columns: ColumnNames,
    /// Smoothing used for bandpasses opened without an explicit kind.
    pub smoothing: SmoothingKind,
}

impl LibraryConfig {
    /// Read a JSON configuration file. Missing fields take their defaults.
    ///
    /// ```json
    /// { "filter_dir": "data/filters", "reference_spectrum": "data/vega.parquet" }
    /// ```
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Paths from [`FILTER_DIR_ENV`] and [`REFERENCE_SPECTRUM_ENV`]; everything
    /// else defaulted.
    pub fn from_env() -> Self {
        Self {
            filter_dir: std::env::var_os(FILTER_DIR_ENV).map(PathBuf::from),
            reference_spectrum: std::env::var_os(REFERENCE_SPECTRUM_ENV).map(PathBuf::from),
            ..Default::default()
        }
    }
}
