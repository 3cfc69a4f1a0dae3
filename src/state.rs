use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use once_cell::sync::{Lazy, OnceCell};
use parking_lot::{RwLock, RwLockReadGuard};

use crate::config::LibraryConfig;
use crate::data::filter::FilterLibrary;
use crate::data::loader::ColumnNames;
use crate::error::PhotometryError;
use crate::photometry::extinction::Law;
use crate::photometry::interpolate::SmoothingKind;
use crate::photometry::spectrum::Spectrum;

// ---------------------------------------------------------------------------
// Process-wide state
// ---------------------------------------------------------------------------
//
// Written by `init` (and `add_filter` for the library), read-only otherwise.
// The reference standard can be installed once and never changes after.

static FILTER_LIBRARY: Lazy<RwLock<FilterLibrary>> =
    Lazy::new(|| RwLock::new(FilterLibrary::empty()));

static DEFAULT_SMOOTHING: Lazy<RwLock<SmoothingKind>> =
    Lazy::new(|| RwLock::new(SmoothingKind::default()));

static REFERENCE_STANDARD: OnceCell<Spectrum> = OnceCell::new();

/// One-time initialisation: scan the filter library and load the reference
/// standard named by `config`.
pub fn init(config: &LibraryConfig) -> Result<()> {
    if let Some(dir) = &config.filter_dir {
        set_filter_library(FilterLibrary::scan(dir)?);
    }
    *DEFAULT_SMOOTHING.write() = config.smoothing;

    if let Some(path) = &config.reference_spectrum {
        load_reference_standard(path, &config.columns)?;
    }
    Ok(())
}

// -- Filter library --

/// Replace the process-wide filter library.
pub fn set_filter_library(library: FilterLibrary) {
    *FILTER_LIBRARY.write() = library;
}

/// Shared read access to the filter library.
pub fn filter_library() -> RwLockReadGuard<'static, FilterLibrary> {
    FILTER_LIBRARY.read()
}

/// Register a response file in the process-wide library.
///
/// The only mutator of the shared library; it blocks readers while it runs.
pub fn add_filter(file: &Path, name: Option<&str>, system: Option<&str>) -> Result<PathBuf> {
    FILTER_LIBRARY.write().add_filter(file, name, system)
}

/// Filter names grouped by photometric system.
pub fn show_filters() -> BTreeMap<String, Vec<String>> {
    filter_library()
        .systems()
        .iter()
        .map(|(system, names)| (system.clone(), names.iter().cloned().collect()))
        .collect()
}

/// Names of the available extinction laws.
pub fn list_laws() -> Vec<&'static str> {
    Law::names()
}

/// Smoothing used by [`crate::photometry::bandpass::Bandpass::open_default`].
pub fn default_smoothing() -> SmoothingKind {
    *DEFAULT_SMOOTHING.read()
}

// -- Reference standard --

/// Install the spectrum used by the Vega magnitude system.
pub fn install_reference_standard(spectrum: Spectrum) -> Result<(), PhotometryError> {
    if !spectrum.is_loaded() {
        return Err(PhotometryError::NotLoaded("reference standard".to_string()));
    }
    REFERENCE_STANDARD
        .set(spectrum)
        .map_err(|_| PhotometryError::ReferenceAlreadyInstalled)?;
    log::info!("Reference standard installed");
    Ok(())
}

/// Load a spectrum file and install it as the reference standard.
pub fn load_reference_standard(path: &Path, columns: &ColumnNames) -> Result<&'static Spectrum> {
    if !path.is_file() {
        bail!("reference standard {} not found", path.display());
    }
    let spectrum = Spectrum::open_with(path, columns)
        .with_context(|| format!("loading reference standard {}", path.display()))?;
    install_reference_standard(spectrum)?;
    reference_standard().map_err(Into::into)
}

/// The installed reference standard.
pub fn reference_standard() -> Result<&'static Spectrum, PhotometryError> {
    REFERENCE_STANDARD
        .get()
        .ok_or(PhotometryError::NoReferenceStandard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_laws() {
        assert_eq!(list_laws(), vec!["cardelli"]);
    }

    #[test]
    fn test_unloaded_reference_rejected() {
        assert_eq!(
            install_reference_standard(Spectrum::unloaded()),
            Err(PhotometryError::NotLoaded("reference standard".to_string()))
        );
    }
}
