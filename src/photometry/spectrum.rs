use std::path::Path;

use anyhow::Result;

use super::bandpass::Bandpass;
use super::engine::{self, MagnitudeSystem};
use super::extinction::{ExtinctionLaw, ExtinctionParams, Law};
use crate::data::loader::{ColumnNames, Samples, load_samples};
use crate::data::model::Curve;
use crate::error::PhotometryError;
use crate::state;

// ---------------------------------------------------------------------------
// Spectrum
// ---------------------------------------------------------------------------

/// Flux density (erg cm⁻² s⁻¹ Å⁻¹) of a source as a function of wavelength (Å).
///
/// A spectrum opened from a missing file is constructed without data, and one
/// read from a single-column file has flux but no wavelength grid until
/// [`Spectrum::set_wavelength`] is called. Every computation on either fails
/// with [`PhotometryError::NotLoaded`].
#[derive(Debug, Clone, Default)]
pub struct Spectrum {
    name: Option<String>,
    samples: Option<Samples>,
}

impl Spectrum {
    pub fn new(curve: Curve) -> Self {
        Self {
            name: None,
            samples: Some(Samples::Curve(curve)),
        }
    }

    pub fn from_arrays(wavelength: Vec<f64>, flux: Vec<f64>) -> Result<Self, PhotometryError> {
        Ok(Self::new(Curve::new(wavelength, flux)?))
    }

    /// A spectrum with no data.
    pub fn unloaded() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Load a spectrum file using `Wavelength` / `Flux` for tabular formats.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, &ColumnNames::default())
    }

    /// Load a spectrum file with explicit column names.
    ///
    /// A missing file logs a warning and yields an unloaded spectrum.
    pub fn open_with(path: &Path, columns: &ColumnNames) -> Result<Self> {
        let name = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        if !path.is_file() {
            log::warn!("Could not find file {} - no spectrum loaded", path.display());
            return Ok(Self { name, samples: None });
        }
        let samples = load_samples(path, columns)?;
        if let Samples::FluxOnly(_) = samples {
            log::info!("{} holds flux only; set the wavelengths before use", path.display());
        }
        Ok(Self {
            name,
            samples: Some(samples),
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// True once both flux and wavelengths are present.
    pub fn is_loaded(&self) -> bool {
        matches!(self.samples, Some(Samples::Curve(_)))
    }

    pub fn curve(&self) -> Result<&Curve, PhotometryError> {
        match &self.samples {
            Some(Samples::Curve(curve)) => Ok(curve),
            Some(Samples::FluxOnly(_)) => Err(self.not_loaded("has no wavelength grid")),
            None => Err(self.not_loaded("has no data")),
        }
    }

    /// Wavelengths in Å; empty when unset.
    pub fn wavelength(&self) -> &[f64] {
        match &self.samples {
            Some(Samples::Curve(curve)) => curve.wavelength(),
            _ => &[],
        }
    }

    /// Flux densities; empty when unloaded.
    pub fn flux(&self) -> &[f64] {
        match &self.samples {
            Some(Samples::Curve(curve)) => curve.value(),
            Some(Samples::FluxOnly(flux)) => flux.as_slice(),
            None => &[],
        }
    }

    /// Replace the flux. With a wavelength grid the length must match it;
    /// without one the flux is stored as is.
    pub fn set_flux(&mut self, flux: Vec<f64>) -> Result<(), PhotometryError> {
        match &mut self.samples {
            Some(Samples::Curve(curve)) => curve.set_value(flux),
            slot => {
                *slot = Some(Samples::FluxOnly(flux));
                Ok(())
            }
        }
    }

    /// Replace the wavelength grid, keeping the flux sample for sample.
    /// Samples are reordered if `wavelength` is not ascending.
    pub fn set_wavelength(&mut self, wavelength: Vec<f64>) -> Result<(), PhotometryError> {
        let flux = match &self.samples {
            Some(Samples::Curve(curve)) => curve.value().to_vec(),
            Some(Samples::FluxOnly(flux)) => flux.clone(),
            None => return Err(self.not_loaded("has no flux")),
        };
        self.samples = Some(Samples::Curve(Curve::from_unsorted(wavelength, flux)?));
        Ok(())
    }

    /// Scale the flux by `theta²`, the dilution factor (R/d)² of a star of
    /// radius R at distance d. `theta` is not validated.
    pub fn reflux(&mut self, theta: f64) {
        let scale = theta.powi(2);
        let flux = match self.samples.as_mut() {
            Some(Samples::Curve(curve)) => curve.value_mut(),
            Some(Samples::FluxOnly(flux)) => flux.as_mut_slice(),
            None => {
                log::debug!("reflux on an unloaded spectrum ignored");
                return;
            }
        };
        flux.iter_mut().for_each(|f| *f *= scale);
    }

    /// Apparent magnitude through `band`.
    ///
    /// The Vega system compares against the process-wide reference standard
    /// (see [`state::install_reference_standard`]) and adds `zero_point`.
    pub fn apparent_magnitude(
        &self,
        band: &Bandpass,
        system: MagnitudeSystem,
        zero_point: f64,
    ) -> Result<f64, PhotometryError> {
        let reference = match system {
            MagnitudeSystem::Vega => Some(state::reference_standard()?.curve()?),
            _ => None,
        };
        engine::apparent_magnitude(self.curve()?, band, system, zero_point, reference)
    }

    /// Apparent magnitude with an explicit reference spectrum for the Vega system.
    pub fn apparent_magnitude_against(
        &self,
        band: &Bandpass,
        system: MagnitudeSystem,
        zero_point: f64,
        reference: &Spectrum,
    ) -> Result<f64, PhotometryError> {
        engine::apparent_magnitude(
            self.curve()?,
            band,
            system,
            zero_point,
            Some(reference.curve()?),
        )
    }

    /// Extinction in `band` under the law registered as `law`.
    pub fn extinction(
        &self,
        band: &Bandpass,
        law: &str,
        params: &ExtinctionParams,
    ) -> Result<f64, PhotometryError> {
        let law: Law = law.parse()?;
        self.extinction_with(band, &law, params)
    }

    /// Extinction in `band` under any [`ExtinctionLaw`].
    pub fn extinction_with(
        &self,
        band: &Bandpass,
        law: &dyn ExtinctionLaw,
        params: &ExtinctionParams,
    ) -> Result<f64, PhotometryError> {
        engine::extinction(self.curve()?, band, law, params)
    }

    fn not_loaded(&self, what: &str) -> PhotometryError {
        PhotometryError::NotLoaded(format!(
            "spectrum {} {what}",
            self.name.as_deref().unwrap_or("<unnamed>")
        ))
    }
}
