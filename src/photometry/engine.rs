//! Magnitude and extinction integrals.
//!
//! Every integral runs on the spectrum's own sampling inside the bandpass
//! domain, weighted by the bandpass response at those wavelengths. Numerator
//! and denominator are integrated separately before dividing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::bandpass::Bandpass;
use super::extinction::{ExtinctionLaw, ExtinctionParams};
use super::integrate::trapezoid;
use crate::data::model::Curve;
use crate::error::PhotometryError;

/// Speed of light in Å s⁻¹.
pub const SPEED_OF_LIGHT: f64 = 2.99792458e18;

/// AB magnitude of a source with f_ν = 1 erg cm⁻² s⁻¹ Hz⁻¹.
pub const AB_ZERO_POINT: f64 = -48.60;

/// ST magnitude of a source with f_λ = 1 erg cm⁻² s⁻¹ Å⁻¹.
pub const ST_ZERO_POINT: f64 = -21.10;

// ---------------------------------------------------------------------------
// Magnitude systems
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MagnitudeSystem {
    /// Relative to the reference standard spectrum plus a zero point.
    #[default]
    Vega,
    #[serde(rename = "AB")]
    Ab,
    #[serde(rename = "ST")]
    St,
}

impl MagnitudeSystem {
    pub const ALL: [MagnitudeSystem; 3] =
        [MagnitudeSystem::Vega, MagnitudeSystem::Ab, MagnitudeSystem::St];

    pub fn as_str(&self) -> &'static str {
        match self {
            MagnitudeSystem::Vega => "Vega",
            MagnitudeSystem::Ab => "AB",
            MagnitudeSystem::St => "ST",
        }
    }
}

impl fmt::Display for MagnitudeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MagnitudeSystem {
    type Err = PhotometryError;

    /// Case-insensitive: `"Vega"`, `"AB"`, `"ST"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MagnitudeSystem::ALL
            .into_iter()
            .find(|system| system.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PhotometryError::InvalidSystem(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Overlap resolution
// ---------------------------------------------------------------------------

/// The spectrum samples lying inside a bandpass domain.
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    pub wavelength: &'a [f64],
    pub flux: &'a [f64],
}

impl Window<'_> {
    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }
}

/// Select the samples of `spectrum` within `[band_min, band_max]` inclusive.
///
/// The bandpass domain must lie entirely inside the spectrum domain.
pub fn overlap(band_domain: (f64, f64), spectrum: &Curve) -> Result<Window<'_>, PhotometryError> {
    let (band_min, band_max) = band_domain;
    let (spec_min, spec_max) = spectrum.domain();
    if band_min < spec_min || band_max > spec_max {
        return Err(PhotometryError::Overlap {
            band_min,
            band_max,
            spec_min,
            spec_max,
        });
    }

    let ws = spectrum.wavelength();
    let lo = ws.partition_point(|&w| w < band_min);
    let hi = ws.partition_point(|&w| w <= band_max);
    if hi - lo < 2 {
        log::warn!(
            "Only {} spectrum samples inside bandpass {band_min}..{band_max} Å",
            hi - lo
        );
    }
    log::debug!("Integration grid: {} samples in {band_min}..{band_max} Å", hi - lo);

    Ok(Window {
        wavelength: &ws[lo..hi],
        flux: &spectrum.value()[lo..hi],
    })
}

// ---------------------------------------------------------------------------
// Integrals
// ---------------------------------------------------------------------------

/// ∫ f·R·λ dλ over the window.
fn photon_weighted_flux(window: &Window<'_>, response: &[f64]) -> f64 {
    let integrand: Vec<f64> = window
        .flux
        .iter()
        .zip(response)
        .zip(window.wavelength)
        .map(|((f, r), w)| f * r * w)
        .collect();
    trapezoid(&integrand, window.wavelength)
}

/// Apparent magnitude of `spectrum` through `band`.
///
/// `reference` is the standard spectrum, required only by the Vega system;
/// `zero_point` is added to Vega magnitudes and ignored otherwise.
pub fn apparent_magnitude(
    spectrum: &Curve,
    band: &Bandpass,
    system: MagnitudeSystem,
    zero_point: f64,
    reference: Option<&Curve>,
) -> Result<f64, PhotometryError> {
    let band_domain = band.domain()?;
    let window = overlap(band_domain, spectrum)?;
    let response = band.evaluate(window.wavelength)?;
    let wr = window.wavelength;

    let mag = match system {
        MagnitudeSystem::Ab => {
            let per_hz: Vec<f64> = response
                .iter()
                .zip(wr)
                .map(|(r, w)| r * SPEED_OF_LIGHT / w)
                .collect();
            let ratio = photon_weighted_flux(&window, &response) / trapezoid(&per_hz, wr);
            -2.5 * ratio.log10() + AB_ZERO_POINT
        }
        MagnitudeSystem::St => {
            let weight: Vec<f64> = response.iter().zip(wr).map(|(r, w)| r * w).collect();
            let ratio = photon_weighted_flux(&window, &response) / trapezoid(&weight, wr);
            -2.5 * ratio.log10() + ST_ZERO_POINT
        }
        MagnitudeSystem::Vega => {
            let reference = reference.ok_or(PhotometryError::NoReferenceStandard)?;
            let ref_window = overlap(band_domain, reference)?;
            let ref_response = band.evaluate(ref_window.wavelength)?;

            let num = photon_weighted_flux(&window, &response);
            let den = photon_weighted_flux(&ref_window, &ref_response);
            -2.5 * num.log10() + 2.5 * den.log10() + zero_point
        }
    };
    log::debug!("{system} magnitude through {}: {mag}", band.label());
    Ok(mag)
}

/// Extinction in magnitudes suffered by `spectrum` in `band` under `law`.
pub fn extinction(
    spectrum: &Curve,
    band: &Bandpass,
    law: &dyn ExtinctionLaw,
    params: &ExtinctionParams,
) -> Result<f64, PhotometryError> {
    let window = overlap(band.domain()?, spectrum)?;
    let response = band.evaluate(window.wavelength)?;
    let a_lambda = law.extinction(window.wavelength, params)?;

    let attenuated: Vec<f64> = window
        .flux
        .iter()
        .zip(&response)
        .zip(window.wavelength)
        .zip(&a_lambda)
        .map(|(((f, r), w), a)| f * r * w * 10f64.powf(-0.4 * a))
        .collect();
    let ratio = trapezoid(&attenuated, window.wavelength) / photon_weighted_flux(&window, &response);
    Ok(-2.5 * ratio.log10())
}
