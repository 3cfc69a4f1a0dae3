use thiserror::Error;

/// Errors raised by the photometric computations.
///
/// File and directory handling reports through `anyhow` instead (see
/// [`crate::data::loader`]); these variants convert into it with `?`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhotometryError {
    /// Wavelength outside the validity range of an extinction law.
    #[error("{law} law not defined for wavelength {wavelength} Å (valid range {min:.2}..{max:.2} Å)")]
    Domain {
        law: &'static str,
        wavelength: f64,
        min: f64,
        max: f64,
    },

    #[error("Bandpass and spectrum must completely overlap (bandpass {band_min}..{band_max} Å, spectrum {spec_min}..{spec_max} Å)")]
    Overlap {
        band_min: f64,
        band_max: f64,
        spec_min: f64,
        spec_max: f64,
    },

    #[error("Unknown type of smoothing: '{0}'")]
    UnknownSmoothing(String),

    #[error("Invalid magnitude system: '{0}' (expected Vega, AB or ST)")]
    InvalidSystem(String),

    #[error("Unknown extinction law: '{0}'")]
    UnknownLaw(String),

    #[error("Invalid curve: {0}")]
    InvalidCurve(String),

    /// The object was constructed from a source that could not be found.
    #[error("{0} has no data loaded")]
    NotLoaded(String),

    #[error("No reference standard spectrum installed")]
    NoReferenceStandard,

    #[error("A reference standard spectrum is already installed")]
    ReferenceAlreadyInstalled,
}
