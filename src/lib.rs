//! Synthetic stellar photometry.
//!
//! Given a stellar flux spectrum and a photometric bandpass response curve,
//! compute apparent magnitudes in the Vega, AB and ST systems and the
//! interstellar extinction suffered in the band.
//!
//! Units: wavelength in Å, flux density in erg cm⁻² s⁻¹ Å⁻¹, so the speed of
//! light is taken in Å s⁻¹.
//!
//! ```no_run
//! use std::path::Path;
//! use synphot::{Bandpass, ExtinctionParams, LibraryConfig, MagnitudeSystem, Spectrum};
//!
//! # fn main() -> anyhow::Result<()> {
//! synphot::state::init(&LibraryConfig::from_env())?;
//!
//! let vega = Spectrum::open(Path::new("alpha_lyr.parquet"))?;
//! let v = Bandpass::open("V", "linear")?;
//! let b = Bandpass::open("B", "linear")?;
//!
//! let mag_v = vega.apparent_magnitude(&v, MagnitudeSystem::Vega, 0.03)?;
//! let params = ExtinctionParams::new(0.5, 3.1);
//! let ebv = vega.extinction(&b, "cardelli", &params)? - vega.extinction(&v, "cardelli", &params)?;
//! println!("V = {mag_v:.3}, E(B-V) = {ebv:.3}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod photometry;
pub mod state;

pub use config::LibraryConfig;
pub use data::filter::FilterLibrary;
pub use data::loader::{ColumnNames, load_curve};
pub use data::model::Curve;
pub use error::PhotometryError;
pub use photometry::bandpass::Bandpass;
pub use photometry::engine::MagnitudeSystem;
pub use photometry::extinction::{Cardelli, ExtinctionLaw, ExtinctionParams, Law};
pub use photometry::interpolate::SmoothingKind;
pub use photometry::spectrum::Spectrum;
