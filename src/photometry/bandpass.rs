use std::path::Path;

use anyhow::Result;

use super::interpolate::{Interpolant, SmoothingKind};
use crate::data::filter::FilterLibrary;
use crate::data::loader::load_curve;
use crate::data::model::Curve;
use crate::error::PhotometryError;
use crate::state;

/// Sampled response plus the interpolant built from it. Kept together so the
/// interpolant is always rebuilt with the curve.
#[derive(Debug, Clone)]
struct Response {
    curve: Curve,
    interpolant: Interpolant,
}

impl Response {
    fn build(curve: Curve, kind: SmoothingKind) -> Result<Self, PhotometryError> {
        let interpolant = Interpolant::new(&curve, kind)?;
        Ok(Self { curve, interpolant })
    }
}

// ---------------------------------------------------------------------------
// Bandpass
// ---------------------------------------------------------------------------

/// A photometric filter: photonic response as a function of wavelength (Å).
///
/// A bandpass whose source could not be found is still constructed, with no
/// response. Computations with it fail with [`PhotometryError::NotLoaded`].
#[derive(Debug, Clone)]
pub struct Bandpass {
    name: Option<String>,
    kind: SmoothingKind,
    response: Option<Response>,
}

impl Bandpass {
    /// Bandpass from an in-memory response curve.
    pub fn new(curve: Curve, kind: SmoothingKind) -> Result<Self, PhotometryError> {
        Ok(Self {
            name: None,
            kind,
            response: Some(Response::build(curve, kind)?),
        })
    }

    /// A bandpass with no response loaded.
    pub fn unloaded(kind: SmoothingKind) -> Self {
        Self {
            name: None,
            kind,
            response: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Open a bandpass by filter name from the process-wide library, or by
    /// path. `smoothing` must name a [`SmoothingKind`].
    pub fn open(band: &str, smoothing: &str) -> Result<Self> {
        let kind: SmoothingKind = smoothing.parse()?;
        let library = state::filter_library();
        Self::open_in(band, kind, &library)
    }

    /// [`Bandpass::open`] with the configured default smoothing.
    pub fn open_default(band: &str) -> Result<Self> {
        let kind = state::default_smoothing();
        let library = state::filter_library();
        Self::open_in(band, kind, &library)
    }

    /// Open a bandpass by filter name from `library`, falling back to a path.
    ///
    /// When neither exists a warning is logged and an unloaded bandpass is
    /// returned. A file that exists but cannot be parsed is an error.
    pub fn open_in(band: &str, kind: SmoothingKind, library: &FilterLibrary) -> Result<Self> {
        if let Some(path) = library.resolve(band) {
            return Self::from_file(path, kind);
        }
        let path = Path::new(band);
        if path.is_file() {
            return Self::from_file(path, kind);
        }
        log::warn!("Could not find filter or file {band}");
        Ok(Self::unloaded(kind))
    }

    /// Load a response file; the bandpass is named after the file stem.
    pub fn from_file(path: &Path, kind: SmoothingKind) -> Result<Self> {
        let curve = load_curve(path)?;
        let mut band = Self::new(curve, kind)?;
        band.name = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        Ok(band)
    }

    /// Replace the response curve and rebuild the interpolant.
    pub fn load(&mut self, curve: Curve) -> Result<(), PhotometryError> {
        self.response = Some(Response::build(curve, self.kind)?);
        Ok(())
    }

    /// Rebuild the interpolant with a different smoothing kind.
    pub fn smooth(&mut self, kind: SmoothingKind) -> Result<(), PhotometryError> {
        if let Some(response) = self.response.take() {
            self.response = Some(Response::build(response.curve, kind)?);
        }
        self.kind = kind;
        Ok(())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name for messages.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed bandpass>")
    }

    pub fn kind(&self) -> SmoothingKind {
        self.kind
    }

    pub fn is_loaded(&self) -> bool {
        self.response.is_some()
    }

    /// The sampled response curve.
    pub fn curve(&self) -> Result<&Curve, PhotometryError> {
        self.loaded().map(|r| &r.curve)
    }

    /// Sampled wavelength domain `(min, max)`.
    pub fn domain(&self) -> Result<(f64, f64), PhotometryError> {
        self.loaded().map(|r| r.curve.domain())
    }

    /// Response at each wavelength; exactly `0.0` outside the sampled domain.
    pub fn evaluate(&self, wavelengths: &[f64]) -> Result<Vec<f64>, PhotometryError> {
        self.loaded().map(|r| r.interpolant.evaluate(wavelengths))
    }

    pub fn at(&self, wavelength: f64) -> Result<f64, PhotometryError> {
        self.loaded().map(|r| r.interpolant.at(wavelength))
    }

    fn loaded(&self) -> Result<&Response, PhotometryError> {
        self.response
            .as_ref()
            .ok_or_else(|| PhotometryError::NotLoaded(format!("bandpass {}", self.label())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::save_ascii;
    use approx::assert_relative_eq;
    use tempfile::TempDir;

    fn triangle() -> Curve {
        Curve::new(vec![5000.0, 5500.0, 6000.0], vec![0.0, 1.0, 0.0]).unwrap()
    }

    #[test]
    fn test_evaluate_zero_outside_domain() {
        let band = Bandpass::new(triangle(), SmoothingKind::Cubic).unwrap();
        let out = band.evaluate(&[4000.0, 4999.0, 5500.0, 6001.0, 9000.0]).unwrap();
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 0.0);
        assert_relative_eq!(out[2], 1.0, epsilon = 1e-12);
        assert_eq!(out[3], 0.0);
        assert_eq!(out[4], 0.0);
    }

    #[test]
    fn test_load_rebuilds_interpolant() {
        let mut band = Bandpass::new(triangle(), SmoothingKind::Linear).unwrap();
        band.load(Curve::new(vec![7000.0, 8000.0], vec![2.0, 2.0]).unwrap())
            .unwrap();
        assert_eq!(band.domain().unwrap(), (7000.0, 8000.0));
        assert_eq!(band.at(5500.0).unwrap(), 0.0);
        assert_eq!(band.at(7500.0).unwrap(), 2.0);
    }

    #[test]
    fn test_smooth_changes_kind() {
        let mut band = Bandpass::new(triangle(), SmoothingKind::Linear).unwrap();
        assert_eq!(band.at(5250.0).unwrap(), 0.5);
        band.smooth(SmoothingKind::Zero).unwrap();
        assert_eq!(band.kind(), SmoothingKind::Zero);
        assert_eq!(band.at(5250.0).unwrap(), 0.0);
    }

    #[test]
    fn test_unloaded_bandpass() {
        let mut band = Bandpass::unloaded(SmoothingKind::SLinear);
        assert!(!band.is_loaded());
        assert!(matches!(band.evaluate(&[5000.0]), Err(PhotometryError::NotLoaded(_))));
        assert!(matches!(band.domain(), Err(PhotometryError::NotLoaded(_))));
        band.smooth(SmoothingKind::Cubic).unwrap();
        assert_eq!(band.kind(), SmoothingKind::Cubic);
    }

    #[test]
    fn test_open_unknown_smoothing() {
        let err = Bandpass::open("V", "bspline").unwrap_err();
        assert_eq!(
            err.downcast_ref::<PhotometryError>(),
            Some(&PhotometryError::UnknownSmoothing("bspline".to_string()))
        );
    }

    #[test]
    fn test_open_from_library_and_path() {
        let dir = TempDir::new().unwrap();
        let sys = dir.path().join("Bessell");
        std::fs::create_dir_all(&sys).unwrap();
        save_ascii(&sys.join("V.dat"), &triangle()).unwrap();
        let library = FilterLibrary::scan(dir.path()).unwrap();

        let v = Bandpass::open_in("V", SmoothingKind::Linear, &library).unwrap();
        assert_eq!(v.name(), Some("V"));
        assert!(v.is_loaded());

        let path = sys.join("V.dat");
        let by_path =
            Bandpass::open_in(path.to_str().unwrap(), SmoothingKind::Linear, &FilterLibrary::empty())
                .unwrap();
        assert_eq!(by_path.curve().unwrap(), v.curve().unwrap());
    }

    #[test]
    fn test_open_missing_is_unloaded() {
        let band =
            Bandpass::open_in("no-such-filter", SmoothingKind::Linear, &FilterLibrary::empty())
                .unwrap();
        assert!(!band.is_loaded());
    }

    #[test]
    fn test_open_unparseable_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.dat");
        std::fs::write(&path, "5000\n6000\n").unwrap();
        assert!(Bandpass::from_file(&path, SmoothingKind::Linear).is_err());
    }
}
