//! Interstellar extinction laws.
//!
//! A law maps wavelengths (Å) to extinction in magnitudes. Laws are looked up
//! by name through [`Law`]; adding one means adding a variant and its
//! [`ExtinctionLaw`] implementation, the photometry engine is untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PhotometryError;

/// Parameters shared by the extinction laws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtinctionParams {
    /// Total extinction in V, A(V), in magnitudes.
    pub a_v: f64,
    /// Ratio of total to selective extinction, R(V) = A(V) / E(B-V).
    pub r_v: f64,
}

impl Default for ExtinctionParams {
    fn default() -> Self {
        Self { a_v: 0.0, r_v: 3.1 }
    }
}

impl ExtinctionParams {
    pub fn new(a_v: f64, r_v: f64) -> Self {
        Self { a_v, r_v }
    }
}

/// A wavelength-dependent extinction curve.
pub trait ExtinctionLaw {
    /// Registry name of the law.
    fn name(&self) -> &'static str;

    /// Extinction in magnitudes at each wavelength (Å), in input order.
    fn extinction(
        &self,
        wavelengths: &[f64],
        params: &ExtinctionParams,
    ) -> Result<Vec<f64>, PhotometryError>;
}

// ---------------------------------------------------------------------------
// Cardelli, Clayton & Mathis (1989)
// ---------------------------------------------------------------------------

/// The Cardelli, Clayton & Mathis (1989) extinction curve, valid from
/// 0.3 µm⁻¹ to 10 µm⁻¹ (1000 Å – 33333 Å).
#[derive(Debug, Clone, Copy, Default)]
pub struct Cardelli;

impl Cardelli {
    const X_MIN: f64 = 0.3;
    const X_MAX: f64 = 10.0;

    /// Coefficients `(a, b)` at inverse wavelength `x` (µm⁻¹).
    fn coefficients(x: f64) -> Option<(f64, f64)> {
        if !(Self::X_MIN..Self::X_MAX).contains(&x) {
            return None;
        }
        let ab = if x < 1.1 {
            // infrared
            let p = x.powf(1.61);
            (0.574 * p, -0.527 * p)
        } else if x < 3.3 {
            // optical / NIR
            let y = x - 1.82;
            let a = 1.0 + 0.17699 * y - 0.50447 * y.powi(2) - 0.02427 * y.powi(3)
                + 0.72085 * y.powi(4)
                + 0.01979 * y.powi(5)
                - 0.77530 * y.powi(6)
                + 0.32999 * y.powi(7);
            let b = 1.41338 * y + 2.28305 * y.powi(2) + 1.07233 * y.powi(3)
                - 5.38434 * y.powi(4)
                - 0.62251 * y.powi(5)
                + 5.30260 * y.powi(6)
                - 2.09002 * y.powi(7);
            (a, b)
        } else if x < 8.0 {
            // UV and far-UV curvature above 5.9
            let (fa, fb) = if x >= 5.9 {
                let d = x - 5.9;
                (
                    -0.04473 * d.powi(2) - 0.009779 * d.powi(3),
                    0.2130 * d.powi(2) - 0.1207 * d.powi(3),
                )
            } else {
                (0.0, 0.0)
            };
            let a = 1.752 - 0.316 * x - 0.104 / ((x - 4.67).powi(2) + 0.341) + fa;
            let b = -3.090 + 1.825 * x + 1.206 / ((x - 4.62).powi(2) + 0.263) + fb;
            (a, b)
        } else {
            // far-UV
            let d = x - 8.0;
            let a = -1.073 - 0.628 * d + 0.137 * d.powi(2) - 0.070 * d.powi(3);
            let b = 13.670 + 4.257 * d - 0.420 * d.powi(2) + 0.374 * d.powi(3);
            (a, b)
        };
        Some(ab)
    }

    /// Extinction at a single wavelength (Å).
    pub fn at(&self, wavelength: f64, params: &ExtinctionParams) -> Result<f64, PhotometryError> {
        let x = 1.0 / (wavelength * 1.0e-4);
        let (a, b) = Self::coefficients(x).ok_or(PhotometryError::Domain {
            law: "cardelli",
            wavelength,
            min: 1.0e4 / Self::X_MAX,
            max: 1.0e4 / Self::X_MIN,
        })?;
        Ok(params.a_v * (a + b / params.r_v))
    }
}

impl ExtinctionLaw for Cardelli {
    fn name(&self) -> &'static str {
        "cardelli"
    }

    fn extinction(
        &self,
        wavelengths: &[f64],
        params: &ExtinctionParams,
    ) -> Result<Vec<f64>, PhotometryError> {
        wavelengths.iter().map(|&w| self.at(w, params)).collect()
    }
}

// ---------------------------------------------------------------------------
// Law registry
// ---------------------------------------------------------------------------

/// The extinction laws available by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Law {
    Cardelli,
}

impl Law {
    pub const ALL: [Law; 1] = [Law::Cardelli];

    /// Names accepted by [`Law::from_str`].
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|law| law.name()).collect()
    }
}

impl ExtinctionLaw for Law {
    fn name(&self) -> &'static str {
        match self {
            Law::Cardelli => Cardelli.name(),
        }
    }

    fn extinction(
        &self,
        wavelengths: &[f64],
        params: &ExtinctionParams,
    ) -> Result<Vec<f64>, PhotometryError> {
        match self {
            Law::Cardelli => Cardelli.extinction(wavelengths, params),
        }
    }
}

impl fmt::Display for Law {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Law {
    type Err = PhotometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Law::ALL
            .into_iter()
            .find(|law| law.name() == s)
            .ok_or_else(|| PhotometryError::UnknownLaw(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const RV: ExtinctionParams = ExtinctionParams { a_v: 1.0, r_v: 3.1 };

    /// Wavelength (Å) at inverse wavelength `x` (µm⁻¹).
    fn wave(x: f64) -> f64 {
        1.0e4 / x
    }

    /// Law evaluated just below and exactly at a region boundary.
    fn around(x: f64) -> (f64, f64) {
        let below = Cardelli.at(wave(x * (1.0 - 1e-12)), &RV).unwrap();
        let above = Cardelli.at(wave(x * (1.0 + 1e-12)), &RV).unwrap();
        (below, above)
    }

    #[test]
    fn test_v_band_is_a_v() {
        // a(x) + b(x)/Rv ≈ 1 at V (x = 1.82, y = 0)
        let ext = Cardelli.at(wave(1.82), &ExtinctionParams::new(0.5, 3.1)).unwrap();
        assert_relative_eq!(ext, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_linear_in_a_v() {
        let waves: Vec<f64> = [0.5, 1.0, 2.0, 3.0, 4.5, 6.5, 9.0].iter().map(|&x| wave(x)).collect();
        let base = Cardelli.extinction(&waves, &RV).unwrap();
        for k in [0.1, 2.0, 7.5] {
            let scaled = Cardelli
                .extinction(&waves, &ExtinctionParams::new(k, 3.1))
                .unwrap();
            for (s, b) in scaled.iter().zip(&base) {
                assert_relative_eq!(*s, k * b, max_relative = 1e-12);
            }
        }
    }

    #[test]
    fn test_boundaries() {
        // The published fits meet to ~1e-3 mag at 1.1 and 3.3 µm⁻¹.
        let (below, above) = around(1.1);
        assert_abs_diff_eq!(below, above, epsilon = 2e-3);
        let (below, above) = around(3.3);
        assert_abs_diff_eq!(below, above, epsilon = 2e-3);

        // The far-UV curvature term vanishes at 5.9 µm⁻¹.
        let (below, above) = around(5.9);
        assert_abs_diff_eq!(below, above, epsilon = 1e-6);

        // The far-UV polynomial is not matched to the UV fit at 8 µm⁻¹.
        let (below, above) = around(8.0);
        assert!(below.is_finite() && above.is_finite());
        assert!(above > below);
    }

    #[test]
    fn test_domain_errors() {
        for w in [40_000.0, 33_400.0, 999.0, 500.0] {
            let err = Cardelli.at(w, &RV).unwrap_err();
            assert!(matches!(err, PhotometryError::Domain { law: "cardelli", .. }), "{w}");
        }
        // One bad wavelength fails the whole evaluation.
        assert!(Cardelli.extinction(&[5000.0, 40_000.0], &RV).is_err());
    }

    #[test]
    fn test_preserves_order() {
        let waves = [9000.0, 3000.0, 5500.0];
        let out = Cardelli.extinction(&waves, &RV).unwrap();
        for (w, e) in waves.iter().zip(&out) {
            assert_eq!(*e, Cardelli.at(*w, &RV).unwrap());
        }
        // Bluer light is more extinguished in the optical.
        assert!(out[1] > out[2] && out[2] > out[0]);
    }

    #[test]
    fn test_registry() {
        assert_eq!(Law::names(), vec!["cardelli"]);
        let law: Law = "cardelli".parse().unwrap();
        assert_eq!(law, Law::Cardelli);
        assert_eq!(
            "foo".parse::<Law>(),
            Err(PhotometryError::UnknownLaw("foo".to_string()))
        );
        let via_registry = law.extinction(&[5000.0], &RV).unwrap();
        assert_eq!(via_registry, Cardelli.extinction(&[5000.0], &RV).unwrap());
    }
}
