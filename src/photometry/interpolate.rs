//! Continuous response functions built from sampled curves.
//!
//! Every interpolant evaluates to exactly `0.0` outside the sampled domain;
//! nothing is extrapolated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::bspline::BSpline;
use crate::data::model::Curve;
use crate::error::PhotometryError;

// ---------------------------------------------------------------------------
// SmoothingKind
// ---------------------------------------------------------------------------

/// How a bandpass response is interpolated between samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingKind {
    /// Value of the closest sample; exact midpoints take the lower one.
    Nearest,
    Linear,
    /// Value of the previous sample held until the next one.
    Zero,
    /// First-order spline. Same values as `Linear`.
    #[default]
    SLinear,
    /// Quadratic interpolating B-spline.
    Quadratic,
    /// Cubic interpolating B-spline with not-a-knot ends.
    Cubic,
}

impl SmoothingKind {
    pub const ALL: [SmoothingKind; 6] = [
        SmoothingKind::Nearest,
        SmoothingKind::Linear,
        SmoothingKind::Zero,
        SmoothingKind::SLinear,
        SmoothingKind::Quadratic,
        SmoothingKind::Cubic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SmoothingKind::Nearest => "nearest",
            SmoothingKind::Linear => "linear",
            SmoothingKind::Zero => "zero",
            SmoothingKind::SLinear => "slinear",
            SmoothingKind::Quadratic => "quadratic",
            SmoothingKind::Cubic => "cubic",
        }
    }
}

impl fmt::Display for SmoothingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SmoothingKind {
    type Err = PhotometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SmoothingKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| PhotometryError::UnknownSmoothing(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Interpolant
// ---------------------------------------------------------------------------

/// A continuous function over `[x₀, xₙ]`, zero elsewhere.
#[derive(Debug, Clone)]
pub struct Interpolant {
    kind: SmoothingKind,
    x: Vec<f64>,
    y: Vec<f64>,
    /// Fitted spline for `Quadratic` and `Cubic`. Too few samples for the
    /// requested degree leave it empty and those kinds fall back to linear.
    spline: Option<BSpline>,
}

impl Interpolant {
    /// Build an interpolant over a curve. Wavelengths must be strictly
    /// increasing; repeated samples are rejected.
    pub fn new(curve: &Curve, kind: SmoothingKind) -> Result<Self, PhotometryError> {
        let x = curve.wavelength().to_vec();
        let y = curve.value().to_vec();
        if let Some(i) = x.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(PhotometryError::InvalidCurve(format!(
                "repeated wavelength {} at index {}",
                x[i + 1],
                i + 1
            )));
        }

        let degree = match kind {
            SmoothingKind::Quadratic => 2,
            SmoothingKind::Cubic => 3,
            _ => 0,
        };
        // A cubic through three samples is the parabola through them.
        let degree = degree.min(x.len() - 1);
        let spline = if degree >= 2 {
            Some(BSpline::interpolate(&x, &y, degree)?)
        } else {
            None
        };
        log::debug!("Built {kind} interpolant over {} samples", x.len());

        Ok(Self { kind, x, y, spline })
    }

    pub fn kind(&self) -> SmoothingKind {
        self.kind
    }

    /// Sampled domain `(min, max)`.
    pub fn domain(&self) -> (f64, f64) {
        (self.x[0], self.x[self.x.len() - 1])
    }

    /// Evaluate at one wavelength.
    pub fn at(&self, w: f64) -> f64 {
        let (lo, hi) = self.domain();
        // NaN fails the containment test too.
        if !(lo..=hi).contains(&w) {
            return 0.0;
        }

        if let Some(spline) = &self.spline {
            return spline.at(w);
        }

        let n = self.x.len();
        let i = self.x.partition_point(|&v| v <= w).saturating_sub(1).min(n - 2);
        let (x0, x1) = (self.x[i], self.x[i + 1]);
        let (y0, y1) = (self.y[i], self.y[i + 1]);

        match self.kind {
            SmoothingKind::Nearest => {
                if w - x0 <= x1 - w {
                    y0
                } else {
                    y1
                }
            }
            SmoothingKind::Zero => y0,
            SmoothingKind::Linear
            | SmoothingKind::SLinear
            | SmoothingKind::Quadratic
            | SmoothingKind::Cubic => {
                let t = (w - x0) / (x1 - x0);
                y0 * (1.0 - t) + y1 * t
            }
        }
    }

    /// Evaluate at many wavelengths, preserving order.
    pub fn evaluate(&self, wavelengths: &[f64]) -> Vec<f64> {
        wavelengths.iter().map(|&w| self.at(w)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> Curve {
        Curve::new(
            vec![5000.0, 5250.0, 5500.0, 5750.0, 6000.0],
            vec![0.0, 0.5, 1.0, 0.5, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn test_parse_kinds() {
        for kind in SmoothingKind::ALL {
            assert_eq!(kind.as_str().parse::<SmoothingKind>().unwrap(), kind);
        }
        assert_eq!(
            "spline".parse::<SmoothingKind>(),
            Err(PhotometryError::UnknownSmoothing("spline".to_string()))
        );
        assert_eq!(SmoothingKind::default(), SmoothingKind::SLinear);
    }

    #[test]
    fn test_zero_outside_domain_for_every_kind() {
        let curve = Curve::new(vec![5000.0, 5500.0, 6000.0], vec![2.0, 3.0, 2.0]).unwrap();
        for kind in SmoothingKind::ALL {
            let interp = Interpolant::new(&curve, kind).unwrap();
            for w in [4999.999, 6000.001, -1.0, 1e9, f64::NAN, f64::INFINITY] {
                assert_eq!(interp.at(w), 0.0, "{kind} at {w}");
            }
            assert_relative_eq!(interp.at(5000.0), 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_all_kinds_pass_through_samples() {
        let curve = triangle();
        for kind in SmoothingKind::ALL {
            let interp = Interpolant::new(&curve, kind).unwrap();
            for (&w, &r) in curve.wavelength().iter().zip(curve.value()) {
                // `zero` holds the previous sample on the last interval
                if kind == SmoothingKind::Zero && w == 6000.0 {
                    continue;
                }
                assert_relative_eq!(interp.at(w), r, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_linear_midpoints() {
        let interp = Interpolant::new(&triangle(), SmoothingKind::Linear).unwrap();
        assert_relative_eq!(interp.at(5125.0), 0.25, epsilon = 1e-12);
        assert_relative_eq!(interp.at(5625.0), 0.75, epsilon = 1e-12);
        let slinear = Interpolant::new(&triangle(), SmoothingKind::SLinear).unwrap();
        assert_eq!(interp.at(5400.0), slinear.at(5400.0));
    }

    #[test]
    fn test_nearest_and_zero() {
        let curve = Curve::new(vec![0.0, 10.0, 20.0], vec![1.0, 2.0, 3.0]).unwrap();
        let nearest = Interpolant::new(&curve, SmoothingKind::Nearest).unwrap();
        assert_eq!(nearest.at(4.0), 1.0);
        assert_eq!(nearest.at(5.0), 1.0);
        assert_eq!(nearest.at(6.0), 2.0);

        let zero = Interpolant::new(&curve, SmoothingKind::Zero).unwrap();
        assert_eq!(zero.at(9.99), 1.0);
        assert_eq!(zero.at(10.0), 2.0);
        assert_eq!(zero.at(19.0), 2.0);
    }

    #[test]
    fn test_quadratic_reproduces_parabola() {
        let x: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v * v).collect();
        let interp = Interpolant::new(&Curve::new(x, y).unwrap(), SmoothingKind::Quadratic).unwrap();
        for w in [0.5, 1.25, 2.5, 4.75] {
            assert_relative_eq!(interp.at(w), w * w, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_cubic_reproduces_line() {
        let curve = Curve::new(vec![1.0, 2.0, 4.0, 7.0], vec![3.0, 5.0, 9.0, 15.0]).unwrap();
        let interp = Interpolant::new(&curve, SmoothingKind::Cubic).unwrap();
        for w in [1.5, 3.0, 6.5] {
            assert_relative_eq!(interp.at(w), 2.0 * w + 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_cubic_reproduces_cubic() {
        let x: Vec<f64> = (0..5).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| v * v * v).collect();
        let interp = Interpolant::new(&Curve::new(x, y).unwrap(), SmoothingKind::Cubic).unwrap();
        assert_relative_eq!(interp.at(0.5), 0.125, epsilon = 1e-9);
        assert_relative_eq!(interp.at(1.7), 4.913, epsilon = 1e-9);
        assert_relative_eq!(interp.at(3.5), 42.875, epsilon = 1e-9);
    }

    #[test]
    fn test_three_sample_cubic_is_parabola() {
        let curve = Curve::new(vec![0.0, 1.0, 3.0], vec![1.0, 2.0, 0.0]).unwrap();
        for kind in [SmoothingKind::Quadratic, SmoothingKind::Cubic] {
            let interp = Interpolant::new(&curve, kind).unwrap();
            assert_relative_eq!(interp.at(2.0), 5.0 / 3.0, epsilon = 1e-12);
        }
    }

    /// 21 samples 50 Å apart: three zeros, a flat top of ones, three zeros.
    fn plateau() -> Curve {
        let w: Vec<f64> = (0..21).map(|i| 5000.0 + 50.0 * i as f64).collect();
        let r: Vec<f64> = (0..21)
            .map(|i| if (3..18).contains(&i) { 1.0 } else { 0.0 })
            .collect();
        Curve::new(w, r).unwrap()
    }

    #[test]
    fn test_spline_ringing_on_plateau_is_bounded() {
        let curve = plateau();
        let midpoints: Vec<f64> = curve.wavelength().windows(2).map(|p| (p[0] + p[1]) / 2.0).collect();
        for kind in [SmoothingKind::Quadratic, SmoothingKind::Cubic] {
            let interp = Interpolant::new(&curve, kind).unwrap();
            let values = interp.evaluate(&midpoints);
            for v in &values {
                assert!((-0.15..=1.15).contains(v), "{kind}: {values:?}");
            }
            // Overshoot next to the step dies out towards the middle.
            let near = (values[3] - 1.0).abs();
            let far = (values[7] - 1.0).abs();
            assert!(near > 0.05 && far < near / 10.0, "{kind}: {values:?}");
            assert_relative_eq!(values[10], 1.0, epsilon = 1e-3);
            // Symmetric input, symmetric response.
            assert_relative_eq!(values[2], values[17], epsilon = 1e-9);
        }

        let quadratic = Interpolant::new(&curve, SmoothingKind::Quadratic).unwrap();
        assert_relative_eq!(quadratic.at(5125.0), 0.5004, epsilon = 1e-3);
        assert_relative_eq!(quadratic.at(5175.0), 1.0857, epsilon = 1e-3);
        let cubic = Interpolant::new(&curve, SmoothingKind::Cubic).unwrap();
        assert_relative_eq!(cubic.at(5175.0), 1.0985, epsilon = 1e-3);
    }

    #[test]
    fn test_spline_keeps_gaussian_non_negative() {
        let w: Vec<f64> = (0..=80).map(|i| 4000.0 + 25.0 * i as f64).collect();
        let r: Vec<f64> = w
            .iter()
            .map(|w| (-0.5 * ((w - 5000.0) / 150.0).powi(2)).exp())
            .collect();
        let curve = Curve::new(w, r).unwrap();
        let grid: Vec<f64> = (0..=4000).map(|i| 4000.0 + 0.5 * i as f64).collect();
        for kind in [SmoothingKind::Quadratic, SmoothingKind::Cubic] {
            let values = Interpolant::new(&curve, kind).unwrap().evaluate(&grid);
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert!(min >= 0.0, "{kind} dips to {min}");
            assert!(max <= 1.0 + 1e-9, "{kind} peaks at {max}");
        }
    }

    #[test]
    fn test_two_sample_curves() {
        let curve = Curve::new(vec![1.0, 3.0], vec![0.0, 2.0]).unwrap();
        for kind in [SmoothingKind::Quadratic, SmoothingKind::Cubic, SmoothingKind::Linear] {
            let interp = Interpolant::new(&curve, kind).unwrap();
            assert_relative_eq!(interp.at(2.0), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_repeated_wavelength_rejected() {
        let curve = Curve::new(vec![1.0, 2.0, 2.0, 3.0], vec![0.0, 1.0, 1.0, 0.0]).unwrap();
        assert!(matches!(
            Interpolant::new(&curve, SmoothingKind::Cubic),
            Err(PhotometryError::InvalidCurve(_))
        ));
    }

    #[test]
    fn test_evaluate_preserves_order() {
        let interp = Interpolant::new(&triangle(), SmoothingKind::Linear).unwrap();
        let out = interp.evaluate(&[5500.0, 4000.0, 5250.0]);
        assert_eq!(out, vec![1.0, 0.0, 0.5]);
    }
}
