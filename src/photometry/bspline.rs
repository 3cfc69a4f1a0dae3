//! Interpolating B-splines of degree 2 and 3.
//!
//! Knot placement follows the usual "not-a-knot" style choices:
//!
//! ```text
//! degree 2:  x₀ x₀ x₀ | (x₁+x₂)/2 … (xₙ₋₃+xₙ₋₂)/2 | xₙ₋₁ xₙ₋₁ xₙ₋₁
//! degree 3:  x₀ x₀ x₀ x₀ | x₂ … xₙ₋₃ | xₙ₋₁ xₙ₋₁ xₙ₋₁ xₙ₋₁
//! ```
//!
//! so there are exactly as many coefficients as samples. The coefficients come
//! from the banded collocation system `Σ cⱼ Bⱼ(xᵢ) = yᵢ`.

use crate::error::PhotometryError;

#[derive(Debug, Clone)]
pub struct BSpline {
    degree: usize,
    knots: Vec<f64>,
    coeffs: Vec<f64>,
}

impl BSpline {
    /// Fit the spline of `degree` (2 or 3) through `(x, y)`.
    ///
    /// `x` must be strictly increasing with more than `degree` samples.
    pub fn interpolate(x: &[f64], y: &[f64], degree: usize) -> Result<Self, PhotometryError> {
        let n = x.len();
        if !(2..=3).contains(&degree) || n <= degree || y.len() != n {
            return Err(PhotometryError::InvalidCurve(format!(
                "cannot fit a degree {degree} spline through {n} samples"
            )));
        }
        let knots = knot_vector(x, degree);

        // Row i holds columns i-degree ..= i+degree.
        let bw = degree;
        let mut band = vec![vec![0.0; 2 * bw + 1]; n];
        for (i, &xi) in x.iter().enumerate() {
            let span = find_span(&knots, degree, n, xi);
            for (r, b) in basis(&knots, degree, span, xi).into_iter().enumerate() {
                let j = span - degree + r;
                band[i][j + bw - i] = b;
            }
        }

        let coeffs = solve_banded(band, y.to_vec(), bw)?;
        Ok(Self {
            degree,
            knots,
            coeffs,
        })
    }

    /// Evaluate inside `[x₀, xₙ₋₁]`. Outside it the end polynomials are extended.
    pub fn at(&self, w: f64) -> f64 {
        let span = find_span(&self.knots, self.degree, self.coeffs.len(), w);
        basis(&self.knots, self.degree, span, w)
            .into_iter()
            .enumerate()
            .map(|(r, b)| b * self.coeffs[span - self.degree + r])
            .sum()
    }
}

fn knot_vector(x: &[f64], degree: usize) -> Vec<f64> {
    let n = x.len();
    let (first, last) = (x[0], x[n - 1]);
    let interior: Vec<f64> = if degree == 2 {
        (1..n - 2).map(|i| (x[i] + x[i + 1]) / 2.0).collect()
    } else {
        x[2..n - 2].to_vec()
    };

    let mut knots = vec![first; degree + 1];
    knots.extend(interior);
    knots.extend(std::iter::repeat(last).take(degree + 1));
    knots
}

/// Index `s` with `knots[s] <= w < knots[s + 1]`, clamped to the spans that
/// carry the `n` basis functions.
fn find_span(knots: &[f64], degree: usize, n: usize, w: f64) -> usize {
    knots
        .partition_point(|&k| k <= w)
        .saturating_sub(1)
        .clamp(degree, n - 1)
}

/// The `degree + 1` basis functions that are non-zero on `span`, evaluated
/// at `w` with the Cox–de Boor recurrence.
fn basis(knots: &[f64], degree: usize, span: usize, w: f64) -> Vec<f64> {
    let mut values = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    values[0] = 1.0;

    for j in 1..=degree {
        left[j] = w - knots[span + 1 - j];
        right[j] = knots[span + j] - w;
        let mut saved = 0.0;
        for r in 0..j {
            let tmp = values[r] / (right[r + 1] + left[j - r]);
            values[r] = saved + right[r + 1] * tmp;
            saved = left[j - r] * tmp;
        }
        values[j] = saved;
    }
    values
}

/// Gaussian elimination on a band matrix stored row-wise, `band[i][j + bw - i]`
/// holding entry `(i, j)`. Collocation matrices are totally positive, so no
/// pivoting is needed.
fn solve_banded(
    mut band: Vec<Vec<f64>>,
    mut rhs: Vec<f64>,
    bw: usize,
) -> Result<Vec<f64>, PhotometryError> {
    let n = rhs.len();

    for k in 0..n {
        let pivot = band[k][bw];
        if pivot == 0.0 || !pivot.is_finite() {
            return Err(PhotometryError::InvalidCurve(format!(
                "singular spline system at sample {k}"
            )));
        }
        for i in k + 1..n.min(k + bw + 1) {
            let factor = band[i][k + bw - i] / pivot;
            if factor == 0.0 {
                continue;
            }
            for j in k..n.min(k + bw + 1) {
                band[i][j + bw - i] -= factor * band[k][j + bw - k];
            }
            rhs[i] -= factor * rhs[k];
        }
    }

    let mut x = vec![0.0; n];
    for k in (0..n).rev() {
        let tail: f64 = (k + 1..n.min(k + bw + 1))
            .map(|j| band[k][j + bw - k] * x[j])
            .sum();
        x[k] = (rhs[k] - tail) / band[k][bw];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_knot_vectors() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(
            knot_vector(&x, 2),
            vec![0.0, 0.0, 0.0, 1.5, 2.5, 4.0, 4.0, 4.0]
        );
        assert_eq!(
            knot_vector(&x, 3),
            vec![0.0, 0.0, 0.0, 0.0, 2.0, 4.0, 4.0, 4.0, 4.0]
        );
    }

    #[test]
    fn test_basis_partition_of_unity() {
        let x = [0.0, 1.0, 2.5, 3.0, 5.0, 6.0];
        for degree in [2, 3] {
            let knots = knot_vector(&x, degree);
            for w in [0.0, 0.3, 2.7, 4.4, 6.0] {
                let span = find_span(&knots, degree, x.len(), w);
                let sum: f64 = basis(&knots, degree, span, w).iter().sum();
                assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_interpolates_samples() {
        let x = [1.0, 2.0, 4.0, 4.5, 7.0, 9.0];
        let y = [0.0, 3.0, -1.0, 2.0, 2.0, 0.5];
        for degree in [2, 3] {
            let spline = BSpline::interpolate(&x, &y, degree).unwrap();
            for (&xi, &yi) in x.iter().zip(&y) {
                assert_relative_eq!(spline.at(xi), yi, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_too_few_samples() {
        assert!(BSpline::interpolate(&[0.0, 1.0], &[0.0, 1.0], 2).is_err());
        assert!(BSpline::interpolate(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0], 3).is_err());
        assert!(BSpline::interpolate(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0], 2).is_ok());
    }
}
