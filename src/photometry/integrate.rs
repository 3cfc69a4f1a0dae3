//! Trapezoidal integration over sampled, possibly non-uniform grids.

/// Integrate `y` over `x` with the trapezoidal rule.
///
/// Grids with fewer than two samples integrate to zero. Only the common
/// prefix is used if the lengths differ.
pub fn trapezoid(y: &[f64], x: &[f64]) -> f64 {
    x.windows(2)
        .zip(y.windows(2))
        .map(|(xs, ys)| (xs[1] - xs[0]) * (ys[1] + ys[0]) / 2.0)
        .sum()
}
