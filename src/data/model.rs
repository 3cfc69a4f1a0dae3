use crate::error::PhotometryError;

// ---------------------------------------------------------------------------
// Curve – a sampled wavelength-indexed function
// ---------------------------------------------------------------------------

/// Two parallel sequences: wavelength (Å) and a value per wavelength.
///
/// Spectra store flux density (erg cm⁻² s⁻¹ Å⁻¹) in `value`, bandpasses store
/// a dimensionless photonic response.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    wavelength: Vec<f64>,
    value: Vec<f64>,
}

impl Curve {
    /// Build a curve, checking the invariants the interpolation and overlap
    /// code depend on: equal lengths, at least two samples, finite wavelengths
    /// sorted in ascending order.
    pub fn new(wavelength: Vec<f64>, value: Vec<f64>) -> Result<Self, PhotometryError> {
        if wavelength.len() != value.len() {
            return Err(PhotometryError::InvalidCurve(format!(
                "wavelength has {} values but value has {}",
                wavelength.len(),
                value.len()
            )));
        }
        if wavelength.len() < 2 {
            return Err(PhotometryError::InvalidCurve(format!(
                "need at least 2 samples, got {}",
                wavelength.len()
            )));
        }
        if let Some(i) = wavelength.iter().position(|w| !w.is_finite()) {
            return Err(PhotometryError::InvalidCurve(format!(
                "wavelength[{i}] is not finite"
            )));
        }
        if let Some(i) = wavelength.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(PhotometryError::InvalidCurve(format!(
                "wavelengths not sorted at index {}",
                i + 1
            )));
        }
        Ok(Curve { wavelength, value })
    }

    /// Build a curve from samples in any wavelength order. Pairs are
    /// reordered by ascending wavelength, ties keep their file order.
    pub fn from_unsorted(wavelength: Vec<f64>, value: Vec<f64>) -> Result<Self, PhotometryError> {
        if wavelength.len() != value.len() || wavelength.windows(2).all(|p| p[0] <= p[1]) {
            return Self::new(wavelength, value);
        }
        let mut order: Vec<usize> = (0..wavelength.len()).collect();
        order.sort_by(|&a, &b| wavelength[a].total_cmp(&wavelength[b]));
        let sorted_w = order.iter().map(|&i| wavelength[i]).collect();
        let sorted_v = order.iter().map(|&i| value[i]).collect();
        Self::new(sorted_w, sorted_v)
    }

    pub fn wavelength(&self) -> &[f64] {
        &self.wavelength
    }

    pub fn value(&self) -> &[f64] {
        &self.value
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    /// Always false for a constructed curve; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }

    /// Wavelength domain `(min, max)`.
    pub fn domain(&self) -> (f64, f64) {
        // Sorted, non-empty by construction.
        (self.wavelength[0], self.wavelength[self.wavelength.len() - 1])
    }

    /// Replace the values, keeping the wavelength grid.
    pub fn set_value(&mut self, value: Vec<f64>) -> Result<(), PhotometryError> {
        if value.len() != self.wavelength.len() {
            return Err(PhotometryError::InvalidCurve(format!(
                "expected {} values, got {}",
                self.wavelength.len(),
                value.len()
            )));
        }
        self.value = value;
        Ok(())
    }

    /// Mutable access to the values. Length and grid stay fixed.
    pub fn value_mut(&mut self) -> &mut [f64] {
        &mut self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_curve() {
        let curve = Curve::new(vec![4000.0, 5000.0, 6000.0], vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(curve.len(), 3);
        assert_eq!(curve.domain(), (4000.0, 6000.0));
        assert_eq!(curve.value(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_length_mismatch() {
        let result = Curve::new(vec![4000.0, 5000.0], vec![1.0]);
        assert!(matches!(result, Err(PhotometryError::InvalidCurve(_))));
    }

    #[test]
    fn test_too_short() {
        let result = Curve::new(vec![4000.0], vec![1.0]);
        assert!(matches!(result, Err(PhotometryError::InvalidCurve(_))));
    }

    #[test]
    fn test_unsorted() {
        let result = Curve::new(vec![4000.0, 6000.0, 5000.0], vec![1.0, 1.0, 1.0]);
        assert!(matches!(result, Err(PhotometryError::InvalidCurve(_))));
    }

    #[test]
    fn test_from_unsorted_reorders_pairs() {
        let curve =
            Curve::from_unsorted(vec![6000.0, 5000.0, 4000.0], vec![0.3, 0.2, 0.1]).unwrap();
        assert_eq!(curve.wavelength(), &[4000.0, 5000.0, 6000.0]);
        assert_eq!(curve.value(), &[0.1, 0.2, 0.3]);

        let shuffled =
            Curve::from_unsorted(vec![5000.0, 4000.0, 6000.0], vec![0.2, 0.1, 0.3]).unwrap();
        assert_eq!(shuffled, curve);
    }

    #[test]
    fn test_from_unsorted_still_validates() {
        assert!(Curve::from_unsorted(vec![2.0, 1.0], vec![1.0]).is_err());
        assert!(Curve::from_unsorted(vec![2.0, f64::NAN, 1.0], vec![1.0; 3]).is_err());
    }

    #[test]
    fn test_non_finite_wavelength() {
        let result = Curve::new(vec![4000.0, f64::NAN], vec![1.0, 1.0]);
        assert!(matches!(result, Err(PhotometryError::InvalidCurve(_))));
    }

    #[test]
    fn test_set_value_checks_length() {
        let mut curve = Curve::new(vec![1.0, 2.0], vec![0.0, 0.0]).unwrap();
        assert!(curve.set_value(vec![1.0]).is_err());
        curve.set_value(vec![3.0, 4.0]).unwrap();
        assert_eq!(curve.value(), &[3.0, 4.0]);
    }
}
