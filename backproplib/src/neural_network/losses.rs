use super::prelude::*;

#[inline]
/// `(actual - expected)^2`
pub fn squared_error<F: Float>(actual: F, expected: F) -> F {
    (actual - expected).powi(2)
}

#[inline]
/// `2 * (actual - expected)`
pub fn squared_error_derivative<F: Float>(actual: F, expected: F) -> F {
    F::TWO * (actual - expected)
}

#[inline]
/// Average of the given per-unit errors, `0` for an empty slice.
pub fn mean<F: Float>(values: &[F]) -> F {
    if values.is_empty() {
        return F::ZERO;
    }

    values.iter().fold(F::ZERO, |sum, value| sum + *value) / F::from_usize(values.len())
}

#[test]
fn test_squared_error() {
    assert_eq!(squared_error(0.75_f64, 0.25), 0.25);
    assert_eq!(squared_error(0.25_f64, 0.75), 0.25);
    assert_eq!(squared_error(0.5_f32, 0.5), 0.0);

    assert_eq!(squared_error_derivative(0.75_f64, 0.25), 1.0);
    assert_eq!(squared_error_derivative(0.25_f64, 0.75), -1.0);

    assert_eq!(mean::<f64>(&[]), 0.0);
    assert_eq!(mean(&[1.0_f64, 2.0, 3.0]), 2.0);
}
