use super::Float;

impl Float for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const TWO: Self = 2.0;

    #[inline]
    fn as_f64(&self) -> f64 {
        *self
    }

    #[inline]
    fn from_f64(float: f64) -> Self {
        float
    }

    #[inline]
    fn abs(&self) -> Self {
        f64::abs(*self)
    }

    #[inline]
    fn powi(&self, n: i32) -> Self {
        f64::powi(*self, n)
    }

    #[inline]
    fn exp(&self) -> Self {
        f64::exp(*self)
    }
}

#[test]
fn test_float_conversions() {
    assert_eq!(<f64 as Float>::from_f64(0.5), 0.5);
    assert_eq!(<f64 as Float>::from_usize(784), 784.0);
    assert_eq!(<f32 as Float>::from_f64(0.25), 0.25_f32);

    assert_eq!(Float::powi(&-3.0_f64, 2), 9.0);
    assert_eq!(Float::abs(&-0.25_f32), 0.25);
    assert_eq!(Float::exp(&0.0_f64), 1.0);

    assert_eq!(<f32 as Float>::TWO.as_f64(), 2.0);
}
