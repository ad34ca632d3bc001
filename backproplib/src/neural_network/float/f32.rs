use super::Float;

impl Float for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const TWO: Self = 2.0;

    #[inline]
    fn as_f64(&self) -> f64 {
        *self as f64
    }

    #[inline]
    fn from_f64(float: f64) -> Self {
        float as f32
    }

    #[inline]
    fn abs(&self) -> Self {
        f32::abs(*self)
    }

    #[inline]
    fn powi(&self, n: i32) -> Self {
        f32::powi(*self, n)
    }

    #[inline]
    fn exp(&self) -> Self {
        f32::exp(*self)
    }
}
