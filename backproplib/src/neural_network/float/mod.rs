use std::ops::*;

mod f32;
mod f64;

/// Generic float numbers representation.
///
/// Every weight, bias, input and gradient of the network is stored
/// in this type, so it must cover at least the `[-1.0, 1.0]` range
/// with enough precision for the backward propagation updates.
pub trait Float:
    Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + Div<Output = Self> +
    AddAssign + SubAssign + MulAssign + DivAssign + Neg<Output = Self> +
    Default + Clone + Copy + PartialEq + PartialOrd + std::fmt::Debug + std::fmt::Display + Sized
{
    /// Constant equal to `Self::from_f64(0.0)`.
    const ZERO: Self;

    /// Constant equal to `Self::from_f64(1.0)`.
    const ONE: Self;

    /// Constant equal to `Self::from_f64(2.0)`.
    const TWO: Self;

    /// Represent current float as machine f64 (double precision).
    fn as_f64(&self) -> f64;

    /// Convert machine f64 to the current float type.
    fn from_f64(float: f64) -> Self;

    #[inline]
    /// Convert `usize` value (e.g. a vector length) to the current float type.
    fn from_usize(value: usize) -> Self {
        Self::from_f64(value as f64)
    }

    /// Computes the absolute value of self.
    fn abs(&self) -> Self {
        Self::from_f64(self.as_f64().abs())
    }

    /// Raises a number to an integer power.
    fn powi(&self, n: i32) -> Self {
        Self::from_f64(self.as_f64().powi(n))
    }

    /// Calculate `e^(self)`.
    fn exp(&self) -> Self {
        Self::from_f64(self.as_f64().exp())
    }
}
