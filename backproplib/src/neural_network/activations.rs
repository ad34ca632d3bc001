use super::prelude::*;

// Derivatives take the activated output `y = f(x)`, not the raw argument `x`.

#[inline]
pub fn identity<F: Float>(x: F) -> F {
    x
}

#[inline]
pub fn identity_derivative<F: Float>(_: F) -> F {
    F::ONE
}

#[inline]
pub fn sigmoid<F: Float>(x: F) -> F {
    F::ONE / (F::ONE + (-x).exp())
}

#[inline]
pub fn sigmoid_derivative<F: Float>(y: F) -> F {
    y * (F::ONE - y)
}

#[inline]
pub fn relu<F: Float>(x: F) -> F {
    if x < F::ZERO { F::ZERO } else { x }
}

#[inline]
pub fn relu_derivative<F: Float>(y: F) -> F {
    if y > F::ZERO { F::ONE } else { F::ZERO }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
/// Activation function bound to a layer at construction time.
pub enum Activation {
    /// `1 / (1 + e^-x)`, derivative `y * (1 - y)`.
    #[default]
    Sigmoid,

    /// `max(0, x)`, derivative `1` for positive outputs and `0` otherwise.
    Relu,

    /// `x`, derivative `1`.
    Identity
}

impl Activation {
    #[inline]
    /// Apply the activation function to the weighted input sum.
    pub fn forward<F: Float>(&self, x: F) -> F {
        match self {
            Self::Sigmoid  => sigmoid(x),
            Self::Relu     => relu(x),
            Self::Identity => identity(x)
        }
    }

    #[inline]
    /// Calculate the activation function derivative from its output.
    pub fn derivative<F: Float>(&self, y: F) -> F {
        match self {
            Self::Sigmoid  => sigmoid_derivative(y),
            Self::Relu     => relu_derivative(y),
            Self::Identity => identity_derivative(y)
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sigmoid  => "sigmoid",
            Self::Relu     => "relu",
            Self::Identity => "identity"
        }
    }
}

impl std::fmt::Display for Activation {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Activation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sigmoid" => Ok(Self::Sigmoid),
            "relu"    => Ok(Self::Relu),

            "identity" | "unity" | "linear" => Ok(Self::Identity),

            other => anyhow::bail!("Unknown activation function: {other}")
        }
    }
}

#[test]
fn test_sigmoid() {
    for x in [-50.0, -3.0, -0.5, 0.0, 0.5, 3.0, 30.0] {
        let y = Activation::Sigmoid.forward::<f64>(x);

        assert!(y > 0.0 && y < 1.0, "sigmoid({x}) = {y}");
    }

    assert_eq!(Activation::Sigmoid.forward(0.0_f64), 0.5);

    assert_eq!(Activation::Sigmoid.derivative(0.5_f64), 0.25);
    assert_eq!(Activation::Sigmoid.derivative(0.0_f64), 0.0);
    assert_eq!(Activation::Sigmoid.derivative(1.0_f64), 0.0);

    for y in [0.1, 0.3, 0.49, 0.51, 0.9] {
        assert!(Activation::Sigmoid.derivative::<f64>(y) < 0.25);
    }
}

#[test]
fn test_identity_and_relu() {
    for x in [-2.5_f32, 0.0, 1.0, 1e6] {
        assert_eq!(Activation::Identity.forward(x), x);
        assert_eq!(Activation::Identity.derivative(x), 1.0);
    }

    assert_eq!(Activation::Relu.forward(-1.5_f64), 0.0);
    assert_eq!(Activation::Relu.forward(1.5_f64), 1.5);

    assert_eq!(Activation::Relu.derivative(0.0_f64), 0.0);
    assert_eq!(Activation::Relu.derivative(2.0_f64), 1.0);
}

#[test]
fn test_activation_names() -> anyhow::Result<()> {
    assert_eq!("Sigmoid".parse::<Activation>()?, Activation::Sigmoid);
    assert_eq!("relu".parse::<Activation>()?, Activation::Relu);
    assert_eq!("unity".parse::<Activation>()?, Activation::Identity);
    assert_eq!(Activation::Identity.to_string().parse::<Activation>()?, Activation::Identity);

    assert!("tanh".parse::<Activation>().is_err());

    Ok(())
}
