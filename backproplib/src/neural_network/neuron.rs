use super::prelude::*;

/// Generic `Neuron` type with f32 float type.
pub type Neuron32 = Neuron<f32>;

/// Generic `Neuron` type with f64 float type.
pub type Neuron64 = Neuron<f64>;

#[derive(Debug, Clone, PartialEq)]
/// Single neuron representation.
///
/// Neurons have one weight per input, single float bias and an
/// activation function. When input is given neuron sums multiplications
/// of weights and input numbers, adds a bias and uses activation function
/// on the sum to generate single float output. The input and output of the
/// latest forward pass are remembered because backward propagation needs
/// them to update the weights and bias.
///
/// ```
/// use backproplib::prelude::*;
///
/// let mut neuron = Neuron64::new(vec![0.5, -1.0], 0.25, Activation::Identity);
///
/// // 0.25 + 2.0 * 0.5 - 1.0 * 1.0
/// assert_eq!(neuron.forward(&[2.0, 1.0]).unwrap(), 0.25);
///
/// // Move output towards 1.0.
/// for _ in 0..100 {
///     let output = neuron.forward(&[2.0, 1.0]).unwrap();
///
///     neuron.backward(squared_error_derivative(output, 1.0), 0.05).unwrap();
/// }
///
/// assert!((neuron.forward(&[2.0, 1.0]).unwrap() - 1.0).abs() < 0.01);
/// ```
pub struct Neuron<F: Float> {
    /// Weights for the neuron inputs.
    weights: Vec<F>,

    /// Value added to the weighted input sum.
    bias: F,

    /// Activation function.
    activation: Activation,

    /// Input of the latest forward pass.
    latest_input: Vec<F>,

    /// Activated output of the latest forward pass.
    latest_output: F
}

impl<F: Float> Neuron<F> {
    /// Construct new neuron with given weights, bias and activation function.
    pub fn new(weights: Vec<F>, bias: F, activation: Activation) -> Self {
        Self {
            weights,
            bias,
            activation,
            latest_input: Vec::new(),
            latest_output: F::ZERO
        }
    }

    /// Construct new neuron with `inputs` weights and bias
    /// randomly generated from the `[-1.0, 1.0]` range.
    pub fn random(inputs: usize, activation: Activation, rng: &mut fastrand::Rng) -> Self {
        let bias = F::from_f64(rng.f64() * 2.0 - 1.0);

        let weights = (0..inputs)
            .map(|_| F::from_f64(rng.f64() * 2.0 - 1.0))
            .collect();

        Self::new(weights, bias, activation)
    }

    #[inline]
    /// Change weights of the neuron's inputs.
    pub fn with_weights(mut self, weights: Vec<F>) -> Self {
        self.weights = weights;
        self.latest_input.clear();

        self
    }

    #[inline]
    /// Change value added to the weighted sum of the neuron's input.
    pub fn with_bias(mut self, bias: F) -> Self {
        self.bias = bias;

        self
    }

    #[inline]
    pub fn weights(&self) -> &[F] {
        &self.weights
    }

    #[inline]
    pub const fn bias(&self) -> F {
        self.bias
    }

    #[inline]
    pub const fn activation(&self) -> Activation {
        self.activation
    }

    #[inline]
    /// Amount of inputs (and weights) of the neuron.
    pub fn inputs(&self) -> usize {
        self.weights.len()
    }

    #[inline]
    /// Amount of trainable parameters: weights and bias.
    pub fn params(&self) -> usize {
        self.weights.len() + 1
    }

    #[inline]
    pub fn latest_input(&self) -> &[F] {
        &self.latest_input
    }

    #[inline]
    pub const fn latest_output(&self) -> F {
        self.latest_output
    }

    /// Calculate sum of inputs multiplied by appropriate weights
    /// plus the neuron's bias.
    pub fn calc_weighted_input(&self, input: &[F]) -> Result<F, DimensionMismatch> {
        DimensionMismatch::check("neuron inputs", self.weights.len(), input.len())?;

        let sum = input.iter()
            .zip(self.weights.iter())
            .fold(self.bias, |sum, (input, weight)| sum + *input * *weight);

        Ok(sum)
    }

    /// Calculate activated output of the neuron (perform forward propagation).
    ///
    /// Input and output are remembered for the following `Neuron::backward` call.
    pub fn forward(&mut self, input: &[F]) -> Result<F, DimensionMismatch> {
        let output = self.activation.forward(self.calc_weighted_input(input)?);

        self.latest_input.clear();
        self.latest_input.extend_from_slice(input);

        self.latest_output = output;

        Ok(output)
    }

    /// Update weights and bias of the neuron using mean gradient
    /// of the loss with respect to its latest output (perform backward
    /// propagation).
    ///
    /// Returns gradients of the loss with respect to the neuron's inputs
    /// which are used by the previous layer's neurons. They are calculated
    /// from the already updated weights.
    ///
    /// Fails if there was no forward pass since the weights were set.
    pub fn backward(&mut self, output_gradient: F, learn_rate: F) -> Result<Vec<F>, DimensionMismatch> {
        DimensionMismatch::check("neuron latest input", self.weights.len(), self.latest_input.len())?;

        let delta = output_gradient * self.activation.derivative(self.latest_output);

        self.bias -= learn_rate * delta;

        let gradients = self.weights.iter_mut()
            .zip(self.latest_input.iter())
            .map(|(weight, input)| {
                *weight -= learn_rate * *input * delta;

                *weight * delta
            })
            .collect();

        Ok(gradients)
    }
}

impl<F: Float> std::fmt::Display for Neuron<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} neuron: bias = {}, weights = [", self.activation, self.bias)?;

        for (i, weight) in self.weights.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }

            write!(f, "{weight}")?;
        }

        write!(f, "]")
    }
}

#[test]
/// Forward pass must check input length and be deterministic
/// for fixed weights and bias.
fn test_neuron_forward() {
    let mut neuron = Neuron64::new(vec![0.5, -0.25, 1.0], 0.1, Activation::Identity);

    assert_eq!(
        neuron.forward(&[1.0, 2.0]),
        Err(DimensionMismatch::new("neuron inputs", 3, 2))
    );

    assert!(neuron.forward(&[1.0, 2.0, 3.0, 4.0]).is_err());

    let output = neuron.forward(&[1.0, 2.0, 3.0]).unwrap();

    assert_eq!(output, 0.1 + 0.5 - 0.5 + 3.0);
    assert_eq!(neuron.forward(&[1.0, 2.0, 3.0]).unwrap(), output);

    assert_eq!(neuron.latest_input(), &[1.0, 2.0, 3.0]);
    assert_eq!(neuron.latest_output(), output);
}

#[test]
/// Backward pass must update bias and weights with the delta rule and
/// return gradients computed from the updated weights.
fn test_neuron_backward() {
    let mut neuron = Neuron64::new(vec![0.5, -0.5], 0.0, Activation::Sigmoid);

    // Backward without forward pass.
    assert_eq!(
        neuron.backward(1.0, 0.1),
        Err(DimensionMismatch::new("neuron latest input", 2, 0))
    );

    // z = 0.5 - 0.5 = 0 => y = 0.5 => derivative = 0.25
    let output = neuron.forward(&[1.0, 1.0]).unwrap();

    assert_eq!(output, 0.5);

    // delta = 2.0 * 0.25 = 0.5
    let gradients = neuron.backward(2.0, 0.1).unwrap();

    assert!((neuron.bias() + 0.05).abs() < 1e-12);
    assert!((neuron.weights()[0] - 0.45).abs() < 1e-12);
    assert!((neuron.weights()[1] + 0.55).abs() < 1e-12);

    assert_eq!(gradients.len(), 2);
    assert!((gradients[0] - 0.45 * 0.5).abs() < 1e-12);
    assert!((gradients[1] + 0.55 * 0.5).abs() < 1e-12);
}

#[test]
/// Random neurons are reproducible with the same seed
/// and keep parameters within `[-1.0, 1.0]`.
fn test_neuron_random() {
    let a = Neuron32::random(16, Activation::Relu, &mut fastrand::Rng::with_seed(7));
    let b = Neuron32::random(16, Activation::Relu, &mut fastrand::Rng::with_seed(7));

    assert_eq!(a, b);
    assert_eq!(a.inputs(), 16);
    assert_eq!(a.params(), 17);

    assert!((-1.0..=1.0).contains(&a.bias()));
    assert!(a.weights().iter().all(|weight| (-1.0..=1.0).contains(weight)));
}

#[test]
/// Neuron trained alone is supposed to output sum of its inputs.
fn test_neuron_backward_propagation() {
    let mut neuron = Neuron64::random(2, Activation::Identity, &mut fastrand::Rng::with_seed(1));

    let examples = [
        ([0.0, 1.0], 1.0),
        ([2.0, 0.0], 2.0),
        ([1.0, 1.0], 2.0),
        ([2.0, 1.0], 3.0)
    ];

    for _ in 0..1000 {
        for (input, expected) in examples {
            let output = neuron.forward(&input).unwrap();

            neuron.backward(squared_error_derivative(output, expected), 0.03).unwrap();
        }
    }

    let output = neuron.forward(&[3.0, 4.0]).unwrap();

    assert!((output - 7.0).abs() < 0.5);
    assert!((1.0 - neuron.weights()[0]).abs() < 0.1);
    assert!((1.0 - neuron.weights()[1]).abs() < 0.1);
    assert!(neuron.bias().abs() < 0.1);
}
