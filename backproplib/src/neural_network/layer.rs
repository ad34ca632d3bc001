use super::prelude::*;

/// Generic `Layer` type with f32 float type.
pub type Layer32 = Layer<f32>;

/// Generic `Layer` type with f64 float type.
pub type Layer64 = Layer<f64>;

#[derive(Debug, Clone, PartialEq)]
/// Group of neurons representation.
///
/// Layers have fixed amount of neurons with same amount
/// of inputs. Layers can connect to each other, when
/// output size of the first layer equals input size
/// of the second layer, and each output of the first layer's
/// neuron is passed to the corresponding input of each neuron
/// of the second layer.
///
/// ```
/// use backproplib::prelude::*;
///
/// let mut rng = fastrand::Rng::with_seed(42);
///
/// // 3 inputs, 2 neurons.
/// let mut layer = Layer64::random(3, 2, Activation::Sigmoid, &mut rng);
///
/// let output = layer.forward(&[0.1, 0.2, 0.3]).unwrap();
///
/// assert_eq!(output.len(), 2);
///
/// // One row of gradients per downstream sample, one value per neuron.
/// let gradients = layer.backward(&[vec![0.5, -0.5]], 0.01).unwrap();
///
/// assert_eq!(gradients.len(), 2);
/// assert!(gradients.iter().all(|row| row.len() == 3));
/// ```
pub struct Layer<F: Float> {
    neurons: Vec<Neuron<F>>,
    inputs: usize
}

impl<F: Float> Layer<F> {
    /// Build neurons layer from provided neurons list.
    ///
    /// Fails if neurons have different amount of weights than `inputs`.
    pub fn from_neurons(inputs: usize, neurons: Vec<Neuron<F>>) -> Result<Self, DimensionMismatch> {
        for neuron in &neurons {
            DimensionMismatch::check("layer neuron weights", inputs, neuron.inputs())?;
        }

        Ok(Self {
            neurons,
            inputs
        })
    }

    /// Build neurons layer from `outputs` randomly generated
    /// neurons with `inputs` weights each.
    pub fn random(inputs: usize, outputs: usize, activation: Activation, rng: &mut fastrand::Rng) -> Self {
        Self {
            neurons: (0..outputs)
                .map(|_| Neuron::random(inputs, activation, rng))
                .collect(),

            inputs
        }
    }

    #[inline]
    /// Return neurons of the current layer in output order.
    pub fn neurons(&self) -> &[Neuron<F>] {
        &self.neurons
    }

    #[inline]
    /// Amount of inputs of every neuron of the layer.
    pub const fn inputs(&self) -> usize {
        self.inputs
    }

    #[inline]
    /// Amount of neurons (outputs) of the layer.
    pub fn outputs(&self) -> usize {
        self.neurons.len()
    }

    #[inline]
    /// Amount of parameters of the current layer.
    pub fn params(&self) -> usize {
        self.neurons.iter().map(Neuron::params).sum()
    }

    /// Calculate activated outputs of the neurons (perform forward propagation).
    pub fn forward(&mut self, inputs: &[F]) -> Result<Vec<F>, DimensionMismatch> {
        DimensionMismatch::check("layer inputs", self.inputs, inputs.len())?;

        self.neurons.iter_mut()
            .map(|neuron| neuron.forward(inputs))
            .collect()
    }

    /// Update weights and biases of the neurons in the current layer
    /// using gradients provided by the next layer.
    ///
    /// `forward_gradients` contains one row per downstream sample, each
    /// row having one gradient per neuron of this layer. Neurons are updated
    /// with the mean of their column. Returned value contains one row per
    /// neuron with gradients for each input of the layer.
    pub fn backward(&mut self, forward_gradients: &[Vec<F>], learn_rate: F) -> Result<Vec<Vec<F>>, DimensionMismatch> {
        if forward_gradients.is_empty() {
            return Err(DimensionMismatch::new("layer gradient rows", 1, 0));
        }

        for row in forward_gradients {
            DimensionMismatch::check("layer output gradients", self.neurons.len(), row.len())?;
        }

        let rows = F::from_usize(forward_gradients.len());

        self.neurons.iter_mut()
            .enumerate()
            .map(|(i, neuron)| {
                let mean_gradient = forward_gradients.iter()
                    .fold(F::ZERO, |sum, row| sum + row[i]) / rows;

                neuron.backward(mean_gradient, learn_rate)
            })
            .collect()
    }
}

impl<F: Float> std::fmt::Display for Layer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "layer: {} inputs, {} neurons", self.inputs, self.neurons.len())?;

        for neuron in &self.neurons {
            writeln!(f, "  {neuron}")?;
        }

        Ok(())
    }
}

#[test]
fn test_layer_dimensions() {
    let mut layer = Layer64::random(3, 4, Activation::Sigmoid, &mut fastrand::Rng::with_seed(3));

    assert_eq!(layer.inputs(), 3);
    assert_eq!(layer.outputs(), 4);
    assert_eq!(layer.params(), 16);

    assert_eq!(
        layer.forward(&[1.0, 2.0]),
        Err(DimensionMismatch::new("layer inputs", 3, 2))
    );

    assert_eq!(layer.forward(&[1.0, 2.0, 3.0]).unwrap().len(), 4);

    // Empty gradients collection.
    assert!(layer.backward(&[], 0.01).is_err());

    // Row of wrong width.
    assert_eq!(
        layer.backward(&[vec![0.1; 4], vec![0.1; 3]], 0.01),
        Err(DimensionMismatch::new("layer output gradients", 4, 3))
    );

    let gradients = layer.backward(&[vec![0.1, 0.2, 0.3, 0.4]], 0.01).unwrap();

    assert_eq!(gradients.len(), 4);
    assert!(gradients.iter().all(|row| row.len() == 3));
}

#[test]
fn test_layer_from_neurons() {
    let neurons = vec![
        Neuron64::new(vec![1.0, 0.0], 0.0, Activation::Identity),
        Neuron64::new(vec![0.0, 1.0], 0.0, Activation::Identity)
    ];

    let mut layer = Layer64::from_neurons(2, neurons.clone()).unwrap();

    assert_eq!(layer.forward(&[0.3, 0.7]).unwrap(), vec![0.3, 0.7]);

    assert_eq!(
        Layer64::from_neurons(3, neurons),
        Err(DimensionMismatch::new("layer neuron weights", 3, 2))
    );
}

#[test]
/// Each neuron must be updated with the mean of its gradients column.
fn test_layer_backward_mean_gradient() {
    let neurons = vec![
        Neuron64::new(vec![1.0], 0.0, Activation::Identity),
        Neuron64::new(vec![1.0], 0.0, Activation::Identity)
    ];

    let mut layer = Layer64::from_neurons(1, neurons).unwrap();

    layer.forward(&[1.0]).unwrap();

    // Means are 2.0 and -1.0.
    let gradients = layer.backward(&[vec![1.0, 0.0], vec![3.0, -2.0]], 0.1).unwrap();

    let [first, second] = layer.neurons() else {
        panic!("layer must have 2 neurons");
    };

    assert!((first.bias() + 0.2).abs() < 1e-12);
    assert!((first.weights()[0] - 0.8).abs() < 1e-12);

    assert!((second.bias() - 0.1).abs() < 1e-12);
    assert!((second.weights()[0] - 1.1).abs() < 1e-12);

    assert!((gradients[0][0] - 0.8 * 2.0).abs() < 1e-12);
    assert!((gradients[1][0] + 1.1).abs() < 1e-12);
}

#[test]
/// Layer should return 1.0 and 0.0 if given number is greater
/// than 0.5 and 0.0 and 1.0 otherwise.
fn test_layer_backward_propagation() {
    let mut layer = Layer64::random(1, 2, Activation::Sigmoid, &mut fastrand::Rng::with_seed(5));

    let examples = [
        (0.5, [1.0, 0.0]),
        (0.1, [0.0, 1.0]),
        (0.6, [1.0, 0.0]),
        (0.2, [0.0, 1.0]),
        (0.7, [1.0, 0.0]),
        (0.3, [0.0, 1.0]),
        (0.8, [1.0, 0.0]),
        (0.4, [0.0, 1.0])
    ];

    for _ in 0..3000 {
        for (input, expected) in examples {
            let output = layer.forward(&[input]).unwrap();

            let gradients = output.iter()
                .zip(expected)
                .map(|(actual, expected)| squared_error_derivative(*actual, expected))
                .collect::<Vec<_>>();

            layer.backward(&[gradients], 0.5).unwrap();
        }
    }

    let output = layer.forward(&[0.23]).unwrap();

    assert!(output[0] < 0.5);
    assert!(output[1] > 0.5);
}
