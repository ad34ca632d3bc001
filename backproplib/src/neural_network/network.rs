use super::prelude::*;

/// Generic `Network` type with f32 float type.
pub type Network32 = Network<f32>;

/// Generic `Network` type with f64 float type.
pub type Network64 = Network<f64>;

/// Learn rate used when none is given with `Network::with_learn_rate`.
pub const DEFAULT_LEARN_RATE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
/// Feed-forward neural network made of connected dense layers.
///
/// Training is performed sample by sample: `Network::forward` remembers
/// the output, and following `Network::backward` call uses it to compute
/// mean squared error gradients and propagate them from the output layer
/// back to the input one, updating all the weights and biases in place.
///
/// ```
/// use backproplib::prelude::*;
///
/// let mut rng = fastrand::Rng::with_seed(42);
///
/// // 2 inputs, 1 output and a single hidden layer with 2 neurons.
/// let mut network = Network64::random(2, 1, &[2], Activation::Sigmoid, &mut rng)
///     .with_learn_rate(0.1);
///
/// network.forward(&[0.5, -0.3]).unwrap();
///
/// let initial_loss = network.calculate_error(&[0.7]).unwrap()[0];
///
/// for _ in 0..1000 {
///     network.forward(&[0.5, -0.3]).unwrap();
///     network.backward(&[0.7]).unwrap();
/// }
///
/// network.forward(&[0.5, -0.3]).unwrap();
///
/// assert!(network.calculate_error(&[0.7]).unwrap()[0] < initial_loss);
/// ```
pub struct Network<F: Float> {
    layers: Vec<Layer<F>>,
    inputs: usize,
    outputs: usize,
    learn_rate: F,
    last_output: Vec<F>
}

impl<F: Float> Network<F> {
    /// Build network from the list of connected layers, input layer first.
    ///
    /// Fails if the list is empty or neurons amount of some layer
    /// differs from the inputs amount of the following one.
    pub fn from_layers(layers: Vec<Layer<F>>) -> Result<Self, DimensionMismatch> {
        let (Some(first), Some(last)) = (layers.first(), layers.last()) else {
            return Err(DimensionMismatch::new("network layers", 1, 0));
        };

        let inputs = first.inputs();
        let outputs = last.outputs();

        for pair in layers.windows(2) {
            DimensionMismatch::check("network layer inputs", pair[0].outputs(), pair[1].inputs())?;
        }

        Ok(Self {
            layers,
            inputs,
            outputs,
            learn_rate: F::from_f64(DEFAULT_LEARN_RATE),
            last_output: Vec::new()
        })
    }

    /// Build network with randomly initialized layers.
    ///
    /// First layer takes `inputs` values and has `hidden[0]` neurons, every
    /// next hidden layer takes outputs of the previous one, and the final
    /// layer turns the last hidden layer's outputs into `outputs` values.
    /// Without hidden layers the network is a single `inputs -> outputs` layer.
    pub fn random(
        inputs: usize,
        outputs: usize,
        hidden: &[usize],
        activation: Activation,
        rng: &mut fastrand::Rng
    ) -> Self {
        let mut layers = Vec::with_capacity(hidden.len() + 1);
        let mut layer_inputs = inputs;

        for neurons in hidden.iter().copied().chain(std::iter::once(outputs)) {
            layers.push(Layer::random(layer_inputs, neurons, activation, rng));

            layer_inputs = neurons;
        }

        Self {
            layers,
            inputs,
            outputs,
            learn_rate: F::from_f64(DEFAULT_LEARN_RATE),
            last_output: Vec::new()
        }
    }

    #[inline]
    /// Change learn rate used by `Network::backward`.
    pub fn with_learn_rate(mut self, learn_rate: F) -> Self {
        self.learn_rate = learn_rate;

        self
    }

    #[inline]
    pub fn layers(&self) -> &[Layer<F>] {
        &self.layers
    }

    #[inline]
    pub const fn input_size(&self) -> usize {
        self.inputs
    }

    #[inline]
    pub const fn output_size(&self) -> usize {
        self.outputs
    }

    #[inline]
    pub const fn learn_rate(&self) -> F {
        self.learn_rate
    }

    #[inline]
    /// Output of the latest forward pass, empty before the first one.
    pub fn last_output(&self) -> &[F] {
        &self.last_output
    }

    #[inline]
    /// Amount of weights and biases of all the layers.
    pub fn params(&self) -> usize {
        self.layers.iter().map(Layer::params).sum()
    }

    /// Calculate outputs of the network (perform forward propagation).
    ///
    /// Output is remembered for the following `Network::backward`
    /// and `Network::calculate_error` calls.
    pub fn forward(&mut self, input: &[F]) -> Result<Vec<F>, DimensionMismatch> {
        DimensionMismatch::check("network inputs", self.inputs, input.len())?;

        let mut output = input.to_vec();

        for layer in &mut self.layers {
            output = layer.forward(&output)?;
        }

        self.last_output.clone_from(&output);

        Ok(output)
    }

    /// Calculate gradients of the squared error with respect
    /// to each output of the latest forward pass.
    pub fn output_gradients(&self, target: &[F]) -> Result<Vec<F>, DimensionMismatch> {
        DimensionMismatch::check("network target", self.last_output.len(), target.len())?;

        Ok(self.last_output.iter()
            .zip(target)
            .map(|(actual, expected)| squared_error_derivative(*actual, *expected))
            .collect())
    }

    /// Update weights and biases of all the layers so the output
    /// of the latest forward pass moves towards `target`
    /// (perform backward propagation).
    ///
    /// Requires a preceding `Network::forward` call.
    pub fn backward(&mut self, target: &[F]) -> Result<(), DimensionMismatch> {
        DimensionMismatch::check("network target", self.outputs, target.len())?;

        let mut gradients = vec![self.output_gradients(target)?];

        for layer in self.layers.iter_mut().rev() {
            gradients = layer.backward(&gradients, self.learn_rate)?;
        }

        Ok(())
    }

    /// Calculate squared error of each output of the latest forward pass.
    pub fn calculate_error(&self, target: &[F]) -> Result<Vec<F>, DimensionMismatch> {
        DimensionMismatch::check("network target", self.last_output.len(), target.len())?;

        Ok(self.last_output.iter()
            .zip(target)
            .map(|(actual, expected)| squared_error(*actual, *expected))
            .collect())
    }

    /// Perform single training step: forward pass, backward pass,
    /// and return errors of the output computed before the update.
    pub fn train(&mut self, input: &[F], target: &[F]) -> Result<Vec<F>, DimensionMismatch> {
        self.forward(input)?;
        self.backward(target)?;
        self.calculate_error(target)
    }
}

impl<F: Float> std::fmt::Display for Network<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "network: {} inputs, {} outputs, {} params", self.inputs, self.outputs, self.params())?;

        for (i, layer) in self.layers.iter().enumerate() {
            write!(f, "#{i} {layer}")?;
        }

        Ok(())
    }
}

/// Index of the largest value, `None` for an empty slice.
///
/// The first one wins on ties.
pub fn argmax<F: Float>(values: &[F]) -> Option<usize> {
    values.iter()
        .enumerate()
        .fold(None, |max: Option<(usize, F)>, (i, value)| match max {
            Some((_, max_value)) if *value <= max_value => max,
            _ => Some((i, *value))
        })
        .map(|(i, _)| i)
}

#[test]
fn test_network_topology() {
    let network = Network64::random(784, 10, &[100, 50], Activation::Sigmoid, &mut fastrand::Rng::with_seed(1));

    let shapes = network.layers().iter()
        .map(|layer| (layer.inputs(), layer.outputs()))
        .collect::<Vec<_>>();

    assert_eq!(shapes, [(784, 100), (100, 50), (50, 10)]);

    assert_eq!(network.input_size(), 784);
    assert_eq!(network.output_size(), 10);
    assert_eq!(network.params(), 785 * 100 + 101 * 50 + 51 * 10);
    assert_eq!(network.learn_rate(), DEFAULT_LEARN_RATE);
    assert!(network.last_output().is_empty());

    // No hidden layers.
    let network = Network32::random(3, 2, &[], Activation::Identity, &mut fastrand::Rng::with_seed(1));

    assert_eq!(network.layers().len(), 1);
    assert_eq!(network.layers()[0].inputs(), 3);
    assert_eq!(network.layers()[0].outputs(), 2);
}

#[test]
fn test_network_from_layers() {
    let mut rng = fastrand::Rng::with_seed(2);

    let network = Network64::from_layers(vec![
        Layer::random(4, 3, Activation::Relu, &mut rng),
        Layer::random(3, 2, Activation::Sigmoid, &mut rng)
    ]).unwrap();

    assert_eq!(network.input_size(), 4);
    assert_eq!(network.output_size(), 2);

    assert_eq!(
        Network64::from_layers(vec![
            Layer::random(4, 3, Activation::Relu, &mut rng),
            Layer::random(2, 2, Activation::Sigmoid, &mut rng)
        ]),
        Err(DimensionMismatch::new("network layer inputs", 3, 2))
    );

    assert!(Network64::from_layers(vec![]).is_err());
}

#[test]
fn test_network_dimension_mismatch() {
    let mut network = Network64::random(2, 1, &[2], Activation::Sigmoid, &mut fastrand::Rng::with_seed(3));

    // No forward pass yet.
    assert!(network.backward(&[0.7]).is_err());
    assert!(network.calculate_error(&[0.7]).is_err());

    assert_eq!(
        network.forward(&[0.5]),
        Err(DimensionMismatch::new("network inputs", 2, 1))
    );

    network.forward(&[0.5, -0.3]).unwrap();

    assert_eq!(
        network.backward(&[0.7, 0.1]),
        Err(DimensionMismatch::new("network target", 1, 2))
    );

    assert!(network.calculate_error(&[]).is_err());
    assert!(network.output_gradients(&[0.1, 0.2]).is_err());
}

#[test]
/// Networks built with the same seed must behave identically.
fn test_network_seed_reproducibility() {
    let mut a = Network64::random(2, 1, &[2], Activation::Sigmoid, &mut fastrand::Rng::with_seed(1234));
    let mut b = Network64::random(2, 1, &[2], Activation::Sigmoid, &mut fastrand::Rng::with_seed(1234));

    for input in [[0.5, -0.3], [0.0, 0.0], [-1.0, 2.0]] {
        assert_eq!(a.forward(&input).unwrap(), b.forward(&input).unwrap());
    }

    a.train(&[0.5, -0.3], &[0.7]).unwrap();
    b.train(&[0.5, -0.3], &[0.7]).unwrap();

    assert_eq!(a, b);
}

#[test]
fn test_network_calculate_error() {
    let layer = Layer64::from_neurons(2, vec![
        Neuron::new(vec![1.0, 0.0], 0.0, Activation::Identity),
        Neuron::new(vec![0.0, 1.0], 0.0, Activation::Identity)
    ]).unwrap();

    let mut network = Network64::from_layers(vec![layer]).unwrap();

    let output = network.forward(&[0.25, 0.75]).unwrap();

    assert_eq!(output, network.last_output());

    assert_eq!(network.calculate_error(&[0.25, 0.75]).unwrap(), vec![0.0, 0.0]);
    assert_eq!(network.calculate_error(&[0.75, 0.25]).unwrap(), vec![0.25, 0.25]);
    assert_eq!(network.output_gradients(&[0.75, 0.25]).unwrap(), vec![-1.0, 1.0]);

    let mut network = Network64::random(3, 4, &[5], Activation::Sigmoid, &mut fastrand::Rng::with_seed(9));

    network.forward(&[0.1, 0.2, 0.3]).unwrap();

    let errors = network.calculate_error(&[0.0, 1.0, 0.5, 0.25]).unwrap();

    assert_eq!(errors.len(), 4);
    assert!(errors.iter().all(|error| *error > 0.0));
}

#[test]
/// Repeated backward passes on a single sample must decrease its loss.
fn test_network_loss_decreases() {
    let mut network = Network64::random(2, 1, &[2], Activation::Sigmoid, &mut fastrand::Rng::with_seed(42));

    let mut losses = Vec::with_capacity(1001);

    for _ in 0..1000 {
        network.forward(&[0.5, -0.3]).unwrap();

        losses.push(network.calculate_error(&[0.7]).unwrap()[0]);

        network.backward(&[0.7]).unwrap();
    }

    network.forward(&[0.5, -0.3]).unwrap();

    losses.push(network.calculate_error(&[0.7]).unwrap()[0]);

    for pair in losses[..10].windows(2) {
        assert!(pair[1] < pair[0], "loss increased: {} -> {}", pair[0], pair[1]);
    }

    assert!(losses[1000] < losses[0]);
}

#[test]
/// Single step on a digit-sized network must touch every layer.
fn test_network_mnist_sized_step() {
    let mut rng = fastrand::Rng::with_seed(3);

    let mut network = Network64::random(784, 10, &[100, 100], Activation::Sigmoid, &mut rng);

    let before = network.clone();

    let input = (0..784)
        .map(|i| (i % 28) as f64 / 27.0)
        .collect::<Vec<_>>();

    let mut target = vec![0.0; 10];

    target[3] = 1.0;

    network.forward(&input).unwrap();
    network.backward(&target).unwrap();

    assert_eq!(network.last_output().len(), 10);

    for (updated, original) in network.layers().iter().zip(before.layers()) {
        let changed = updated.neurons().iter()
            .zip(original.neurons())
            .any(|(a, b)| a.bias() != b.bias() || a.weights() != b.weights());

        assert!(changed);
    }
}

#[test]
/// Two-layer network should return 1.0 if two given
/// numbers have the same sign and 0.0 otherwise.
fn test_network_backward_propagation() {
    let mut rng = fastrand::Rng::with_seed(11);

    let mut network = Network64::from_layers(vec![
        Layer::random(2, 8, Activation::Sigmoid, &mut rng),
        Layer::random(8, 1, Activation::Sigmoid, &mut rng)
    ]).unwrap().with_learn_rate(0.5);

    let examples = [
        ([ 0.5,  0.3], 1.0),
        ([-0.1,  0.7], 0.0),
        ([-0.3, -0.1], 1.0),
        ([ 0.2, -0.2], 0.0),
        ([ 0.7,  0.5], 1.0),
        ([-0.3,  0.9], 0.0),
        ([-0.5, -0.3], 1.0),
        ([ 0.4, -0.4], 0.0),
        ([ 0.8,  0.6], 1.0),
        ([-0.4,  1.0], 0.0),
        ([-0.9, -0.4], 1.0),
        ([ 0.5, -0.5], 0.0)
    ];

    let mut first_epoch_loss = 0.0;
    let mut last_epoch_loss = 0.0;

    for epoch in 0..2000 {
        let mut loss = 0.0;

        for (input, expected) in examples {
            loss += network.train(&input, &[expected]).unwrap()[0];
        }

        if epoch == 0 {
            first_epoch_loss = loss;
        }

        last_epoch_loss = loss;
    }

    assert!(last_epoch_loss < first_epoch_loss);
}

#[test]
fn test_argmax() {
    assert_eq!(argmax::<f64>(&[]), None);
    assert_eq!(argmax(&[0.1_f64, 0.7, 0.2]), Some(1));
    assert_eq!(argmax(&[0.5_f32, 0.5, 0.1]), Some(0));
    assert_eq!(argmax(&[-3.0_f64, -1.0, -2.0]), Some(1));
}
