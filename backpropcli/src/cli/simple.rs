use colorful::Colorful;

use backproplib::prelude::*;

/// Input of the only training sample.
pub const INPUT: [f64; 2] = [0.5, -0.3];

/// Expected output of the only training sample.
pub const TARGET: [f64; 1] = [0.7];

/// Train `2 -> hidden -> 1` network to output `TARGET` for `INPUT`.
pub struct SimpleDemo {
    pub epochs: usize,
    pub hidden_layers: Vec<usize>,
    pub learn_rate: f64
}

impl SimpleDemo {
    /// Train the network, printing loss every 100 epochs.
    ///
    /// Returns loss of the last epoch.
    pub fn run(&self, rng: &mut fastrand::Rng) -> anyhow::Result<f64> {
        let mut network = Network64::random(INPUT.len(), TARGET.len(), &self.hidden_layers, Activation::Sigmoid, rng)
            .with_learn_rate(self.learn_rate);

        super::print_network(&network);

        let mut loss = 0.0;

        for epoch in 0..=self.epochs {
            network.forward(&INPUT)?;
            network.backward(&TARGET)?;

            loss = network.calculate_error(&TARGET)?[0];

            if epoch % 100 == 0 {
                println!("Epoch {epoch} loss {}", format!("{loss:.6}").yellow());
            }
        }

        Ok(loss)
    }
}

#[test]
fn test_simple_demo() -> anyhow::Result<()> {
    let mut rng = fastrand::Rng::with_seed(1);

    let mut network = Network64::random(2, 1, &[2], Activation::Sigmoid, &mut rng);

    network.forward(&INPUT)?;

    let initial_loss = network.calculate_error(&TARGET)?[0];

    let demo = SimpleDemo {
        epochs: 1000,
        hidden_layers: vec![2],
        learn_rate: 0.01
    };

    let loss = demo.run(&mut fastrand::Rng::with_seed(1))?;

    assert!(loss < initial_loss);

    Ok(())
}
