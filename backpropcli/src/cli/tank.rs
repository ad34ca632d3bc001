use colorful::Colorful;

use backproplib::prelude::*;

/// Minimal generated population size.
pub const TANK_MIN: usize = 100;

/// Maximal generated population size. Network inputs and
/// outputs are scaled by this value.
pub const TANK_MAX: usize = 1000;

/// Amount of observed serial numbers per exercise.
pub const TANK_PEEKS: usize = 15;

/// Amount of exercises used to calculate mean prediction error.
pub const EVALUATION_RUNS: usize = 10000;

/// Predictions with smaller relative error are counted as successful.
pub const SUCCESS_ERROR: f64 = 0.1;

/// Compare frequentist estimation with the network trained
/// to predict population size from the observed serial numbers.
pub struct TankDemo {
    pub epochs: usize,
    pub batch_size: usize,
    pub hidden_layers: Vec<usize>,
    pub learn_rate: f64
}

impl TankDemo {
    pub fn run(&self, rng: &mut fastrand::Rng) -> anyhow::Result<()> {
        println!("⏳ Frequentist solution...");

        for _ in 0..10 {
            let exercise = TankPopulationExercise::random(TANK_MIN, TANK_MAX, TANK_PEEKS, rng);

            let prediction = exercise.frequentist_prediction().unwrap_or_default();

            print_prediction(exercise.true_population, prediction as f64);
        }

        let mean_error = evaluate(rng, |exercise| {
            Ok(exercise.frequentist_prediction().unwrap_or_default() as f64)
        })?;

        println!("📖 Mean error over {EVALUATION_RUNS} runs: {}", format!("{:.2}%", mean_error * 100.0).yellow());

        println!("⏳ Neural network solution...");

        let mut network = Network64::random(TANK_PEEKS, 1, &self.hidden_layers, Activation::Sigmoid, rng)
            .with_learn_rate(self.learn_rate);

        super::print_network(&network);

        println!("⏳ Beginning training...");

        for epoch in 0..self.epochs {
            let mut successes = 0;
            let mut mean_loss = 0.0;

            for _ in 0..self.batch_size {
                let exercise = TankPopulationExercise::random(TANK_MIN, TANK_MAX, TANK_PEEKS, rng);

                let (input, target) = exercise.normalized(TANK_MAX);

                let loss = network.train(&input, &target)?;

                let prediction = network.last_output()[0] * TANK_MAX as f64;

                if relative_error(prediction, exercise.true_population) < SUCCESS_ERROR {
                    successes += 1;
                }

                mean_loss += mean(&loss) / self.batch_size as f64;
            }

            let success_rate = successes as f64 / self.batch_size.max(1) as f64;

            println!(
                "Epoch {epoch} success rate: {} mean loss: {}",
                format!("{:.0}%", success_rate * 100.0).yellow(),
                format!("{mean_loss:.6}").yellow()
            );
        }

        for _ in 0..10 {
            let exercise = TankPopulationExercise::random(TANK_MIN, TANK_MAX, TANK_PEEKS, rng);

            let prediction = predict(&mut network, &exercise)?;

            print_prediction(exercise.true_population, prediction);
        }

        let mean_error = evaluate(rng, |exercise| predict(&mut network, exercise))?;

        println!("📖 Mean error over {EVALUATION_RUNS} runs: {}", format!("{:.2}%", mean_error * 100.0).yellow());

        Ok(())
    }
}

/// Predict population size of the exercise with the trained network.
pub fn predict(network: &mut Network64, exercise: &TankPopulationExercise) -> anyhow::Result<f64> {
    let (input, _) = exercise.normalized(TANK_MAX);

    Ok(network.forward(&input)?[0] * TANK_MAX as f64)
}

/// Calculate mean relative error of the predictor over `EVALUATION_RUNS` random exercises.
pub fn evaluate(
    rng: &mut fastrand::Rng,
    mut predictor: impl FnMut(&TankPopulationExercise) -> anyhow::Result<f64>
) -> anyhow::Result<f64> {
    let mut mean_error = 0.0;

    for _ in 0..EVALUATION_RUNS {
        let exercise = TankPopulationExercise::random(TANK_MIN, TANK_MAX, TANK_PEEKS, rng);

        mean_error += relative_error(predictor(&exercise)?, exercise.true_population) / EVALUATION_RUNS as f64;
    }

    Ok(mean_error)
}

fn print_prediction(population: usize, prediction: f64) {
    let error = relative_error(prediction, population);

    let error = if error < SUCCESS_ERROR {
        format!("{:.2}%", error * 100.0).green()
    } else {
        format!("{:.2}%", error * 100.0).red()
    };

    println!("Tank population: {population:4}, Prediction: {prediction:4.0}, Error: {error}");
}

#[test]
fn test_evaluate() -> anyhow::Result<()> {
    let mut rng = fastrand::Rng::with_seed(8);

    let perfect = evaluate(&mut rng, |exercise| Ok(exercise.true_population as f64))?;

    assert_eq!(perfect, 0.0);

    let frequentist = evaluate(&mut rng, |exercise| {
        Ok(exercise.frequentist_prediction().unwrap_or_default() as f64)
    })?;

    assert!(frequentist < 0.15);

    let mut network = Network64::random(TANK_PEEKS, 1, &[4], Activation::Sigmoid, &mut rng);

    let exercise = TankPopulationExercise::random(TANK_MIN, TANK_MAX, TANK_PEEKS, &mut rng);
    let prediction = predict(&mut network, &exercise)?;

    assert!(prediction > 0.0 && prediction < TANK_MAX as f64);

    Ok(())
}
