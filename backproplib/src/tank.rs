//! German tank problem: estimate population size from the
//! serial numbers of a few observed tanks.

/// Generate shuffled population of tank serial numbers.
///
/// Population size is randomly chosen from the `[min, max]` range,
/// serial numbers go from `1` up to the population size.
pub fn generate_population(min: usize, max: usize, rng: &mut fastrand::Rng) -> Vec<usize> {
    let size = rng.usize(min.min(max)..=max.max(min));

    let mut population = (1..=size).collect::<Vec<_>>();

    rng.shuffle(&mut population);

    population
}

#[inline]
/// Return first `peeks` serial numbers of the pre-shuffled population.
///
/// Every serial number is observed only once, so less values are
/// returned if the population is smaller than `peeks`.
pub fn peek_serial_numbers(population: &[usize], peeks: usize) -> Vec<usize> {
    population[..peeks.min(population.len())].to_vec()
}

/// "Frequentist" solution of the tank counting problem:
/// `N = m + m / k - 1`, where `m` is the highest seen serial
/// number and `k` is the number of observations.
///
/// Returns `None` if there are no observations.
pub fn frequentist_prediction(peeks: &[usize]) -> Option<usize> {
    let m = *peeks.iter().max()?;
    let k = peeks.len();

    Some((m + m / k).saturating_sub(1))
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Observed serial numbers with the true population size.
pub struct TankPopulationExercise {
    pub true_population: usize,
    pub population_peeks: Vec<usize>
}

impl TankPopulationExercise {
    /// Generate random population from `[min, max]` range
    /// and observe `peeks` serial numbers of it.
    pub fn random(min: usize, max: usize, peeks: usize, rng: &mut fastrand::Rng) -> Self {
        let population = generate_population(min, max, rng);

        Self {
            true_population: population.len(),
            population_peeks: peek_serial_numbers(&population, peeks)
        }
    }

    #[inline]
    /// Frequentist estimation of the population size.
    pub fn frequentist_prediction(&self) -> Option<usize> {
        frequentist_prediction(&self.population_peeks)
    }

    /// Scale observations and population size by `max` to use
    /// them as a neural network input and target.
    pub fn normalized(&self, max: usize) -> (Vec<f64>, Vec<f64>) {
        let max = max as f64;

        let input = self.population_peeks.iter()
            .map(|serial| *serial as f64 / max)
            .collect();

        (input, vec![self.true_population as f64 / max])
    }
}

/// Relative error of the prediction: `|prediction - actual| / actual`.
pub fn relative_error(prediction: f64, actual: usize) -> f64 {
    (prediction - actual as f64).abs() / actual as f64
}

#[test]
fn test_generate_population() {
    let mut rng = fastrand::Rng::with_seed(10);

    for _ in 0..50 {
        let mut population = generate_population(20, 40, &mut rng);

        assert!((20..=40).contains(&population.len()));

        population.sort_unstable();

        assert_eq!(population, (1..=population.len()).collect::<Vec<_>>());
    }

    assert_eq!(generate_population(5, 5, &mut rng).len(), 5);
}

#[test]
fn test_peek_serial_numbers() {
    assert_eq!(peek_serial_numbers(&[4, 2, 7, 1], 2), vec![4, 2]);
    assert_eq!(peek_serial_numbers(&[4, 2], 5), vec![4, 2]);
}

#[test]
fn test_frequentist_prediction() {
    assert_eq!(frequentist_prediction(&[]), None);

    // 60 + 60 / 4 - 1
    assert_eq!(frequentist_prediction(&[19, 40, 42, 60]), Some(74));

    assert_eq!(frequentist_prediction(&[1]), Some(1));
}

#[test]
fn test_tank_exercise() {
    let mut rng = fastrand::Rng::with_seed(20);

    let exercise = TankPopulationExercise::random(100, 1000, 15, &mut rng);

    assert!((100..=1000).contains(&exercise.true_population));
    assert_eq!(exercise.population_peeks.len(), 15);

    assert!(exercise.population_peeks.iter().all(|serial| *serial <= exercise.true_population));

    let prediction = exercise.frequentist_prediction().unwrap();

    assert!(prediction >= *exercise.population_peeks.iter().max().unwrap());

    let (input, target) = exercise.normalized(1000);

    assert_eq!(input.len(), 15);
    assert!(input.iter().all(|value| *value > 0.0 && *value <= 1.0));
    assert_eq!(target, vec![exercise.true_population as f64 / 1000.0]);
}

#[test]
/// Frequentist estimation must be reasonably close on average.
fn test_frequentist_mean_error() {
    let mut rng = fastrand::Rng::with_seed(30);

    let runs = 1000;

    let mean_error = (0..runs)
        .map(|_| {
            let exercise = TankPopulationExercise::random(100, 1000, 15, &mut rng);

            relative_error(exercise.frequentist_prediction().unwrap() as f64, exercise.true_population)
        })
        .sum::<f64>() / runs as f64;

    assert!(mean_error < 0.15);

    assert_eq!(relative_error(110.0, 100), 0.1);
}
