use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser};
use colorful::Colorful;

use crate::config::{Config, Demo};

pub mod simple;
pub mod mnist;
pub mod tank;

#[derive(Args)]
pub struct TrainingArgs {
    #[arg(long, default_value_t = 0.01)]
    /// Learn rate of the backward propagation.
    learn_rate: f64,

    #[arg(long)]
    /// Seed of the random numbers generator.
    ///
    /// Random seed is used and printed if not set.
    seed: Option<u64>
}

#[derive(Parser)]
#[command(version, about)]
pub enum Cli {
    /// Train small network on a single static sample.
    Simple {
        #[arg(long, default_value_t = 1000)]
        /// Amount of training steps.
        epochs: usize,

        #[arg(long, value_delimiter = ',', default_value = "2")]
        /// Comma separated neurons amounts of the hidden layers.
        hidden: Vec<usize>,

        #[command(flatten)]
        training: TrainingArgs
    },

    /// Train handwritten digits classifier on the MNIST dataset.
    Mnist {
        #[arg(long, short, default_value = "data")]
        /// Path to the folder with unpacked MNIST files.
        data: PathBuf,

        #[arg(long, default_value_t = 1000)]
        /// Amount of training epochs.
        epochs: usize,

        #[arg(long, default_value_t = 1000)]
        /// Amount of random training samples per epoch.
        batch_size: usize,

        #[arg(long, default_value_t = 10)]
        /// Amount of test images to print after training.
        test_count: usize,

        #[arg(long, value_delimiter = ',', default_value = "100,100")]
        /// Comma separated neurons amounts of the hidden layers.
        hidden: Vec<usize>,

        #[command(flatten)]
        training: TrainingArgs
    },

    /// Compare frequentist and neural network solutions of the tank counting problem.
    Tank {
        #[arg(long, default_value_t = 50)]
        /// Amount of training epochs.
        epochs: usize,

        #[arg(long, default_value_t = 1000)]
        /// Amount of generated exercises per epoch.
        batch_size: usize,

        #[arg(long, value_delimiter = ',', default_value = "100,100")]
        /// Comma separated neurons amounts of the hidden layers.
        hidden: Vec<usize>,

        #[command(flatten)]
        training: TrainingArgs
    },

    /// Run demo described by the config file.
    Run {
        #[arg(long, short)]
        /// Path to the INI or JSON config file.
        config: PathBuf
    }
}

impl Cli {
    /// Convert subcommand arguments into the demo config.
    ///
    /// `run` loads the config from the file.
    pub fn config(self) -> anyhow::Result<Config> {
        Ok(match self {
            Self::Simple { epochs, hidden, training } => Config {
                demo: Demo::Simple,
                epochs,
                hidden_layers: hidden,
                learning_rate: training.learn_rate,
                seed: training.seed,
                ..Config::default()
            },

            Self::Mnist { data, epochs, batch_size, test_count, hidden, training } => Config {
                demo: Demo::Mnist,
                epochs,
                batch_size,
                test_count,
                hidden_layers: hidden,
                learning_rate: training.learn_rate,
                seed: training.seed,
                data
            },

            Self::Tank { epochs, batch_size, hidden, training } => Config {
                demo: Demo::Tank,
                epochs,
                batch_size,
                hidden_layers: hidden,
                learning_rate: training.learn_rate,
                seed: training.seed,
                ..Config::default()
            },

            Self::Run { config } => {
                let config = config.canonicalize().unwrap_or(config);

                println!("⏳ Loading config from {config:?}...");

                Config::load(&config)
                    .with_context(|| format!("Failed to load config from {config:?}"))?
            }
        })
    }

    pub fn execute(self) -> anyhow::Result<()> {
        let config = self.config()?;

        config.validate().context("Invalid demo settings")?;

        run_demo(config)
    }
}

/// Run the demo selected by the validated config.
pub fn run_demo(config: Config) -> anyhow::Result<()> {
    let mut rng = seeded_rng(config.seed);

    match config.demo {
        Demo::Simple => simple::SimpleDemo {
            epochs: config.epochs,
            hidden_layers: config.hidden_layers,
            learn_rate: config.learning_rate
        }.run(&mut rng).map(|_| ()),

        Demo::Mnist => mnist::MnistDemo {
            data: config.data,
            epochs: config.epochs,
            batch_size: config.batch_size,
            test_count: config.test_count,
            hidden_layers: config.hidden_layers,
            learn_rate: config.learning_rate
        }.run(&mut rng),

        Demo::Tank => tank::TankDemo {
            epochs: config.epochs,
            batch_size: config.batch_size,
            hidden_layers: config.hidden_layers,
            learn_rate: config.learning_rate
        }.run(&mut rng)
    }
}

/// Create random numbers generator with given or random seed.
pub fn seeded_rng(seed: Option<u64>) -> fastrand::Rng {
    let seed = seed.unwrap_or_else(|| fastrand::u64(..));

    println!("{} seed = {}", "📖 Note:".blue(), format!("{seed}").yellow());

    fastrand::Rng::with_seed(seed)
}

/// Print topology and size of the created network.
pub fn print_network<F: backproplib::prelude::Float>(network: &backproplib::prelude::Network<F>) {
    let topology = network.layers().iter()
        .map(|layer| layer.outputs().to_string())
        .collect::<Vec<_>>()
        .join(" -> ");

    println!("{}", "✅ Network created".green());
    println!("    Topology: {}", format!("{} -> {topology}", network.input_size()).yellow());
    println!("  Parameters: {}", format!("{}", network.params()).yellow());
    println!("  Learn rate: {}", format!("{}", network.learn_rate()).yellow());
}

#[test]
fn test_cli_arguments() {
    let cli = Cli::try_parse_from(["backprop", "simple", "--epochs", "10", "--hidden", "4,3", "--seed", "7"]).unwrap();

    let Cli::Simple { epochs, hidden, training } = cli else {
        panic!("expected simple command");
    };

    assert_eq!(epochs, 10);
    assert_eq!(hidden, vec![4, 3]);
    assert_eq!(training.seed, Some(7));
    assert_eq!(training.learn_rate, 0.01);

    let cli = Cli::try_parse_from(["backprop", "mnist"]).unwrap();

    let Cli::Mnist { data, hidden, batch_size, .. } = cli else {
        panic!("expected mnist command");
    };

    assert_eq!(data, PathBuf::from("data"));
    assert_eq!(hidden, vec![100, 100]);
    assert_eq!(batch_size, 1000);

    assert!(Cli::try_parse_from(["backprop", "run"]).is_err());
}

#[test]
fn test_cli_config() -> anyhow::Result<()> {
    let config = Cli::try_parse_from(["backprop", "tank", "--hidden", "8", "--learn-rate", "0.1"])?.config()?;

    assert_eq!(config.demo, Demo::Tank);
    assert_eq!(config.epochs, 50);
    assert_eq!(config.hidden_layers, vec![8]);
    assert_eq!(config.learning_rate, 0.1);
    assert!(config.validate().is_ok());

    Ok(())
}

#[test]
fn test_cli_rejects_invalid_settings() -> anyhow::Result<()> {
    assert!(Cli::try_parse_from(["backprop", "simple", "--hidden", "0"])?.execute().is_err());
    assert!(Cli::try_parse_from(["backprop", "simple", "--learn-rate=-1"])?.execute().is_err());
    assert!(Cli::try_parse_from(["backprop", "tank", "--batch-size", "0"])?.execute().is_err());
    assert!(Cli::try_parse_from(["backprop", "mnist", "--hidden", "100,0"])?.execute().is_err());

    Ok(())
}

#[test]
fn test_cli_load_failures() -> anyhow::Result<()> {
    let missing = std::env::temp_dir().join(format!("backprop-missing-{}", std::process::id()));

    let config = missing.join("config.ini");

    assert!(Cli::try_parse_from(["backprop", "run", "--config", &*config.to_string_lossy()])?.execute().is_err());

    let data = missing.join("mnist");

    assert!(Cli::try_parse_from(["backprop", "mnist", "--hidden", "4", "--epochs", "1", "--data", &*data.to_string_lossy()])?.execute().is_err());

    Ok(())
}
