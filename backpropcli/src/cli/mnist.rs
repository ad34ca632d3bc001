use std::path::PathBuf;

use anyhow::Context;
use colorful::Colorful;

use backproplib::prelude::*;

/// Train `784 -> hidden -> 10` digits classifier.
pub struct MnistDemo {
    pub data: PathBuf,
    pub epochs: usize,
    pub batch_size: usize,
    pub test_count: usize,
    pub hidden_layers: Vec<usize>,
    pub learn_rate: f64
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
/// Results of a single training epoch.
pub struct EpochStats {
    pub success_rate: f64,
    pub mean_loss: f64
}

impl MnistDemo {
    pub fn run(&self, rng: &mut fastrand::Rng) -> anyhow::Result<()> {
        let data = self.data.canonicalize().unwrap_or_else(|_| self.data.clone());

        println!("⏳ Loading MNIST dataset from {data:?}...");

        let dataset = MnistDataset::open(&data)
            .context("Failed to load MNIST dataset")?;

        if dataset.train.is_empty() || dataset.test.is_empty() {
            anyhow::bail!("MNIST dataset has no training or test samples");
        }

        println!("{}", "✅ Dataset loaded".green());
        println!("  Training samples: {}", format!("{}", dataset.train.len()).yellow());
        println!("   Testing samples: {}", format!("{}", dataset.test.len()).yellow());

        let mut network = Network64::random(IMAGE_SIZE, CLASSES, &self.hidden_layers, Activation::Sigmoid, rng)
            .with_learn_rate(self.learn_rate);

        super::print_network(&network);

        println!("⏳ Beginning training...");

        for epoch in 0..self.epochs {
            let stats = train_epoch(&mut network, &dataset.train, self.batch_size, rng)?;

            println!(
                "Epoch {epoch} success rate: {} mean loss: {}",
                format!("{:.0}%", stats.success_rate * 100.0).yellow(),
                format!("{:.6}", stats.mean_loss).yellow()
            );
        }

        let mut correct = 0;

        for _ in 0..self.test_count {
            let index = rng.usize(..dataset.test.len());

            let image = &dataset.test.images[index];
            let label = dataset.test.labels[index] as usize;

            let prediction = argmax(&network.forward(image)?);

            if let Some(image) = ascii_image(image) {
                print!("{image}");
            }

            if prediction == Some(label) {
                correct += 1;

                println!("{}", format!("✅ Label is: {label}, Predicted: {label}").green());
            } else {
                let prediction = prediction.map(|i| i.to_string()).unwrap_or_default();

                println!("{}", format!("🧯 Label is: {label}, Predicted: {prediction}").red());
            }
        }

        if self.test_count > 0 {
            println!("📖 Recognized {} of {} test images", format!("{correct}").yellow(), self.test_count);
        }

        Ok(())
    }
}

/// Train network on `batch_size` random samples of the dataset split.
pub fn train_epoch(
    network: &mut Network64,
    samples: &LabeledImages,
    batch_size: usize,
    rng: &mut fastrand::Rng
) -> anyhow::Result<EpochStats> {
    if samples.is_empty() || batch_size == 0 {
        anyhow::bail!("Can't train on empty batch");
    }

    let mut stats = EpochStats::default();

    for _ in 0..batch_size {
        let sample = rng.usize(..samples.len());

        let label = samples.labels[sample] as usize;
        let target = one_hot(label, network.output_size())
            .with_context(|| format!("Label {label} doesn't fit {} network outputs", network.output_size()))?;

        let output = network.forward(&samples.images[sample])?;

        network.backward(&target)?;

        if argmax(&output) == Some(label) {
            stats.success_rate += 1.0;
        }

        stats.mean_loss += mean(&network.calculate_error(&target)?);
    }

    stats.success_rate /= batch_size as f64;
    stats.mean_loss /= batch_size as f64;

    Ok(stats)
}

#[test]
fn test_train_epoch() -> anyhow::Result<()> {
    let mut rng = fastrand::Rng::with_seed(4);

    // Two "digits": dim top half and dim bottom half.
    let top = (0..IMAGE_SIZE).map(|i| if i < IMAGE_SIZE / 2 { 0.1 } else { 0.0 }).collect::<Vec<_>>();
    let bottom = top.iter().rev().copied().collect::<Vec<_>>();

    let samples = LabeledImages {
        images: vec![top.clone(), bottom.clone()],
        labels: vec![0, 1]
    };

    let mut network = Network64::random(IMAGE_SIZE, CLASSES, &[16], Activation::Sigmoid, &mut rng)
        .with_learn_rate(0.5);

    let first = train_epoch(&mut network, &samples, 50, &mut rng)?;

    assert!((0.0..=1.0).contains(&first.success_rate));

    let mut last = first;

    for _ in 0..40 {
        last = train_epoch(&mut network, &samples, 50, &mut rng)?;
    }

    assert!(last.mean_loss < first.mean_loss);

    assert_eq!(argmax(&network.forward(&top)?), Some(0));
    assert_eq!(argmax(&network.forward(&bottom)?), Some(1));

    assert!(train_epoch(&mut network, &LabeledImages::default(), 10, &mut rng).is_err());

    let out_of_range = LabeledImages {
        images: vec![top],
        labels: vec![10]
    };

    assert!(train_epoch(&mut network, &out_of_range, 1, &mut rng).is_err());

    Ok(())
}

#[test]
fn test_missing_dataset_fails() {
    let demo = MnistDemo {
        data: std::env::temp_dir().join(format!("backprop-missing-mnist-{}", std::process::id())),
        epochs: 1,
        batch_size: 1,
        test_count: 1,
        hidden_layers: vec![4],
        learn_rate: 0.01
    };

    assert!(demo.run(&mut fastrand::Rng::with_seed(1)).is_err());
}
