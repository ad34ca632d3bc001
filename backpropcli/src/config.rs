use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Demo {
    #[default]
    Simple,
    Mnist,
    Tank
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
/// Demo run settings.
///
/// Loaded from an INI-style file:
///
/// ```ini
/// # Which demo to run: simple, mnist or tank
/// demo=mnist
/// epochs=1000
/// batch_size=1000
/// test_count=10
/// learning_rate=0.01
/// hidden_layers=100,100
/// ```
///
/// or from a JSON file with the same keys.
pub struct Config {
    pub demo: Demo,
    pub epochs: usize,
    pub batch_size: usize,
    pub test_count: usize,
    pub learning_rate: f64,

    #[serde(deserialize_with = "one_or_many")]
    pub hidden_layers: Vec<usize>,

    /// Seed of the random numbers generator, random if not set.
    pub seed: Option<u64>,

    /// Folder with MNIST dataset files.
    pub data: PathBuf
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo: Demo::Simple,
            epochs: 1000,
            batch_size: 1000,
            test_count: 10,
            learning_rate: 0.01,
            hidden_layers: vec![100, 100],
            seed: None,
            data: PathBuf::from("data")
        }
    }
}

impl Config {
    /// Load config file. Files with `.json` extension are parsed
    /// as JSON, everything else as INI.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)?;

        let config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            _ => serde_json::from_value(Value::Object(parse_ini(&content)))?
        };

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.hidden_layers.is_empty() {
            anyhow::bail!("hidden_layers must list at least one layer");
        }

        if self.hidden_layers.contains(&0) {
            anyhow::bail!("hidden_layers can't contain empty layers");
        }

        if self.batch_size == 0 {
            anyhow::bail!("batch_size must be positive");
        }

        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            anyhow::bail!("learning_rate must be a positive number");
        }

        Ok(())
    }
}

/// Config keys which values are never converted to numbers.
pub const STRING_KEYS: [&str; 2] = ["demo", "data"];

/// Parse `key=value` lines into JSON object.
///
/// Blank lines, `#` and `;` comments and `[section]` headers are skipped.
/// Numbers and comma separated lists of numbers are converted to JSON
/// numbers and arrays, everything else and values of `STRING_KEYS`
/// are kept as strings.
pub fn parse_ini(content: &str) -> Map<String, Value> {
    let mut values = Map::new();

    for line in content.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with(['#', ';', '[']) {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim();

            let value = if STRING_KEYS.contains(&key) {
                Value::String(value.to_string())
            } else {
                parse_ini_value(value)
            };

            values.insert(key.to_string(), value);
        }
    }

    values
}

fn parse_ini_value(value: &str) -> Value {
    if let Some(number) = parse_number(value) {
        return Value::Number(number);
    }

    if value.contains(',') {
        let numbers = value.split(',')
            .map(|item| parse_number(item.trim()).map(Value::Number))
            .collect::<Option<Vec<_>>>();

        if let Some(numbers) = numbers {
            return Value::Array(numbers);
        }
    }

    Value::String(value.to_string())
}

fn parse_number(value: &str) -> Option<Number> {
    if let Ok(number) = value.parse::<u64>() {
        return Some(Number::from(number));
    }

    if let Ok(number) = value.parse::<i64>() {
        return Some(Number::from(number));
    }

    value.parse::<f64>().ok().and_then(Number::from_f64)
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<usize>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(usize),
        Many(Vec<usize>)
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => vec![value],
        OneOrMany::Many(values) => values
    })
}

#[test]
fn test_parse_ini() -> anyhow::Result<()> {
    let values = parse_ini("
        # comment
        ; another comment
        [general]
        demo = mnist
        epochs=5
        learning_rate=0.5
        hidden_layers=64, 32
        data=/tmp/mnist
        broken line
    ");

    assert_eq!(values.len(), 5);

    let config: Config = serde_json::from_value(Value::Object(values))?;

    assert_eq!(config.demo, Demo::Mnist);
    assert_eq!(config.epochs, 5);
    assert_eq!(config.learning_rate, 0.5);
    assert_eq!(config.hidden_layers, vec![64, 32]);
    assert_eq!(config.data, PathBuf::from("/tmp/mnist"));

    // Defaults.
    assert_eq!(config.batch_size, 1000);
    assert_eq!(config.test_count, 10);
    assert_eq!(config.seed, None);

    let values = parse_ini("data=2024\nepochs=2024\ndemo=1");

    assert_eq!(values["data"], Value::String(String::from("2024")));
    assert_eq!(values["epochs"], Value::from(2024_u64));
    assert_eq!(values["demo"], Value::String(String::from("1")));

    Ok(())
}

#[test]
fn test_config_load() -> anyhow::Result<()> {
    let folder = std::env::temp_dir().join(format!("backprop-config-{}", std::process::id()));

    std::fs::create_dir_all(&folder)?;

    let ini = folder.join("config.ini");
    let json = folder.join("config.json");

    std::fs::write(&ini, "demo=tank\nhidden_layers=16\nseed=42\n")?;
    std::fs::write(&json, r#"{ "demo": "simple", "epochs": 10, "hidden_layers": [2] }"#)?;

    let config = Config::load(&ini)?;

    assert_eq!(config.demo, Demo::Tank);
    assert_eq!(config.hidden_layers, vec![16]);
    assert_eq!(config.seed, Some(42));

    let config = Config::load(&json)?;

    assert_eq!(config.demo, Demo::Simple);
    assert_eq!(config.epochs, 10);
    assert_eq!(config.hidden_layers, vec![2]);

    std::fs::write(&ini, "demo=chess\n")?;

    assert!(Config::load(&ini).is_err());

    std::fs::write(&ini, "hidden_layers=10,0\n")?;

    assert!(Config::load(&ini).is_err());

    assert!(Config::load(folder.join("missing.ini")).is_err());

    // Numeric looking paths stay paths.
    std::fs::write(&ini, "demo=mnist\ndata=2024\n")?;

    let config = Config::load(&ini)?;

    assert_eq!(config.data, PathBuf::from("2024"));

    let _ = std::fs::remove_dir_all(&folder);

    Ok(())
}
