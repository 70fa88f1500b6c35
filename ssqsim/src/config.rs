//! Anything related to loading up the simulation parameters from configuration/input files.

use std::io::{Cursor, Read};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, GeneratorKind, Lcg, Result, StreamLayout, Q_LIMIT};

fn default_queue_capacity() -> usize {
    Q_LIMIT
}

/// Simulation configuration typically loaded from a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Mean time between two consecutive arrivals.
    pub mean_interarrival: f64,
    /// Mean service time.
    pub mean_service: f64,
    /// The simulation stops once this many customers have finished waiting.
    pub required_customers: usize,
    /// Maximum number of customers waiting in the queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Random seed. If missing, the default LCG seed is used.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Pseudo-random generator.
    #[serde(default)]
    pub generator: GeneratorKind,
    /// Whether interarrival and service draws share one stream.
    #[serde(default)]
    pub streams: StreamLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mean_interarrival: 0.8,
            mean_service: 0.5,
            required_customers: 1000,
            queue_capacity: Q_LIMIT,
            seed: None,
            generator: GeneratorKind::default(),
            streams: StreamLayout::default(),
        }
    }
}

impl Config {
    /// Load config from YAML.
    ///
    /// # Example
    ///
    /// ```
    /// # use ssqsim::{Config, GeneratorKind};
    /// # fn main() -> ssqsim::Result<()> {
    /// let input = r#"
    /// mean_interarrival: 1.0
    /// mean_service: 0.5
    /// required_customers: 100
    /// seed: 7
    /// generator: chacha"#;
    /// let config = Config::from_yaml(std::io::Cursor::new(input))?;
    /// assert_eq!(config.mean_interarrival, 1.0);
    /// assert_eq!(config.required_customers, 100);
    /// assert_eq!(config.queue_capacity, 100);
    /// assert_eq!(config.generator, GeneratorKind::Chacha);
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the input cannot be parsed or does not pass
    /// verification, see [`Config::verify`].
    pub fn from_yaml<R: Read>(reader: R) -> Result<Self> {
        let config: Self = serde_yaml::from_reader(reader)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse config: {}", e)))?;
        config.verify()
    }

    /// Load config from JSON.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_yaml`].
    pub fn from_json<R: Read>(reader: R) -> Result<Self> {
        let config: Self = serde_json::from_reader(reader)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse config: {}", e)))?;
        config.verify()
    }

    /// Load the parameters from the classic input format: mean interarrival time, mean service
    /// time, and the number of customers, separated by whitespace. Other fields are defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the input cannot be read, does not contain exactly
    /// three numbers, or does not pass verification.
    pub fn from_legacy<R: Read>(mut reader: R) -> Result<Self> {
        let mut input = String::new();
        reader
            .read_to_string(&mut input)
            .map_err(|e| Error::InvalidConfig(format!("Failed to read input: {}", e)))?;
        let fields: Vec<&str> = input.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(Error::InvalidConfig(format!(
                "Expected 3 input parameters but found {}",
                fields.len()
            )));
        }
        let parse_mean = |field: &str| {
            field
                .parse::<f64>()
                .map_err(|_| Error::InvalidConfig(format!("Invalid mean: {}", field)))
        };
        let required_customers = fields[2].parse::<usize>().map_err(|_| {
            Error::InvalidConfig(format!("Invalid number of customers: {}", fields[2]))
        })?;
        Self {
            mean_interarrival: parse_mean(fields[0])?,
            mean_service: parse_mean(fields[1])?,
            required_customers,
            ..Self::default()
        }
        .verify()
    }

    /// Checks that the parameters describe a runnable simulation:
    /// - both means are finite and positive,
    /// - at least one customer is required,
    /// - the queue can hold at least one customer, and
    /// - the seed is valid for the chosen generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] describing the first violated condition.
    pub fn verify(self) -> Result<Self> {
        ensure_positive("Mean interarrival time", self.mean_interarrival)?;
        ensure_positive("Mean service time", self.mean_service)?;
        if self.required_customers == 0 {
            return Err(Error::InvalidConfig(String::from(
                "Number of customers must be positive",
            )));
        }
        if self.queue_capacity == 0 {
            return Err(Error::InvalidConfig(String::from(
                "Queue capacity must be positive",
            )));
        }
        if let (GeneratorKind::Lcg, Some(seed)) = (self.generator, self.seed) {
            Lcg::new(seed)?;
        }
        Ok(self)
    }
}

fn ensure_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidConfig(format!(
            "{} must be positive ({})",
            name, value
        )))
    }
}

impl FromStr for Config {
    type Err = Error;
    fn from_str(config: &str) -> Result<Self> {
        Config::from_yaml(Cursor::new(config))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_config() -> Result<()> {
        let input = r#"
mean_interarrival: 1.5
mean_service: 0.75
required_customers: 20
queue_capacity: 5
seed: 17
generator: lcg
streams: split"#;
        let config = Config::from_yaml(Cursor::new(input))?;
        assert_eq!(config.mean_interarrival, 1.5);
        assert_eq!(config.mean_service, 0.75);
        assert_eq!(config.required_customers, 20);
        assert_eq!(config.queue_capacity, 5);
        assert_eq!(config.seed, Some(17));
        assert_eq!(config.generator, GeneratorKind::Lcg);
        assert_eq!(config.streams, StreamLayout::Split);
        Ok(())
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let config: Config =
            "mean_interarrival: 1\nmean_service: 2\nrequired_customers: 3".parse()?;
        assert_eq!(config.queue_capacity, Q_LIMIT);
        assert_eq!(config.seed, None);
        assert_eq!(config.generator, GeneratorKind::Lcg);
        assert_eq!(config.streams, StreamLayout::Shared);
        Ok(())
    }

    #[test]
    fn test_json() -> Result<()> {
        let input = r#"{"mean_interarrival": 2.0, "mean_service": 1.0, "required_customers": 10}"#;
        let config = Config::from_json(Cursor::new(input))?;
        assert_eq!(config.mean_interarrival, 2.0);
        assert_eq!(config.required_customers, 10);
        Ok(())
    }

    #[test]
    fn test_legacy() -> Result<()> {
        let config = Config::from_legacy(Cursor::new("1.0 0.5 1000\n"))?;
        assert_eq!(config.mean_interarrival, 1.0);
        assert_eq!(config.mean_service, 0.5);
        assert_eq!(config.required_customers, 1000);
        assert_eq!(config.queue_capacity, Q_LIMIT);
        Ok(())
    }

    #[test]
    fn test_legacy_wrong_field_count() {
        assert_eq!(
            Config::from_legacy(Cursor::new("1.0 0.5")).unwrap_err(),
            Error::InvalidConfig(String::from("Expected 3 input parameters but found 2"))
        );
    }

    #[test]
    fn test_legacy_invalid_count() {
        assert_eq!(
            Config::from_legacy(Cursor::new("1.0 0.5 ten")).unwrap_err(),
            Error::InvalidConfig(String::from("Invalid number of customers: ten"))
        );
    }

    #[test]
    fn test_verify_fails_non_positive_mean() {
        let input = "mean_interarrival: 0\nmean_service: 1\nrequired_customers: 3";
        assert_eq!(
            format!("{}", Config::from_str(input).unwrap_err()),
            "Invalid configuration: Mean interarrival time must be positive (0)"
        );
        let input = "mean_interarrival: 1\nmean_service: -2\nrequired_customers: 3";
        assert_eq!(
            format!("{}", Config::from_str(input).unwrap_err()),
            "Invalid configuration: Mean service time must be positive (-2)"
        );
    }

    #[test]
    fn test_verify_fails_zero_customers() {
        let input = "mean_interarrival: 1\nmean_service: 1\nrequired_customers: 0";
        assert_eq!(
            format!("{}", Config::from_str(input).unwrap_err()),
            "Invalid configuration: Number of customers must be positive"
        );
    }

    #[test]
    fn test_verify_fails_zero_capacity() {
        let config = Config {
            queue_capacity: 0,
            ..Config::default()
        };
        assert!(config.verify().is_err());
    }

    #[test]
    fn test_verify_fails_invalid_lcg_seed() {
        let config = Config {
            seed: Some(0),
            ..Config::default()
        };
        assert!(config.clone().verify().is_err());
        let config = Config {
            generator: GeneratorKind::Chacha,
            ..config
        };
        assert!(config.verify().is_ok());
    }
}
