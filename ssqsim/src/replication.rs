//! Independent replications of one configuration with different seeds.

use derive_more::Display;
use rayon::prelude::*;
use serde::Serialize;

use crate::variate::{DEFAULT_SEED, MODULUS};
use crate::{Config, GeneratorKind, Result, Simulation, SimulationResult};

/// Consecutive seeds for `n` replications, starting at the configured seed.
///
/// LCG seeds wrap around within `[1, 2^31 - 2]`; ChaCha seeds wrap around `u64`.
#[must_use]
pub fn replication_seeds(config: &Config, n: u64) -> Vec<u64> {
    let first = config.seed.unwrap_or(DEFAULT_SEED);
    match config.generator {
        GeneratorKind::Lcg => {
            let period = MODULUS - 1;
            let offset = (first % period + period - 1) % period;
            (0..n).map(|i| (offset + i % period) % period + 1).collect()
        }
        GeneratorKind::Chacha => (0..n).map(|i| first.wrapping_add(i)).collect(),
    }
}

/// Runs one simulation per seed, in parallel. Results are returned in the order of `seeds`.
///
/// Every run has its own state and random streams; only `config` is shared.
#[must_use]
pub fn replicate(config: &Config, seeds: &[u64]) -> Vec<Result<SimulationResult>> {
    replicate_with(config, seeds, |_, _| {})
}

/// Same as [`replicate`] but calls `on_finished` with the seed and outcome of each run as soon
/// as it finishes. The calls may come from different threads and in any order.
pub fn replicate_with<F>(
    config: &Config,
    seeds: &[u64],
    on_finished: F,
) -> Vec<Result<SimulationResult>>
where
    F: Fn(u64, &Result<SimulationResult>) + Sync,
{
    seeds
        .par_iter()
        .map(|&seed| {
            let config = Config {
                seed: Some(seed),
                ..config.clone()
            };
            let result = Simulation::new(&config).and_then(Simulation::run);
            if let Err(err) = &result {
                log::warn!("Replication with seed {} failed: {}", seed, err);
            }
            on_finished(seed, &result);
            result
        })
        .collect()
}

/// Sample mean and standard deviation of a measure across replications.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Display)]
#[display(fmt = "{:.3} (sd {:.3})", mean, std_dev)]
pub struct Measure {
    /// Sample mean.
    pub mean: f64,
    /// Sample standard deviation; 0 for a single replication.
    pub std_dev: f64,
}

impl Measure {
    fn from_values(values: &[f64]) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std_dev = if values.len() > 1 {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            0.0
        };
        Self { mean, std_dev }
    }
}

/// Aggregated performance measures of several replications.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    /// Number of aggregated replications.
    pub replications: usize,
    /// Average delay in queue.
    pub average_delay: Measure,
    /// Time-average number in queue.
    pub average_queue_length: Measure,
    /// Server utilization.
    pub utilization: Measure,
}

impl Summary {
    /// Aggregates `results`. Returns `None` if there are none.
    #[must_use]
    pub fn from_results(results: &[SimulationResult]) -> Option<Self> {
        if results.is_empty() {
            return None;
        }
        let measure = |f: fn(&SimulationResult) -> f64| {
            Measure::from_values(&results.iter().map(f).collect::<Vec<_>>())
        };
        Some(Self {
            replications: results.len(),
            average_delay: measure(SimulationResult::average_delay),
            average_queue_length: measure(SimulationResult::average_queue_length),
            utilization: measure(SimulationResult::utilization),
        })
    }
}
