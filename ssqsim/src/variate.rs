//! Sources of uniform random draws and the exponential variates derived from them.

use crate::{Config, Error, Result};

use rand::distributions::Open01;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Modulus of the multiplicative generator, the Mersenne prime `2^31 - 1`.
pub const MODULUS: u64 = 2_147_483_647;

/// Multiplier of the multiplicative generator.
pub const MULTIPLIER: u64 = 630_360_016;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 1_973_272_912;

/// Number of draws separating the starting points of two derived [`Lcg`] streams.
pub const STREAM_SPACING: u64 = 100_000;

/// Anything that produces uniform values in the open interval `(0, 1)`.
///
/// Implemented by any `FnMut() -> f64` closure, which lets tests script exact draw sequences.
pub trait UniformSource {
    /// Draws the next value. Must never return 0, whose logarithm is undefined.
    fn uniform(&mut self) -> f64;
}

impl<F> UniformSource for F
where
    F: FnMut() -> f64,
{
    fn uniform(&mut self) -> f64 {
        self()
    }
}

/// Prime modulus multiplicative linear congruential generator.
///
/// Computes `z = 630360016 * z mod (2^31 - 1)` and returns the top 24 bits of `z` with the lowest
/// of them forced to 1, divided by `2^24`. Therefore, a draw is never exactly 0 nor 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    /// Creates a generator starting at `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `seed` is not in `[1, 2^31 - 2]`.
    pub fn new(seed: u64) -> Result<Self> {
        if seed == 0 || seed >= MODULUS {
            return Err(Error::InvalidConfig(format!(
                "LCG seed must be in [1, {}] ({})",
                MODULUS - 1,
                seed
            )));
        }
        Ok(Self { state: seed })
    }

    /// Current state, i.e., the seed of the next draw.
    #[must_use]
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Returns a generator positioned `steps` draws ahead of this one.
    #[must_use]
    pub fn jump(&self, steps: u64) -> Self {
        Self {
            state: self.state * pow_mod(MULTIPLIER, steps, MODULUS) % MODULUS,
        }
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Self {
            state: DEFAULT_SEED,
        }
    }
}

impl UniformSource for Lcg {
    fn uniform(&mut self) -> f64 {
        self.state = self.state * MULTIPLIER % MODULUS;
        #[allow(clippy::cast_precision_loss)]
        let top = ((self.state >> 7) | 1) as f64;
        top / 16_777_216.0
    }
}

fn pow_mod(base: u64, mut exp: u64, modulus: u64) -> u64 {
    let mut result = 1;
    let mut base = base % modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % modulus;
        }
        base = base * base % modulus;
        exp >>= 1;
    }
    result
}

/// Adapts any [`Rng`] to a [`UniformSource`] by sampling the open interval.
#[derive(Debug, Clone)]
pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng> RngSource<R> {
    /// Wraps `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> UniformSource for RngSource<R> {
    fn uniform(&mut self) -> f64 {
        self.rng.sample(Open01)
    }
}

/// Which pseudo-random generator backs the variates.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// See [`Lcg`].
    Lcg,
    /// ChaCha with 8 rounds, sampled through [`RngSource`].
    Chacha,
}

impl Default for GeneratorKind {
    fn default() -> Self {
        Self::Lcg
    }
}

/// How sampling purposes map onto generator streams.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::EnumString, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StreamLayout {
    /// One stream feeds both interarrival and service draws, in event order.
    Shared,
    /// Interarrival and service draws come from independent streams.
    Split,
}

impl Default for StreamLayout {
    fn default() -> Self {
        Self::Shared
    }
}

/// Purpose of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stream {
    /// Time between two consecutive arrivals.
    Interarrival,
    /// Time it takes to serve one customer.
    Service,
}

/// Produces the exponential variates consumed by the event handlers.
pub struct VariateGenerator {
    interarrival: Box<dyn UniformSource>,
    service: Option<Box<dyn UniformSource>>,
}

impl VariateGenerator {
    /// Uses one source for every draw.
    pub fn shared<U: UniformSource + 'static>(source: U) -> Self {
        Self {
            interarrival: Box::new(source),
            service: None,
        }
    }

    /// Uses separate sources for interarrival and service draws.
    pub fn split<A, S>(interarrival: A, service: S) -> Self
    where
        A: UniformSource + 'static,
        S: UniformSource + 'static,
    {
        Self {
            interarrival: Box::new(interarrival),
            service: Some(Box::new(service)),
        }
    }

    /// Builds the generator described by `config`.
    ///
    /// In the split layout, the service stream of the LCG starts [`STREAM_SPACING`] draws ahead
    /// of the interarrival stream, while ChaCha uses its stream number 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the seed is invalid for the chosen generator.
    pub fn from_config(config: &Config) -> Result<Self> {
        let seed = config.seed.unwrap_or(DEFAULT_SEED);
        match (config.generator, config.streams) {
            (GeneratorKind::Lcg, StreamLayout::Shared) => Ok(Self::shared(Lcg::new(seed)?)),
            (GeneratorKind::Lcg, StreamLayout::Split) => {
                let lcg = Lcg::new(seed)?;
                let service = lcg.jump(STREAM_SPACING);
                Ok(Self::split(lcg, service))
            }
            (GeneratorKind::Chacha, StreamLayout::Shared) => Ok(Self::shared(RngSource::new(
                ChaCha8Rng::seed_from_u64(seed),
            ))),
            (GeneratorKind::Chacha, StreamLayout::Split) => {
                let mut service = ChaCha8Rng::seed_from_u64(seed);
                service.set_stream(1);
                Ok(Self::split(
                    RngSource::new(ChaCha8Rng::seed_from_u64(seed)),
                    RngSource::new(service),
                ))
            }
        }
    }

    /// Draws a uniform value from the source assigned to `stream`.
    pub fn uniform(&mut self, stream: Stream) -> f64 {
        match (stream, self.service.as_mut()) {
            (Stream::Service, Some(service)) => service.uniform(),
            _ => self.interarrival.uniform(),
        }
    }

    /// Draws an exponential variate with the given mean: `-mean * ln(u)`.
    pub fn exponential(&mut self, stream: Stream, mean: f64) -> f64 {
        let u = self.uniform(stream);
        let value = -mean * u.ln();
        log::trace!("Drew {} variate {} (u = {})", stream, value, u);
        value
    }
}

impl std::fmt::Debug for VariateGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariateGenerator")
            .field("split", &self.service.is_some())
            .finish()
    }
}
