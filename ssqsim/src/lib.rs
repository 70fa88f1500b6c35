//! Single-server queue simulation.
//!
//! Customers arrive to a single server; whoever finds the server busy waits in a FIFO queue of
//! limited capacity. The run is a discrete event simulation with two event types, arrival and
//! departure, and estimates the average delay in queue, the time-average number of waiting
//! customers, and the server utilization.
//!
//! # Example
//!
//! ```
//! # fn main() -> ssqsim::Result<()> {
//! let config = ssqsim::Config {
//!     mean_interarrival: 1.0,
//!     mean_service: 0.5,
//!     required_customers: 500,
//!     ..ssqsim::Config::default()
//! };
//! let result = ssqsim::run(&config)?;
//! assert_eq!(result.num_served, 500);
//! assert!(result.utilization() > 0.0 && result.utilization() <= 1.0);
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::default_trait_access,
    clippy::inline_always
)]

mod clock;
pub use clock::SimulationClock;

pub mod config;
pub use config::Config;

mod error;
pub use error::{Error, Result};

mod event;
pub use event::{Event, EventType, FutureEventList, NUM_EVENT_TYPES};

mod queue;
pub use queue::{WaitingQueue, Q_LIMIT};

mod replication;
pub use replication::{replicate, replicate_with, replication_seeds, Measure, Summary};

mod report;
pub use report::Report;

mod simulation;
pub use simulation::{run, Simulation};

mod stats;
pub use stats::{SimulationResult, StatisticsAccumulator};

pub mod variate;
pub use variate::{
    GeneratorKind, Lcg, RngSource, Stream, StreamLayout, UniformSource, VariateGenerator,
};

/// Whether the server is serving a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ServerStatus {
    /// Nobody is being served; no departure is scheduled.
    Idle,
    /// A customer is being served; a departure is scheduled.
    Busy,
}

impl ServerStatus {
    /// 1 if busy, 0 if idle.
    #[must_use]
    pub fn indicator(self) -> f64 {
        match self {
            ServerStatus::Idle => 0.0,
            ServerStatus::Busy => 1.0,
        }
    }
}

impl Default for ServerStatus {
    fn default() -> Self {
        Self::Idle
    }
}
