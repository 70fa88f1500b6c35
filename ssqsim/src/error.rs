use thiserror::Error;

/// Result type returned by the simulation.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a simulation run.
///
/// None of them can be recovered from within a run: the model has either no defined next state
/// or its load exceeds the configured buffer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// No event type has a scheduled time.
    #[error("Event list empty at time {time}")]
    EventListExhausted {
        /// Simulation time at which the event list was found empty.
        time: f64,
    },
    /// A customer arrived to a full waiting queue.
    #[error("Overflow of array time_arrival at time {time} (capacity {capacity})")]
    QueueCapacityExceeded {
        /// Simulation time of the arrival that did not fit.
        time: f64,
        /// Capacity of the waiting queue.
        capacity: usize,
    },
    /// Configuration rejected before the run started.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Process exit code used by the command line tool for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::EventListExhausted { .. } => 1,
            Error::QueueCapacityExceeded { .. } => 2,
            Error::InvalidConfig(_) => 3,
        }
    }
}
