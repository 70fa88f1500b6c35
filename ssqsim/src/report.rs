use std::fmt;

use crate::{Config, SimulationResult};

/// Text report of a finished run: the input parameters followed by the performance measures.
///
/// # Examples
///
/// ```
/// # use ssqsim::{Config, Report, SimulationResult};
/// let config = Config::default();
/// let result = SimulationResult {
///     final_time: 800.0,
///     total_delay: 400.0,
///     num_served: 1000,
///     area_queue_length: 320.0,
///     area_server_busy: 500.0,
/// };
/// let report = Report::new(&config, &result).to_string();
/// assert!(report.starts_with("Single server queuing system"));
/// assert!(report.contains("Server utilization           0.625"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    config: &'a Config,
    result: &'a SimulationResult,
}

impl<'a> Report<'a> {
    /// Creates a report of `result` obtained with `config`.
    #[must_use]
    pub fn new(config: &'a Config, result: &'a SimulationResult) -> Self {
        Self { config, result }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Single server queuing system\n")?;
        writeln!(
            f,
            "Mean interarrival time {:11.3} minutes\n",
            self.config.mean_interarrival
        )?;
        writeln!(
            f,
            "Mean service time {:16.3} minutes\n",
            self.config.mean_service
        )?;
        writeln!(
            f,
            "Number of customers {:14}\n",
            self.config.required_customers
        )?;
        writeln!(
            f,
            "\n\nAverage delay in queue {:11.3} minutes\n",
            self.result.average_delay()
        )?;
        writeln!(
            f,
            "Average number in queue {:10.3}\n",
            self.result.average_queue_length()
        )?;
        writeln!(
            f,
            "Server utilization {:15.3}\n",
            self.result.utilization()
        )?;
        write!(
            f,
            "Time simulation ended {:12.3} minutes",
            self.result.final_time
        )
    }
}
