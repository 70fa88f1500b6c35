//! Running statistics and the final result record.

use serde::{Deserialize, Serialize};

use crate::{ServerStatus, SimulationClock};

/// Running sums from which the performance measures are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatisticsAccumulator {
    total_delay: f64,
    num_served: usize,
    area_queue_length: f64,
    area_server_busy: f64,
}

impl StatisticsAccumulator {
    /// Integrates queue length and the busy indicator over the time since the last event.
    ///
    /// The state is constant between events, so the left endpoint sum is exact.
    pub fn update(
        &mut self,
        clock: &mut SimulationClock,
        queue_length: usize,
        server: ServerStatus,
    ) {
        let elapsed = clock.mark_event();
        #[allow(clippy::cast_precision_loss)]
        let queue_length = queue_length as f64;
        self.area_queue_length += queue_length * elapsed;
        self.area_server_busy += server.indicator() * elapsed;
    }

    /// Counts a customer that has finished waiting after `delay` time units.
    pub fn record_delay(&mut self, delay: f64) {
        self.total_delay += delay;
        self.num_served += 1;
    }

    /// Sum of all delays in the queue.
    #[must_use]
    pub fn total_delay(&self) -> f64 {
        self.total_delay
    }

    /// Number of customers that have finished waiting.
    #[must_use]
    pub fn num_served(&self) -> usize {
        self.num_served
    }

    /// Area under the queue length function.
    #[must_use]
    pub fn area_queue_length(&self) -> f64 {
        self.area_queue_length
    }

    /// Area under the server busy indicator.
    #[must_use]
    pub fn area_server_busy(&self) -> f64 {
        self.area_server_busy
    }

    /// Freezes the statistics at `final_time`.
    #[must_use]
    pub fn finish(&self, final_time: f64) -> SimulationResult {
        SimulationResult {
            final_time,
            total_delay: self.total_delay,
            num_served: self.num_served,
            area_queue_length: self.area_queue_length,
            area_server_busy: self.area_server_busy,
        }
    }
}

/// Outcome of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Time of the last processed event.
    pub final_time: f64,
    /// Sum of delays of all served customers.
    pub total_delay: f64,
    /// Number of served customers.
    pub num_served: usize,
    /// Area under the queue length function.
    pub area_queue_length: f64,
    /// Area under the server busy indicator.
    pub area_server_busy: f64,
}

impl SimulationResult {
    /// Average delay in queue: `total_delay / num_served`.
    #[must_use]
    pub fn average_delay(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let served = self.num_served as f64;
        self.total_delay / served
    }

    /// Time-average number of customers in queue: `area_queue_length / final_time`.
    #[must_use]
    pub fn average_queue_length(&self) -> f64 {
        self.area_queue_length / self.final_time
    }

    /// Fraction of time the server was busy: `area_server_busy / final_time`.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        self.area_server_busy / self.final_time
    }
}
