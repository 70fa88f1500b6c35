/// Simulation clock: the current time and the time of the previously processed event.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimulationClock {
    sim_time: f64,
    time_last_event: f64,
}

impl SimulationClock {
    /// Current simulation time.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.sim_time
    }

    /// Time of the last event accounted for in the statistics.
    #[must_use]
    pub fn time_last_event(&self) -> f64 {
        self.time_last_event
    }

    /// Moves the clock to `time`. Time never goes back.
    pub fn advance(&mut self, time: f64) {
        debug_assert!(
            time >= self.sim_time,
            "clock moving back from {} to {}",
            self.sim_time,
            time
        );
        self.sim_time = time;
    }

    /// Returns the time elapsed since the last event and marks the current time as the last event.
    pub fn mark_event(&mut self) -> f64 {
        let elapsed = self.sim_time - self.time_last_event;
        self.time_last_event = self.sim_time;
        elapsed
    }
}
