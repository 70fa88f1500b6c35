use crate::{
    Config, Error, Event, EventType, FutureEventList, Result, ServerStatus, SimulationClock,
    SimulationResult, StatisticsAccumulator, Stream, VariateGenerator, WaitingQueue,
};

/// Single-server queue simulation.
///
/// Owns the whole state of one run. Each [`step`](Simulation::step) processes a single event:
/// the clock is advanced to the earliest scheduled event, the time-weighted statistics are
/// updated, and the event is dispatched to its handler.
#[derive(Debug)]
pub struct Simulation {
    mean_interarrival: f64,
    mean_service: f64,
    required_customers: usize,
    clock: SimulationClock,
    server: ServerStatus,
    queue: WaitingQueue,
    event_list: FutureEventList,
    statistics: StatisticsAccumulator,
    variates: VariateGenerator,
}

impl Simulation {
    /// Creates a simulation with the random streams described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` does not verify.
    pub fn new(config: &Config) -> Result<Self> {
        let config = config.clone().verify()?;
        let variates = VariateGenerator::from_config(&config)?;
        Ok(Self::with_variates(&config, variates))
    }

    /// Creates a simulation drawing from the given variate generator.
    ///
    /// The server starts idle with an empty queue, and the first arrival is scheduled with one
    /// interarrival draw. `config` is expected to be verified.
    #[must_use]
    pub fn with_variates(config: &Config, mut variates: VariateGenerator) -> Self {
        let mut event_list = FutureEventList::default();
        event_list.schedule(
            EventType::Arrival,
            variates.exponential(Stream::Interarrival, config.mean_interarrival),
        );
        Self {
            mean_interarrival: config.mean_interarrival,
            mean_service: config.mean_service,
            required_customers: config.required_customers,
            clock: SimulationClock::default(),
            server: ServerStatus::Idle,
            queue: WaitingQueue::bounded(config.queue_capacity),
            event_list,
            statistics: StatisticsAccumulator::default(),
            variates,
        }
    }

    /// Runs until the required number of customers has been served.
    ///
    /// # Errors
    ///
    /// Returns the first fatal error: [`Error::EventListExhausted`] or
    /// [`Error::QueueCapacityExceeded`].
    pub fn run(mut self) -> Result<SimulationResult> {
        log::info!(
            "Starting simulation for {} customers",
            self.required_customers
        );
        while !self.is_finished() {
            self.step()?;
        }
        let result = self.result();
        log::info!(
            "Simulation finished at time {} after serving {} customers",
            result.final_time,
            result.num_served
        );
        Ok(result)
    }

    /// Processes the next event and returns it.
    ///
    /// # Errors
    ///
    /// See [`Simulation::run`].
    pub fn step(&mut self) -> Result<Event> {
        let event = self.timing()?;
        self.statistics
            .update(&mut self.clock, self.queue.len(), self.server);
        log::trace!("{}", event);
        match event.event_type {
            EventType::Arrival => self.arrive()?,
            EventType::Departure => self.depart(),
        }
        Ok(event)
    }

    /// Determines the next event and advances the clock to it.
    fn timing(&mut self) -> Result<Event> {
        let event = self.event_list.next_event(self.clock.time()).map_err(|err| {
            log::warn!("{}", err);
            err
        })?;
        self.clock.advance(event.time);
        Ok(event)
    }

    fn arrive(&mut self) -> Result<()> {
        let now = self.clock.time();
        let interarrival = self
            .variates
            .exponential(Stream::Interarrival, self.mean_interarrival);
        self.event_list
            .schedule(EventType::Arrival, now + interarrival);
        match self.server {
            ServerStatus::Busy => {
                if self.queue.push_back(now).is_err() {
                    let err = Error::QueueCapacityExceeded {
                        time: now,
                        capacity: self.queue.capacity(),
                    };
                    log::warn!("{}", err);
                    return Err(err);
                }
                log::debug!("[{}] Customer waits; queue length {}", now, self.queue.len());
            }
            ServerStatus::Idle => {
                self.statistics.record_delay(0.0);
                self.server = ServerStatus::Busy;
                self.schedule_departure();
                log::debug!("[{}] Customer served immediately", now);
            }
        }
        Ok(())
    }

    fn depart(&mut self) {
        let now = self.clock.time();
        if let Some(arrival_time) = self.queue.pop_front() {
            self.statistics.record_delay(now - arrival_time);
            self.schedule_departure();
            log::debug!(
                "[{}] Customer waited {}; queue length {}",
                now,
                now - arrival_time,
                self.queue.len()
            );
        } else {
            self.server = ServerStatus::Idle;
            self.event_list.cancel(EventType::Departure);
            log::debug!("[{}] Server idle", now);
        }
    }

    fn schedule_departure(&mut self) {
        let service = self.variates.exponential(Stream::Service, self.mean_service);
        self.event_list
            .schedule(EventType::Departure, self.clock.time() + service);
    }

    /// Returns `true` once the required number of customers has been served.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.statistics.num_served() >= self.required_customers
    }

    /// Snapshot of the statistics at the current time.
    #[must_use]
    pub fn result(&self) -> SimulationResult {
        self.statistics.finish(self.clock.time())
    }

    /// Simulation clock.
    #[must_use]
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Server status.
    #[must_use]
    pub fn server(&self) -> ServerStatus {
        self.server
    }

    /// Waiting customers.
    #[must_use]
    pub fn queue(&self) -> &WaitingQueue {
        &self.queue
    }

    /// Pending events.
    #[must_use]
    pub fn event_list(&self) -> &FutureEventList {
        &self.event_list
    }

    /// Statistics accumulated so far.
    #[must_use]
    pub fn statistics(&self) -> &StatisticsAccumulator {
        &self.statistics
    }
}

/// Runs a simulation described by `config` to completion.
///
/// # Errors
///
/// Returns [`Error::InvalidConfig`] for a configuration that does not verify, or any fatal
/// error of the run.
pub fn run(config: &Config) -> Result<SimulationResult> {
    Simulation::new(config)?.run()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Q_LIMIT;
    use float_cmp::approx_eq;
    use rstest::{fixture, rstest};
    use testing::Script;

    #[fixture]
    fn config() -> Config {
        Config {
            mean_interarrival: 1.0,
            mean_service: 1.0,
            required_customers: 10,
            ..Config::default()
        }
    }

    fn scripted(config: &Config, gaps: &[(f64, f64)]) -> Simulation {
        Simulation::with_variates(
            config,
            VariateGenerator::shared(Script::from_gaps(gaps).into_fn()),
        )
    }

    #[rstest]
    fn test_initial_state(config: Config) {
        let sim = scripted(&config, &[(2.0, 1.0)]);
        assert_eq!(sim.clock().time(), 0.0);
        assert_eq!(sim.server(), ServerStatus::Idle);
        assert!(sim.queue().is_empty());
        assert!(approx_eq!(
            f64,
            sim.event_list().scheduled(EventType::Arrival).unwrap(),
            2.0,
            epsilon = 1e-12
        ));
        assert_eq!(sim.event_list().scheduled(EventType::Departure), None);
        assert_eq!(*sim.statistics(), StatisticsAccumulator::default());
    }

    #[test]
    fn test_scenario_single_customer() {
        let config = Config {
            mean_interarrival: 1.0,
            mean_service: 0.5,
            required_customers: 1,
            ..Config::default()
        };
        let sim = Simulation::with_variates(
            &config,
            VariateGenerator::shared(Script::new(vec![0.5, 0.5, 0.5]).into_fn()),
        );
        let result = sim.run().unwrap();
        assert!(approx_eq!(f64, result.final_time, 0.6931, epsilon = 1e-4));
        assert_eq!(result.num_served, 1);
        assert_eq!(result.total_delay, 0.0);
        assert_eq!(result.area_queue_length, 0.0);
        assert_eq!(result.area_server_busy, 0.0);
    }

    #[rstest]
    fn test_idle_arrival(config: Config) {
        let mut sim = scripted(&config, &[(1.0, 1.0), (3.0, 1.0), (2.0, 1.0)]);
        let event = sim.step().unwrap();
        assert_eq!(event.event_type, EventType::Arrival);
        assert_eq!(sim.server(), ServerStatus::Busy);
        assert_eq!(sim.statistics().num_served(), 1);
        assert_eq!(sim.statistics().total_delay(), 0.0);
        assert!(sim.queue().is_empty());
        assert!(approx_eq!(
            f64,
            sim.event_list().scheduled(EventType::Arrival).unwrap(),
            4.0,
            epsilon = 1e-12
        ));
        assert!(approx_eq!(
            f64,
            sim.event_list().scheduled(EventType::Departure).unwrap(),
            3.0,
            epsilon = 1e-12
        ));
    }

    #[rstest]
    fn test_queued_customers_leave_in_order(config: Config) {
        let mut sim = scripted(
            &config,
            &[
                (1.0, 1.0), // first arrival at 1.0
                (0.5, 1.0), // second arrival at 1.5
                (2.0, 1.0), // first departure at 3.0
                (0.5, 1.0), // third arrival at 2.0
                (5.0, 1.0), // fourth arrival at 7.0
                (1.0, 1.0), // second departure at 4.0
            ],
        );
        for _ in 0..3 {
            assert_eq!(sim.step().unwrap().event_type, EventType::Arrival);
        }
        assert_eq!(sim.queue().len(), 2);
        let waiting: Vec<f64> = sim.queue().iter().copied().collect();
        assert!(approx_eq!(f64, waiting[0], 1.5, epsilon = 1e-12));
        assert!(approx_eq!(f64, waiting[1], 2.0, epsilon = 1e-12));
        assert_eq!(sim.statistics().num_served(), 1);

        let departure = sim.step().unwrap();
        assert_eq!(departure.event_type, EventType::Departure);
        assert!(approx_eq!(f64, departure.time, 3.0, epsilon = 1e-12));
        assert_eq!(sim.statistics().num_served(), 2);
        assert!(approx_eq!(
            f64,
            sim.statistics().total_delay(),
            departure.time - waiting[0],
            epsilon = 1e-12
        ));
        assert_eq!(sim.queue().iter().copied().collect::<Vec<_>>(), vec![waiting[1]]);
        assert_eq!(sim.server(), ServerStatus::Busy);
        assert!(approx_eq!(
            f64,
            sim.event_list().scheduled(EventType::Departure).unwrap(),
            4.0,
            epsilon = 1e-12
        ));
        // Queue had 0 customers on [1, 1.5), 1 on [1.5, 2), and 2 on [2, 3).
        assert!(approx_eq!(
            f64,
            sim.statistics().area_queue_length(),
            2.5,
            epsilon = 1e-12
        ));
        assert!(approx_eq!(
            f64,
            sim.statistics().area_server_busy(),
            2.0,
            epsilon = 1e-12
        ));
    }

    #[rstest]
    fn test_departure_to_empty_queue(config: Config) {
        let mut sim = scripted(&config, &[(1.0, 1.0), (5.0, 1.0), (1.0, 1.0)]);
        sim.step().unwrap();
        let departure = sim.step().unwrap();
        assert_eq!(departure.event_type, EventType::Departure);
        assert_eq!(sim.server(), ServerStatus::Idle);
        assert_eq!(sim.event_list().scheduled(EventType::Departure), None);
        assert_eq!(sim.statistics().num_served(), 1);
    }

    #[test]
    fn test_queue_overflow() {
        let config = Config {
            mean_interarrival: 1.0,
            mean_service: 1.0,
            required_customers: 100,
            queue_capacity: 2,
            ..Config::default()
        };
        let mut sim = scripted(
            &config,
            &[
                (1.0, 1.0),
                (0.1, 1.0),
                (100.0, 1.0),
                (0.1, 1.0),
                (0.1, 1.0),
                (0.1, 1.0),
            ],
        );
        for _ in 0..3 {
            sim.step().unwrap();
        }
        assert_eq!(sim.queue().len(), 2);
        match sim.step() {
            Err(Error::QueueCapacityExceeded { time, capacity }) => {
                assert!(approx_eq!(f64, time, 1.3, epsilon = 1e-12));
                assert_eq!(capacity, 2);
            }
            other => panic!("expected queue overflow, got {:?}", other),
        }
        assert_eq!(sim.queue().len(), 2);
    }

    #[test]
    fn test_overflow_at_default_capacity() {
        let config = Config {
            mean_interarrival: 1.0,
            mean_service: 1.0,
            required_customers: 1000,
            ..Config::default()
        };
        assert_eq!(config.queue_capacity, Q_LIMIT);
        // One customer in service, then Q_LIMIT + 1 arrivals before the first departure.
        let mut gaps = vec![(1.0, 1.0), (0.1, 1.0), (100.0, 1.0)];
        gaps.extend(std::iter::repeat((0.1, 1.0)).take(Q_LIMIT + 1));
        let mut sim = scripted(&config, &gaps);
        for _ in 0..=Q_LIMIT {
            assert_eq!(sim.step().unwrap().event_type, EventType::Arrival);
        }
        assert_eq!(sim.queue().len(), Q_LIMIT);
        match sim.step() {
            Err(Error::QueueCapacityExceeded { time, capacity }) => {
                assert!(approx_eq!(f64, time, 11.1, epsilon = 1e-9));
                assert_eq!(capacity, Q_LIMIT);
            }
            other => panic!("expected queue overflow, got {:?}", other),
        }
        assert_eq!(sim.queue().len(), Q_LIMIT);
        assert_eq!(sim.statistics().num_served(), 1);
    }

    #[rstest]
    fn test_exhausted_event_list(config: Config) {
        let mut sim = scripted(&config, &[(1.0, 1.0), (1.0, 1.0), (1.0, 1.0)]);
        sim.step().unwrap();
        sim.event_list.cancel(EventType::Arrival);
        sim.event_list.cancel(EventType::Departure);
        let now = sim.clock().time();
        assert_eq!(sim.step(), Err(Error::EventListExhausted { time: now }));
    }

    #[test]
    fn test_invalid_config() {
        let config = Config {
            mean_service: 0.0,
            ..Config::default()
        };
        assert!(matches!(
            Simulation::new(&config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[rstest]
    fn test_stops_at_required_customers(config: Config) {
        let result = Simulation::new(&config).unwrap().run().unwrap();
        assert_eq!(result.num_served, config.required_customers);
    }
}
