use std::collections::VecDeque;

/// Default capacity of the waiting queue.
pub const Q_LIMIT: usize = 100;

/// FIFO of arrival times of customers waiting for the server, limited to a fixed capacity.
/// Push operations fail once the queue is full.
///
/// # Examples
///
/// ```
/// # use ssqsim::WaitingQueue;
/// let mut queue = WaitingQueue::bounded(2);
/// assert!(queue.push_back(1.0).is_ok());
/// assert!(queue.push_back(2.0).is_ok());
/// assert_eq!(queue.push_back(3.0), Err(3.0));
/// assert_eq!(queue.pop_front(), Some(1.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WaitingQueue {
    inner: VecDeque<f64>,
    capacity: usize,
}

impl Default for WaitingQueue {
    fn default() -> Self {
        Self::bounded(Q_LIMIT)
    }
}

impl WaitingQueue {
    /// Creates an empty queue with the given capacity.
    #[must_use]
    pub fn bounded(capacity: usize) -> Self {
        Self {
            inner: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends an arrival time to the back of the queue.
    /// If the queue is full, it is left untouched and the value is given back.
    ///
    /// # Errors
    ///
    /// Returns `Err(arrival_time)` if the queue is full.
    pub fn push_back(&mut self, arrival_time: f64) -> Result<(), f64> {
        if self.inner.len() < self.capacity {
            self.inner.push_back(arrival_time);
            Ok(())
        } else {
            Err(arrival_time)
        }
    }

    /// Removes the earliest arrival time and returns it, or `None` if the queue is empty.
    pub fn pop_front(&mut self) -> Option<f64> {
        self.inner.pop_front()
    }

    /// Number of waiting customers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if nobody is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Maximum number of waiting customers.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates over the arrival times, earliest first.
    pub fn iter(&self) -> impl Iterator<Item = &f64> {
        self.inner.iter()
    }
}
