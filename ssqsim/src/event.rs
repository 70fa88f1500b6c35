//! Event types and the future event list.

use std::fmt;

use strum::IntoEnumIterator;

use crate::{Error, Result};

/// Number of declared event types.
pub const NUM_EVENT_TYPES: usize = 2;

/// Kinds of events. The declaration order is significant: on equal times, the event type
/// declared first is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::EnumIter, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    /// A customer arrives to the system.
    Arrival,
    /// The server finishes serving a customer.
    Departure,
}

impl EventType {
    fn index(self) -> usize {
        self as usize
    }
}

/// An event selected for processing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    /// Type of the event.
    pub event_type: EventType,
    /// Time at which it occurs.
    pub time: f64,
}

impl fmt::Display for Event {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{:10.4} - {}", self.time, self.event_type)
    }
}

/// Holds, for each event type, the time of its next occurrence, if one is scheduled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FutureEventList {
    slots: [Option<f64>; NUM_EVENT_TYPES],
}

impl FutureEventList {
    /// Schedules the next occurrence of `event_type` at `time`, replacing any previous one.
    pub fn schedule(&mut self, event_type: EventType, time: f64) {
        self.slots[event_type.index()] = Some(time);
    }

    /// Removes the pending occurrence of `event_type`, if any.
    pub fn cancel(&mut self, event_type: EventType) {
        self.slots[event_type.index()] = None;
    }

    /// Time of the pending occurrence of `event_type`, if any.
    #[must_use]
    pub fn scheduled(&self, event_type: EventType) -> Option<f64> {
        self.slots[event_type.index()]
    }

    /// Returns `true` if no event type is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Selects the earliest scheduled event. Every event type is inspected once; a later type
    /// replaces the current candidate only if strictly earlier.
    ///
    /// The slot of the selected event is left in place; handlers reschedule or cancel it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EventListExhausted`] if nothing is scheduled. `now` is only used to
    /// report when it happened.
    pub fn next_event(&self, now: f64) -> Result<Event> {
        let mut next: Option<Event> = None;
        for event_type in EventType::iter() {
            if let Some(time) = self.scheduled(event_type) {
                if next.map_or(true, |candidate| time < candidate.time) {
                    next = Some(Event { event_type, time });
                }
            }
        }
        next.ok_or(Error::EventListExhausted { time: now })
    }
}
