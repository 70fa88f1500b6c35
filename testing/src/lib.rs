//! Helpers for driving simulations with predictable random draws in unit tests.

#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::default_trait_access)]

use std::cell::RefCell;
use std::rc::Rc;

/// Replays a fixed sequence of uniform draws, one per call to [`Script::next_value`].
///
/// This is meant for testing: wrapped in a closure, it becomes a source of uniform values that
/// a simulation consumes in a known order.
///
/// # Examples
///
/// ```
/// # use testing::Script;
/// let mut script = Script::new(vec![0.5, 0.25]);
/// assert_eq!(script.next_value(), 0.5);
/// assert_eq!(script.next_value(), 0.25);
/// assert_eq!(script.remaining(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Script {
    values: Vec<f64>,
    position: usize,
}

impl Script {
    /// Constructs a script replaying `values` in order.
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            position: 0,
        }
    }

    /// Constructs a script that yields the uniform values producing the given exponential gaps.
    /// Each element is a pair `(gap, mean)`. See [`uniform_for`].
    #[must_use]
    pub fn from_gaps(gaps: &[(f64, f64)]) -> Self {
        Self::new(
            gaps.iter()
                .map(|&(gap, mean)| uniform_for(gap, mean))
                .collect(),
        )
    }

    /// Returns the next scripted value.
    ///
    /// # Panics
    ///
    /// Panics when the script is exhausted; a test consuming more draws than scripted is broken.
    pub fn next_value(&mut self) -> f64 {
        let value = *self.values.get(self.position).unwrap_or_else(|| {
            panic!(
                "script exhausted after {} draws",
                self.position
            )
        });
        self.position += 1;
        value
    }

    /// Number of values not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.values.len() - self.position
    }

    /// Turns the script into a closure yielding its values.
    pub fn into_fn(mut self) -> impl FnMut() -> f64 {
        move || self.next_value()
    }
}

/// Records every value produced by a wrapped source.
///
/// The record is shared, so a clone of the recorder can be inspected after the source itself
/// has been moved into a simulation.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    values: Rc<RefCell<Vec<f64>>>,
}

impl Recorder {
    /// Wraps `source`, returning a closure that records each value before yielding it.
    pub fn wrap<F>(&self, mut source: F) -> impl FnMut() -> f64
    where
        F: FnMut() -> f64,
    {
        let values = Rc::clone(&self.values);
        move || {
            let value = source();
            values.borrow_mut().push(value);
            value
        }
    }

    /// Returns a copy of all values recorded so far.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.values.borrow().clone()
    }
}

/// Returns the uniform value `u` for which `-mean * ln(u) == gap` (up to rounding).
///
/// # Examples
///
/// ```
/// # use testing::uniform_for;
/// let u = uniform_for(2.0, 1.0);
/// assert!((-1.0 * u.ln() - 2.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn uniform_for(gap: f64, mean: f64) -> f64 {
    (-gap / mean).exp()
}
