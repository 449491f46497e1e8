//! Time sources read by the scheduler

use alloc::rc::Rc;
use core::cell::Cell;

use crate::{Millis, Timestamp};

/// Monotonically non-decreasing millisecond counter.
///
/// The scheduler only ever reads the source. Any `Fn() -> u32` closure is a
/// time source, which is how firmware usually plugs in its `millis()`
/// routine.
pub trait TimeSource {
    /// Current reading of the counter
    fn now(&self) -> Timestamp;
}

impl<F> TimeSource for F
where
    F: Fn() -> u32,
{
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self())
    }
}

/// Hand-driven time source for simulations and tests.
///
/// Clones share the same counter, so a test can keep one handle and give
/// another to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Rc<Cell<u32>>,
}

impl ManualClock {
    /// Create a clock reading zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock starting at `start`
    pub fn starting_at(start: Timestamp) -> Self {
        Self {
            millis: Rc::new(Cell::new(start.as_millis())),
        }
    }

    /// Move the clock forward by `span`
    pub fn advance(&self, span: impl Into<Millis>) {
        let span = span.into();
        self.millis
            .set(self.millis.get().wrapping_add(span.as_millis()));
    }

    /// Jump to an absolute reading
    ///
    /// Setting an earlier reading breaks the monotonic contract; callers own
    /// that choice.
    pub fn set(&self, at: Timestamp) {
        self.millis.set(at.as_millis());
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.get())
    }
}
