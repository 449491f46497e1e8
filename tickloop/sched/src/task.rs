//! Timeout and interval records owned by the scheduler.

use alloc::boxed::Box;

use tickloop_core::{Millis, TaskId, Timestamp};

use crate::config::Reschedule;
use crate::scheduler::Scheduler;

/// Result of an interval callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep the interval registered and fire it again after its period.
    Continue,
    /// Remove the interval.
    Stop,
}

impl Flow {
    pub const fn is_stop(self) -> bool {
        matches!(self, Flow::Stop)
    }
}

/// `true` asks for removal, `false` keeps the interval running.
impl From<bool> for Flow {
    fn from(stop: bool) -> Self {
        if stop {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }
}

/// Callbacks that return nothing run until cancelled or abandoned.
impl From<()> for Flow {
    fn from(_: ()) -> Self {
        Flow::Continue
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Flow {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Flow::Continue => defmt::write!(fmt, "Continue"),
            Flow::Stop => defmt::write!(fmt, "Stop"),
        }
    }
}

pub(crate) type OnceFn<'a, C> = Box<dyn FnOnce(&Scheduler<'a, C>) + 'a>;
pub(crate) type RepeatFn<'a, C> = Box<dyn FnMut(&Scheduler<'a, C>) -> Flow + 'a>;

/// One-shot deferred work.
pub(crate) struct Timeout<'a, C> {
    pub(crate) id: TaskId,
    pub(crate) due: Timestamp,
    pub(crate) callback: OnceFn<'a, C>,
}

/// Deadline after which an interval is abandoned.
pub(crate) struct AbandonGuard<'a, C> {
    pub(crate) deadline: Timestamp,
    pub(crate) callback: Option<OnceFn<'a, C>>,
}

/// Recurring work, optionally guarded by an abandon deadline.
pub(crate) struct Interval<'a, C> {
    pub(crate) id: TaskId,
    pub(crate) next_due: Timestamp,
    pub(crate) period: Millis,
    /// Empty only while the callback is running.
    pub(crate) callback: Option<RepeatFn<'a, C>>,
    pub(crate) guard: Option<AbandonGuard<'a, C>>,
    /// Set once the interval stopped or was abandoned; it never fires again
    /// and waits for its pending removal.
    pub(crate) retired: bool,
}

impl<'a, C> Interval<'a, C> {
    pub(crate) fn new(
        id: TaskId,
        next_due: Timestamp,
        period: Millis,
        callback: RepeatFn<'a, C>,
        guard: Option<AbandonGuard<'a, C>>,
    ) -> Self {
        Self {
            id,
            next_due,
            period,
            callback: Some(callback),
            guard,
            retired: false,
        }
    }

    pub(crate) fn is_abandoned_at(&self, now: Timestamp) -> bool {
        self.guard
            .as_ref()
            .map_or(false, |guard| now.has_reached(guard.deadline))
    }

    /// Earliest time at which this interval has something to do.
    pub(crate) fn next_event(&self) -> Timestamp {
        match &self.guard {
            Some(guard) => self.next_due.min(guard.deadline),
            None => self.next_due,
        }
    }

    pub(crate) fn take_abandon(&mut self) -> Option<OnceFn<'a, C>> {
        self.guard.as_mut().and_then(|guard| guard.callback.take())
    }

    pub(crate) fn reschedule(&mut self, fired_at: Timestamp, policy: Reschedule) {
        self.next_due = match policy {
            Reschedule::FromFiring => fired_at + self.period,
            Reschedule::FixedRate => self.next_due + self.period,
        };
    }
}
