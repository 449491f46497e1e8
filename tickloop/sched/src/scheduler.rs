//! Cooperative timeout/interval scheduler.
//!
//! The scheduler never runs on its own. The embedding loop calls
//! [`Scheduler::tick`] as often as it likes and each call does at most one
//! kind of work: apply queued interval removals, apply queued timeout
//! removals, or fire what is due. Every operation takes `&self`; callbacks
//! receive the scheduler and may register or cancel work while a poll is in
//! progress. No borrow of the internal storage is held while user code runs.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use log::{debug, trace};
use tickloop_core::{IdAllocator, Millis, TaskId, TimeSource, Timestamp, TraceHook, TraceRecord};

use crate::config::SchedulerConfig;
use crate::pending::{remove_marked, PendingRemovals};
use crate::task::{AbandonGuard, Flow, Interval, OnceFn, RepeatFn, Timeout};
use crate::trace::Tracer;

/// Builder for a [`Scheduler`].
pub struct SchedulerBuilder<C> {
    clock: C,
    config: SchedulerConfig,
    trace: Option<TraceHook>,
}

impl<C: TimeSource> SchedulerBuilder<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            config: SchedulerConfig::default(),
            trace: None,
        }
    }

    pub fn config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_trace_hook(mut self, hook: TraceHook) -> Self {
        self.trace = Some(hook);
        self
    }

    pub fn build<'a>(self) -> Scheduler<'a, C> {
        Scheduler::new_inner(self.clock, self.config, self.trace)
    }
}

/// Poll-driven scheduler of timeouts and intervals.
///
/// `'a` bounds the state captured by registered callbacks, so callbacks may
/// borrow data that outlives the scheduler.
pub struct Scheduler<'a, C> {
    clock: C,
    config: SchedulerConfig,
    ids: RefCell<IdAllocator>,
    attached: Cell<bool>,
    polling: Cell<bool>,
    current: Cell<Option<TaskId>>,
    timeouts: RefCell<Vec<Timeout<'a, C>>>,
    intervals: RefCell<Vec<Interval<'a, C>>>,
    pending: RefCell<PendingRemovals>,
    tracer: Tracer,
}

enum Step<'a, C> {
    Abandon(TaskId, Option<OnceFn<'a, C>>),
    Fire(TaskId, RepeatFn<'a, C>),
}

/// Clears the in-poll flag when a tick ends, including by unwinding.
struct PollGuard<'s>(&'s Cell<bool>);

impl Drop for PollGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<'a, C: TimeSource> Scheduler<'a, C> {
    /// Create a detached scheduler with the default configuration.
    pub fn new(clock: C) -> Self {
        Self::new_inner(clock, SchedulerConfig::default(), None)
    }

    pub fn with_config(clock: C, config: SchedulerConfig) -> Self {
        Self::new_inner(clock, config, None)
    }

    pub fn builder(clock: C) -> SchedulerBuilder<C> {
        SchedulerBuilder::new(clock)
    }

    fn new_inner(clock: C, config: SchedulerConfig, trace: Option<TraceHook>) -> Self {
        Self {
            clock,
            ids: RefCell::new(IdAllocator::new()),
            attached: Cell::new(config.attached),
            polling: Cell::new(false),
            current: Cell::new(None),
            timeouts: RefCell::new(Vec::with_capacity(config.capacity)),
            intervals: RefCell::new(Vec::with_capacity(config.capacity)),
            pending: RefCell::new(PendingRemovals::with_capacity(config.removal_capacity)),
            tracer: Tracer::new(trace),
            config,
        }
    }

    /// Current reading of the time source.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn trace_hook(&self) -> Option<TraceHook> {
        self.tracer.hook()
    }

    /// Run `callback` once, `delay` after now.
    pub fn set_timeout<F>(&self, callback: F, delay: impl Into<Millis>) -> TaskId
    where
        F: FnOnce(&Scheduler<'a, C>) + 'a,
    {
        let delay = delay.into();
        let due = self.now() + delay;
        let id = self.issue_id();

        {
            let mut timeouts = self.timeouts.borrow_mut();
            timeouts.push(Timeout {
                id,
                due,
                callback: Box::new(callback),
            });
            // Stable, so equal due times keep registration order.
            timeouts.sort_by_key(|timeout| timeout.due);
        }

        debug!("timeout {id} armed, due {due} (delay {delay})");
        self.tracer.task(TraceRecord::TimeoutArm, id, due);
        id
    }

    /// Run `callback` on the next poll that fires timeouts.
    pub fn set_immediate<F>(&self, callback: F) -> TaskId
    where
        F: FnOnce(&Scheduler<'a, C>) + 'a,
    {
        self.set_timeout(callback, Millis::ZERO)
    }

    /// Run `callback` every `period` until it returns [`Flow::Stop`] (or
    /// `true`) or the interval is cleared.
    pub fn set_interval<F, R>(&self, callback: F, period: impl Into<Millis>) -> TaskId
    where
        F: FnMut(&Scheduler<'a, C>) -> R + 'a,
        R: Into<Flow>,
    {
        self.push_interval(repeat(callback), period.into(), None)
    }

    /// Run `callback` on (almost) every poll.
    pub fn set_on_loop<F, R>(&self, callback: F) -> TaskId
    where
        F: FnMut(&Scheduler<'a, C>) -> R + 'a,
        R: Into<Flow>,
    {
        self.set_interval(callback, Millis::ZERO)
    }

    /// Like [`set_interval`](Self::set_interval), but once `abandon_after`
    /// has elapsed without the callback stopping, `on_abandon` runs instead
    /// and the interval is removed.
    pub fn set_interval_until<F, R, A>(
        &self,
        callback: F,
        period: impl Into<Millis>,
        on_abandon: A,
        abandon_after: impl Into<Millis>,
    ) -> TaskId
    where
        F: FnMut(&Scheduler<'a, C>) -> R + 'a,
        R: Into<Flow>,
        A: FnOnce(&Scheduler<'a, C>) + 'a,
    {
        let guard = AbandonGuard {
            deadline: self.now() + abandon_after.into(),
            callback: Some(Box::new(on_abandon) as OnceFn<'a, C>),
        };
        self.push_interval(repeat(callback), period.into(), Some(guard))
    }

    /// [`set_on_loop`](Self::set_on_loop) with an abandon deadline.
    pub fn set_on_loop_until<F, R, A>(
        &self,
        callback: F,
        on_abandon: A,
        abandon_after: impl Into<Millis>,
    ) -> TaskId
    where
        F: FnMut(&Scheduler<'a, C>) -> R + 'a,
        R: Into<Flow>,
        A: FnOnce(&Scheduler<'a, C>) + 'a,
    {
        self.set_interval_until(callback, Millis::ZERO, on_abandon, abandon_after)
    }

    /// Request cancellation of a timeout. Applied on a later poll; unknown
    /// or already fired ids are ignored.
    pub fn clear_timeout(&self, id: TaskId) {
        if self.pending.borrow_mut().request_timeout(id) {
            debug!("timeout {id} cancellation queued");
            self.tracer.task(TraceRecord::TimeoutCancel, id, self.now());
        }
    }

    /// Request cancellation of an interval. Applied on a later poll; unknown
    /// or finished ids are ignored.
    pub fn clear_interval(&self, id: TaskId) {
        if self.pending.borrow_mut().request_interval(id) {
            debug!("interval {id} cancellation queued");
            self.tracer.task(TraceRecord::IntervalCancel, id, self.now());
        }
    }

    pub fn attach_to_loop(&self) {
        if !self.attached.replace(true) {
            debug!("scheduler attached");
            self.tracer.emit(TraceRecord::Attach, 0, self.now());
        }
    }

    /// Stop firing callbacks. Registrations keep their absolute due times.
    pub fn detach_from_loop(&self) {
        if self.attached.replace(false) {
            debug!("scheduler detached");
            self.tracer.emit(TraceRecord::Detach, 0, self.now());
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached.get()
    }

    /// Advance the scheduler by one bounded step.
    ///
    /// Does nothing while detached or when called from inside a callback.
    pub fn tick(&self) {
        let now = self.now();
        if !self.attached.get() {
            trace!("tick at {now} skipped, scheduler detached");
            return;
        }
        if self.polling.replace(true) {
            trace!("nested tick at {now} ignored");
            return;
        }
        let _poll = PollGuard(&self.polling);

        if self.drain_interval_removals(now) {
            return;
        }
        if self.drain_timeout_removals(now) {
            return;
        }

        self.fire_timeouts();
        self.fire_interval();
    }

    /// True iff at least one timeout *and* at least one interval exist.
    pub fn has_tasks(&self) -> bool {
        !self.timeouts.borrow().is_empty() && !self.intervals.borrow().is_empty()
    }

    /// Time until the next poll has something to do.
    ///
    /// Zero when nothing is registered, when something is already due, or
    /// when removals are waiting to be applied.
    pub fn get_time_until_next_call(&self) -> Millis {
        if !self.pending.borrow().is_empty() {
            return Millis::ZERO;
        }

        let next_timeout = self.timeouts.borrow().first().map(|timeout| timeout.due);
        let next_interval = self
            .intervals
            .borrow()
            .iter()
            .filter(|interval| !interval.retired)
            .map(Interval::next_event)
            .min();

        match next_timeout.into_iter().chain(next_interval).min() {
            Some(next) => self.now().saturating_until(next),
            None => Millis::ZERO,
        }
    }

    pub fn timeout_count(&self) -> usize {
        self.timeouts.borrow().len()
    }

    pub fn interval_count(&self) -> usize {
        self.intervals.borrow().len()
    }

    /// Number of cancellations and completions not yet applied.
    pub fn pending_removals(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Id of the task whose callback is running, if any.
    pub fn current_task(&self) -> Option<TaskId> {
        self.current.get()
    }
}

impl<'a, C: TimeSource> Scheduler<'a, C> {
    fn issue_id(&self) -> TaskId {
        self.ids.borrow_mut().issue(|id| self.is_live(id))
    }

    fn is_live(&self, id: TaskId) -> bool {
        self.timeouts.borrow().iter().any(|timeout| timeout.id == id)
            || self.intervals.borrow().iter().any(|interval| interval.id == id)
    }

    fn push_interval(
        &self,
        callback: RepeatFn<'a, C>,
        period: Millis,
        guard: Option<AbandonGuard<'a, C>>,
    ) -> TaskId {
        let due = self.now() + period;
        let id = self.issue_id();
        let deadline = guard.as_ref().map(|guard| guard.deadline);

        self.intervals
            .borrow_mut()
            .push(Interval::new(id, due, period, callback, guard));

        match deadline {
            Some(deadline) => {
                debug!("interval {id} armed, period {period}, first due {due}, abandon at {deadline}")
            }
            None => debug!("interval {id} armed, period {period}, first due {due}"),
        }
        self.tracer.task(TraceRecord::IntervalArm, id, due);
        id
    }

    fn run_as<R>(&self, id: TaskId, f: impl FnOnce() -> R) -> R {
        let previous = self.current.replace(Some(id));
        let result = f();
        self.current.set(previous);
        result
    }

    fn drain_interval_removals(&self, now: Timestamp) -> bool {
        let removed = {
            let mut pending = self.pending.borrow_mut();
            if pending.intervals().is_empty() {
                return false;
            }
            let removed = remove_marked(
                &mut self.intervals.borrow_mut(),
                pending.intervals(),
                |interval| interval.id,
            );
            pending.clear_intervals();
            removed
        };

        debug!("applied {} interval removal(s)", removed.len());
        self.tracer
            .emit(TraceRecord::RemovalDrain, removed.len() as u32, now);
        // Captured state is dropped here, outside every borrow.
        drop(removed);
        true
    }

    fn drain_timeout_removals(&self, now: Timestamp) -> bool {
        let removed = {
            let mut pending = self.pending.borrow_mut();
            if pending.timeouts().is_empty() {
                return false;
            }
            let removed = remove_marked(
                &mut self.timeouts.borrow_mut(),
                pending.timeouts(),
                |timeout| timeout.id,
            );
            pending.clear_timeouts();
            removed
        };

        debug!("applied {} timeout removal(s)", removed.len());
        self.tracer
            .emit(TraceRecord::RemovalDrain, removed.len() as u32, now);
        drop(removed);
        true
    }

    /// Fire every timeout that is due now, earliest first.
    fn fire_timeouts(&self) {
        let now = self.now();
        let due: Vec<Timeout<'a, C>> = {
            let mut timeouts = self.timeouts.borrow_mut();
            let ready = timeouts.partition_point(|timeout| now.has_reached(timeout.due));
            timeouts.drain(..ready).collect()
        };

        let mut due = due.into_iter();
        while let Some(timeout) = due.next() {
            if !self.attached.get() {
                // Put the rest back in front of anything registered since.
                let mut unfired: Vec<Timeout<'a, C>> = Vec::with_capacity(1);
                unfired.push(timeout);
                unfired.extend(due.by_ref());
                self.restore_timeouts(unfired);
                return;
            }

            let Timeout { id, callback, .. } = timeout;
            trace!("timeout {id} fired at {now}");
            self.tracer.task(TraceRecord::TimeoutFire, id, now);
            self.run_as(id, || callback(self));
        }
    }

    fn restore_timeouts(&self, unfired: Vec<Timeout<'a, C>>) {
        let mut timeouts = self.timeouts.borrow_mut();
        timeouts.extend(unfired);
        timeouts.sort_by_key(|timeout| timeout.due);
    }

    /// Scan intervals in storage order. Abandons every interval whose
    /// deadline passed and fires at most one due interval, then returns.
    fn fire_interval(&self) {
        let now = self.now();
        // Intervals registered by callbacks during this scan wait for the
        // next poll.
        let scanned = self.intervals.borrow().len();

        for index in 0..scanned {
            if !self.attached.get() {
                return;
            }

            let step = {
                let mut intervals = self.intervals.borrow_mut();
                let interval = &mut intervals[index];
                if interval.retired {
                    continue;
                }

                if interval.is_abandoned_at(now) {
                    interval.retired = true;
                    Step::Abandon(interval.id, interval.take_abandon())
                } else if !now.has_reached(interval.next_due) {
                    continue;
                } else {
                    match interval.callback.take() {
                        Some(callback) => Step::Fire(interval.id, callback),
                        None => continue,
                    }
                }
            };

            match step {
                Step::Abandon(id, on_abandon) => {
                    self.pending.borrow_mut().request_interval(id);
                    debug!("interval {id} abandoned at {now}");
                    self.tracer.task(TraceRecord::IntervalAbandon, id, now);
                    if let Some(on_abandon) = on_abandon {
                        self.run_as(id, || on_abandon(self));
                    }
                }
                Step::Fire(id, mut callback) => {
                    trace!("interval {id} fired at {now}");
                    self.tracer.task(TraceRecord::IntervalFire, id, now);
                    let flow = self.run_as(id, || callback(self));
                    self.settle_interval(index, callback, flow);
                    return;
                }
            }
        }
    }

    fn settle_interval(&self, index: usize, callback: RepeatFn<'a, C>, flow: Flow) {
        let fired_at = self.now();
        let id = {
            let mut intervals = self.intervals.borrow_mut();
            let interval = &mut intervals[index];
            interval.callback = Some(callback);
            match flow {
                Flow::Stop => interval.retired = true,
                Flow::Continue => interval.reschedule(fired_at, self.config.reschedule),
            }
            interval.id
        };

        if flow.is_stop() {
            self.pending.borrow_mut().request_interval(id);
            debug!("interval {id} stopped at {fired_at}");
            self.tracer.task(TraceRecord::IntervalStop, id, fired_at);
        }
    }
}

fn repeat<'a, C, F, R>(mut callback: F) -> RepeatFn<'a, C>
where
    F: FnMut(&Scheduler<'a, C>) -> R + 'a,
    R: Into<Flow>,
{
    Box::new(move |scheduler: &Scheduler<'a, C>| -> Flow { callback(scheduler).into() })
}

impl<C> fmt::Debug for Scheduler<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("attached", &self.attached.get())
            .field("timeouts", &self.timeouts.borrow().len())
            .field("intervals", &self.intervals.borrow().len())
            .field("pending_removals", &self.pending.borrow().len())
            .finish()
    }
}
