use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use super::{attached, run_for};
use crate::{ManualClock, TaskId};

#[test]
fn cancelled_timeout_never_fires() {
    let calls = Cell::new(0u32);
    let clock = ManualClock::new();
    let scheduler = attached(&clock);

    let id = scheduler.set_timeout(|_| calls.set(calls.get() + 1), 20u32);
    scheduler.clear_timeout(id);
    assert_eq!(scheduler.pending_removals(), 1);

    run_for(&scheduler, &clock, 30, 2);

    assert_eq!(calls.get(), 0);
    assert_eq!(scheduler.timeout_count(), 0);
    assert_eq!(scheduler.pending_removals(), 0);
}

#[test]
fn cancelling_a_fired_timeout_leaves_others_alone() {
    let first = Cell::new(0u32);
    let second = Cell::new(0u32);
    let clock = ManualClock::new();
    let scheduler = attached(&clock);

    let id = scheduler.set_timeout(|_| first.set(first.get() + 1), 5u32);
    scheduler.set_timeout(|_| second.set(second.get() + 1), 10u32);

    run_for(&scheduler, &clock, 6, 1);
    assert_eq!(first.get(), 1);

    scheduler.clear_timeout(id);
    run_for(&scheduler, &clock, 10, 1);

    assert_eq!(first.get(), 1);
    assert_eq!(second.get(), 1);
}

#[test]
fn applying_removals_takes_the_whole_poll() {
    let timeout_calls = Cell::new(0u32);
    let loop_calls = Cell::new(0u32);
    let clock = ManualClock::new();
    let scheduler = attached(&clock);

    scheduler.set_immediate(|_| timeout_calls.set(timeout_calls.get() + 1));
    scheduler.set_on_loop(|_| loop_calls.set(loop_calls.get() + 1));
    let doomed = scheduler.set_timeout(|_| {}, 100u32);
    scheduler.clear_timeout(doomed);

    scheduler.tick();
    assert_eq!(timeout_calls.get(), 0);
    assert_eq!(loop_calls.get(), 0);

    scheduler.tick();
    assert_eq!(timeout_calls.get(), 1);
    assert_eq!(loop_calls.get(), 1);
}

#[test]
fn interval_removals_are_applied_before_timeout_removals() {
    let clock = ManualClock::new();
    let scheduler = attached(&clock);

    let timeout = scheduler.set_timeout(|_| {}, 100u32);
    let interval = scheduler.set_interval(|_| {}, 100u32);
    scheduler.clear_timeout(timeout);
    scheduler.clear_interval(interval);
    assert_eq!(scheduler.pending_removals(), 2);

    scheduler.tick();
    assert_eq!(scheduler.interval_count(), 0);
    assert_eq!(scheduler.timeout_count(), 1);
    assert_eq!(scheduler.pending_removals(), 1);

    scheduler.tick();
    assert_eq!(scheduler.timeout_count(), 0);
    assert_eq!(scheduler.pending_removals(), 0);
}

#[test]
fn repeated_cancellation_is_queued_once() {
    let clock = ManualClock::new();
    let scheduler = attached(&clock);

    let id = scheduler.set_interval(|_| {}, 10u32);
    scheduler.clear_interval(id);
    scheduler.clear_interval(id);

    assert_eq!(scheduler.pending_removals(), 1);
}

#[test]
fn unknown_ids_are_ignored() {
    let calls = Cell::new(0u32);
    let clock = ManualClock::new();
    let scheduler = attached(&clock);

    scheduler.set_timeout(|_| calls.set(calls.get() + 1), 3u32);
    scheduler.clear_timeout(TaskId::new(999));
    scheduler.clear_interval(TaskId::new(999));

    run_for(&scheduler, &clock, 10, 1);

    assert_eq!(calls.get(), 1);
    assert_eq!(scheduler.pending_removals(), 0);
}

#[test]
fn clearing_an_interval_id_does_not_touch_a_timeout() {
    let calls = Cell::new(0u32);
    let clock = ManualClock::new();
    let scheduler = attached(&clock);

    let id = scheduler.set_timeout(|_| calls.set(calls.get() + 1), 5u32);
    scheduler.clear_interval(id);
    run_for(&scheduler, &clock, 10, 1);

    assert_eq!(calls.get(), 1);
}

#[test]
fn cancellation_inside_a_due_batch_is_deferred() {
    let order = RefCell::new(Vec::new());
    let victim = Cell::new(None);
    let clock = ManualClock::new();
    let scheduler = attached(&clock);

    scheduler.set_timeout(
        |s| {
            order.borrow_mut().push("canceller");
            if let Some(id) = victim.get() {
                s.clear_timeout(id);
            }
        },
        5u32,
    );
    victim.set(Some(scheduler.set_timeout(|_| order.borrow_mut().push("victim"), 5u32)));

    clock.advance(5u32);
    scheduler.tick();

    // Both were already taken for this poll when the request was made.
    assert_eq!(*order.borrow(), ["canceller", "victim"]);
    assert_eq!(scheduler.pending_removals(), 1);
}

#[test]
fn interval_cleared_by_another_callback_stops() {
    let ticks = Cell::new(0u32);
    let target = Cell::new(None);
    let clock = ManualClock::new();
    let scheduler = attached(&clock);

    target.set(Some(scheduler.set_interval(|_| ticks.set(ticks.get() + 1), 5u32)));
    scheduler.set_timeout(
        |s| {
            if let Some(id) = target.get() {
                s.clear_interval(id);
            }
        },
        12u32,
    );

    run_for(&scheduler, &clock, 50, 2);

    assert_eq!(ticks.get(), 2);
    assert_eq!(scheduler.interval_count(), 0);
}
