use tickloop::{ManualClock, Millis, Scheduler, SchedulerConfig, Timestamp};

use crate::{register, DemoState, LinkState, Settings};

mod settings;

/// Step a manual clock through `millis` milliseconds, polling four times per
/// millisecond so tasks that fall due together all fire within it.
fn run_for(scheduler: &Scheduler<'_, ManualClock>, clock: &ManualClock, millis: u32) {
    for _ in 0..millis {
        for _ in 0..4 {
            scheduler.tick();
        }
        clock.advance(1u32);
    }
}

fn attached<'a>(clock: &ManualClock) -> Scheduler<'a, ManualClock> {
    Scheduler::with_config(clock.clone(), SchedulerConfig::builder().attached(true).build())
}

#[test]
fn link_down_is_abandoned_at_deadline() {
    let state = DemoState::default();
    let clock = ManualClock::new();
    let scheduler = attached(&clock);

    register(&scheduler, &Settings::default(), &state);
    run_for(&scheduler, &clock, 3001);

    let summary = state.summary();
    assert_eq!(summary.link, LinkState::Abandoned(Timestamp::from_millis(1500)));
    assert_eq!(summary.heartbeats, 3);
    assert_eq!(summary.watchdog_fired_at, Some(Timestamp::from_millis(2500)));
    // The firing at 2500 shares the watchdog's poll; the clear lands after it.
    assert_eq!(summary.blinks, 10);
    assert!(!summary.led_on);
    assert_eq!(scheduler.interval_count(), 0);
    assert_eq!(scheduler.timeout_count(), 0);
}

#[test]
fn link_up_stops_the_wait() {
    let state = DemoState::default();
    let clock = ManualClock::new();
    let scheduler = attached(&clock);
    let settings = Settings {
        link_up_after: Some(Millis::from_millis(450)),
        ..Settings::default()
    };

    register(&scheduler, &settings, &state);
    run_for(&scheduler, &clock, 1000);

    assert_eq!(state.summary().link, LinkState::Up(Timestamp::from_millis(500)));
}

#[test]
fn nothing_happens_before_first_periods() {
    let state = DemoState::default();
    let clock = ManualClock::new();
    let scheduler = attached(&clock);

    register(&scheduler, &Settings::default(), &state);
    run_for(&scheduler, &clock, 100);

    let summary = state.summary();
    assert_eq!(summary.blinks, 0);
    assert_eq!(summary.heartbeats, 0);
    assert_eq!(summary.link, LinkState::Waiting);
    assert_eq!(
        scheduler.get_time_until_next_call(),
        Millis::ZERO,
        "link poll is due at 100"
    );
}
