use crate::{ManualClock, Scheduler};

mod removal;

/// Poll `polls_per_ms` times at each millisecond of the next `millis`.
fn run_for(scheduler: &Scheduler<'_, ManualClock>, clock: &ManualClock, millis: u32, polls_per_ms: u32) {
    for _ in 0..millis {
        for _ in 0..polls_per_ms {
            scheduler.tick();
        }
        clock.advance(1u32);
    }
}

fn attached<'a>(clock: &ManualClock) -> Scheduler<'a, ManualClock> {
    let scheduler = Scheduler::new(clock.clone());
    scheduler.attach_to_loop();
    scheduler
}
