//! Host port for the tickloop scheduler.
//!
//! Supplies the pieces a firmware image would provide itself: a millisecond
//! clock and a main loop that keeps calling `tick`. The loop sleeps for the
//! scheduler's own estimate of the time until the next call, capped by
//! [`RunnerConfig::max_sleep`].
//!
//! ```no_run
//! use tickloop_posix::{LoopRunner, RunnerConfig};
//!
//! let scheduler = tickloop_posix::scheduler();
//! scheduler.attach_to_loop();
//! scheduler.set_interval(|_| println!("tick"), 500u32);
//!
//! let runner = LoopRunner::new(RunnerConfig::default());
//! runner.handle_ctrlc().expect("Ctrl-C handler");
//! runner.run(&scheduler);
//! ```

mod clock;
mod runner;

pub use clock::{EpochClock, SystemClock};
pub use runner::{
    install_ctrlc_handler, LoopRunner, RunReport, RunnerConfig, RunnerError, StopReason,
    DEFAULT_MAX_SLEEP,
};
pub use tickloop;

use tickloop::{Scheduler, SchedulerConfig};

/// Detached scheduler on a fresh [`SystemClock`].
pub fn scheduler<'a>() -> Scheduler<'a, SystemClock> {
    Scheduler::new(SystemClock::new())
}

/// Scheduler on a fresh [`SystemClock`] with an explicit configuration.
pub fn scheduler_with_config<'a>(config: SchedulerConfig) -> Scheduler<'a, SystemClock> {
    Scheduler::with_config(SystemClock::new(), config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_use_the_given_config() {
        let detached = scheduler();
        assert!(!detached.is_attached());

        let attached = scheduler_with_config(SchedulerConfig::builder().attached(true).build());
        assert!(attached.is_attached());
        assert!(attached.now().as_millis() < 50);
    }
}
