//! Host main loop
//!
//! Drives a [`Scheduler`] the way a firmware superloop would, but sleeps
//! between polls instead of spinning when nothing is due.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use tickloop::{Millis, Scheduler, TimeSource};

/// Longest single sleep between polls unless configured otherwise.
pub const DEFAULT_MAX_SLEEP: Duration = Duration::from_millis(10);

/// Host loop settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Upper bound for one sleep between polls. Zero turns the loop into a
    /// busy poll.
    pub max_sleep: Duration,
    /// Stop after this much wall time.
    pub run_for: Option<Duration>,
    /// Stop once no timeout, interval or pending removal is left.
    pub stop_when_idle: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_sleep: DEFAULT_MAX_SLEEP,
            run_for: None,
            stop_when_idle: false,
        }
    }
}

impl RunnerConfig {
    pub fn with_max_sleep(mut self, max_sleep: Duration) -> Self {
        self.max_sleep = max_sleep;
        self
    }

    pub fn run_for(mut self, duration: Duration) -> Self {
        self.run_for = Some(duration);
        self
    }

    pub fn stop_when_idle(mut self, stop: bool) -> Self {
        self.stop_when_idle = stop;
        self
    }
}

/// Why [`LoopRunner::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The stop flag was raised.
    Stopped,
    /// The configured run duration elapsed.
    Elapsed,
    /// Nothing was left to schedule.
    Idle,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => f.write_str("stop requested"),
            Self::Elapsed => f.write_str("run time elapsed"),
            Self::Idle => f.write_str("no work left"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub polls: u64,
    pub elapsed: Duration,
    pub reason: StopReason,
}

#[derive(Debug)]
pub enum RunnerError {
    /// The Ctrl-C handler could not be installed.
    Signal(ctrlc::Error),
}

impl fmt::Display for RunnerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(err) => write!(f, "failed to install Ctrl-C handler: {err}"),
        }
    }
}

impl std::error::Error for RunnerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Signal(err) => Some(err),
        }
    }
}

impl From<ctrlc::Error> for RunnerError {
    fn from(value: ctrlc::Error) -> Self {
        Self::Signal(value)
    }
}

/// Raise `flag` when the process receives Ctrl-C.
///
/// Only one handler can be installed per process.
pub fn install_ctrlc_handler(flag: Arc<AtomicBool>) -> Result<(), RunnerError> {
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))?;
    Ok(())
}

/// Polls a scheduler until stopped.
pub struct LoopRunner {
    config: RunnerConfig,
    stop: Arc<AtomicBool>,
}

impl LoopRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Shared flag that ends [`run`](Self::run) once raised. Safe to raise
    /// from another thread, a signal handler or a scheduler callback.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    /// Stop the loop on Ctrl-C.
    pub fn handle_ctrlc(&self) -> Result<(), RunnerError> {
        install_ctrlc_handler(self.stop_flag())
    }

    /// Poll `scheduler` until the stop flag is raised, the run time elapses
    /// or (if configured) no work is left.
    pub fn run<C: TimeSource>(&self, scheduler: &Scheduler<'_, C>) -> RunReport {
        let started = Instant::now();
        let mut polls = 0u64;
        info!(
            "loop runner started (max sleep {:?}, run for {:?})",
            self.config.max_sleep, self.config.run_for
        );

        let reason = loop {
            if self.stop.load(Ordering::SeqCst) {
                break StopReason::Stopped;
            }
            let remaining = match self.config.run_for {
                Some(limit) => match limit.checked_sub(started.elapsed()) {
                    Some(left) if !left.is_zero() => Some(left),
                    _ => break StopReason::Elapsed,
                },
                None => None,
            };

            scheduler.tick();
            polls += 1;

            if self.config.stop_when_idle && is_idle(scheduler) {
                break StopReason::Idle;
            }

            // An empty scheduler also reports zero; nothing will become due
            // without another thread registering work, so sleep the maximum.
            let wait = if scheduler.is_attached() && !is_idle(scheduler) {
                scheduler.get_time_until_next_call()
            } else {
                Millis::MAX
            };
            let pause = pause_for(wait, self.config.max_sleep, remaining);
            if !pause.is_zero() {
                thread::sleep(pause);
            }
        };

        let report = RunReport {
            polls,
            elapsed: started.elapsed(),
            reason,
        };
        debug!("loop runner finished after {} polls: {}", report.polls, report.reason);
        report
    }
}

impl Default for LoopRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

fn is_idle<C: TimeSource>(scheduler: &Scheduler<'_, C>) -> bool {
    scheduler.timeout_count() == 0
        && scheduler.interval_count() == 0
        && scheduler.pending_removals() == 0
}

/// Sleep before the next poll: the scheduler's own estimate, capped by the
/// configured maximum and the remaining run time.
fn pause_for(wait: Millis, max_sleep: Duration, remaining: Option<Duration>) -> Duration {
    let mut pause = Duration::from_millis(u64::from(wait.as_millis())).min(max_sleep);
    if let Some(remaining) = remaining {
        pause = pause.min(remaining);
    }
    pause
}
