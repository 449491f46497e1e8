#![no_std]
#![forbid(unsafe_code)]

//! # tickloop
//!
//! A cooperative, non-preemptive scheduler for single-threaded control loops.
//! Application code registers one-shot timeouts and recurring intervals
//! against a millisecond [`TimeSource`]; the embedding loop advances them by
//! calling [`Scheduler::tick`]. There is no background thread and no blocking
//! wait.
//!
//! ```
//! use core::cell::Cell;
//! use tickloop::{Flow, ManualClock, Scheduler};
//!
//! let blinks = Cell::new(0);
//! let clock = ManualClock::new();
//! let scheduler = Scheduler::new(clock.clone());
//! scheduler.attach_to_loop();
//!
//! scheduler.set_interval(
//!     |_| {
//!         blinks.set(blinks.get() + 1);
//!         if blinks.get() == 3 { Flow::Stop } else { Flow::Continue }
//!     },
//!     100u32,
//! );
//!
//! for _ in 0..1000 {
//!     clock.advance(1u32);
//!     scheduler.tick();
//! }
//! assert_eq!(blinks.get(), 3);
//! ```
//!
//! ## Module Overview
//! - [`scheduler`] – registration, cancellation and the `tick` poll.
//! - [`config`]    – construction-time sizing and reschedule policy.
//! - [`task`]      – interval callback results ([`Flow`]).

extern crate alloc;

pub mod config;
mod pending;
pub mod scheduler;
pub mod task;
mod trace;

pub use config::{Reschedule, SchedulerConfig, SchedulerConfigBuilder};
pub use scheduler::{Scheduler, SchedulerBuilder};
pub use task::Flow;
pub use tickloop_core::{
    millis, IdAllocator, ManualClock, Millis, TaskId, TimeSource, Timestamp, TraceError,
    TraceHook, TraceRecord, TraceResult,
};

/// Record payload helpers for trace sinks.
pub mod records {
    pub use tickloop_core::trace::{decode_payload, decode_task, encode_payload, PAYLOAD_SIZE};
}

#[cfg(test)]
mod tests;
