#![no_std]
#![forbid(unsafe_code)]

//! # tickloop core
//!
//! Vocabulary shared by the tickloop crates: millisecond time types, the
//! [`TimeSource`] abstraction, task identifiers and binary trace records.
//! Everything here is `no_std` and only needs `alloc` for shared handles.

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod clock;
pub mod id;
pub mod time;
pub mod trace;

pub use clock::*;
pub use id::*;
pub use time::*;
pub use trace::{TraceError, TraceHook, TracePayload, TraceRecord, TraceResult};

#[cfg(test)]
mod tests;

/// tickloop version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
