//! Host-side demo for the tickloop scheduler.
//!
//! Runs a small firmware-style workload on the system clock and prints log
//! lines and, optionally, the scheduler's trace records.

pub mod demo;
mod error;
mod formatter;
pub mod logger;

pub use demo::{register, run, DemoState, LinkState, Settings, Summary};
pub use error::SettingsError;
pub use formatter::TraceFormatter;

#[cfg(test)]
mod tests;
