//! Host time sources
//!
//! Both clocks report milliseconds as a `u32` that wraps after roughly 49.7
//! days. The scheduler compares readings directly, so long-running hosts
//! should prefer [`SystemClock`], which starts at zero.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tickloop::{TimeSource, Timestamp};

/// Monotonic milliseconds since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    /// Time elapsed since creation
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        // Truncation wraps the counter.
        Timestamp::from_millis(self.origin.elapsed().as_millis() as u32)
    }
}

/// Wall-clock milliseconds since the UNIX epoch, truncated to 32 bits.
///
/// Follows adjustments of the system clock and is therefore not monotonic.
#[derive(Debug, Clone, Copy, Default)]
pub struct EpochClock;

impl TimeSource for EpochClock {
    fn now(&self) -> Timestamp {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|since| since.as_millis() as u32)
            .unwrap_or(0);
        Timestamp::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn system_clock_starts_near_zero_and_advances() {
        let clock = SystemClock::new();
        let start = clock.now();
        assert!(start.as_millis() < 50);

        thread::sleep(Duration::from_millis(20));
        let later = clock.now();
        assert!(later.has_reached(start + tickloop::Millis::from_millis(20)));
    }

    #[test]
    fn copies_share_the_origin() {
        let clock = SystemClock::new();
        let copy = clock;
        thread::sleep(Duration::from_millis(5));

        let (a, b) = (clock.now().as_millis(), copy.now().as_millis());
        assert!(a.abs_diff(b) <= 1);
    }

    #[test]
    fn epoch_clock_tracks_system_time() {
        let expected = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time after epoch")
            .as_millis() as u32;
        let reading = EpochClock.now().as_millis();

        assert!(reading.wrapping_sub(expected) < 1_000);
    }
}
