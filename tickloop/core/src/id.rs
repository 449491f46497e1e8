//! Task identifiers

use core::fmt;

/// Handle returned by every registration, used to cancel the task later.
///
/// Timeouts and intervals draw from one counter, so an id names at most one
/// live task at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u32);

impl TaskId {
    /// Create an id from its raw value
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw id value
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TaskId {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "#{}", self.0);
    }
}

/// Sequential id source.
///
/// Ids are issued in order starting at zero. Once the counter has wrapped,
/// candidates still owned by a live task are skipped.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u32,
    wrapped: bool,
}

impl IdAllocator {
    /// Create an allocator that starts at zero
    pub const fn new() -> Self {
        Self {
            next: 0,
            wrapped: false,
        }
    }

    /// Create an allocator whose first id is `first`
    pub const fn starting_at(first: u32) -> Self {
        Self {
            next: first,
            wrapped: false,
        }
    }

    /// Issue the next free id. `is_live` reports ids that are still in use.
    pub fn issue(&mut self, is_live: impl Fn(TaskId) -> bool) -> TaskId {
        loop {
            let candidate = TaskId(self.next);
            self.next = self.next.wrapping_add(1);
            if self.next == 0 {
                self.wrapped = true;
            }

            if !self.wrapped || !is_live(candidate) {
                return candidate;
            }
        }
    }

    /// Whether the counter has wrapped at least once
    pub const fn has_wrapped(&self) -> bool {
        self.wrapped
    }
}
