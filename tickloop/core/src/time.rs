//! Time management types and utilities

use core::fmt;
use core::ops::Add;

/// Absolute reading of the time source, in milliseconds since an arbitrary
/// epoch.
///
/// Arithmetic wraps; comparisons are plain and assume the counter does not
/// wrap between a registration and its due time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u32);

impl Timestamp {
    /// Epoch of the time source
    pub const ZERO: Self = Self(0);

    /// Largest representable reading
    pub const MAX: Self = Self(u32::MAX);

    /// Create a timestamp from a raw millisecond count
    pub const fn from_millis(millis: u32) -> Self {
        Self(millis)
    }

    /// Get the raw millisecond count
    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Offset this timestamp by a span, wrapping on overflow
    pub const fn wrapping_add(self, span: Millis) -> Self {
        Self(self.0.wrapping_add(span.0))
    }

    /// Check whether `due` has arrived at this reading
    pub const fn has_reached(self, due: Timestamp) -> bool {
        self.0 >= due.0
    }

    /// Span from this reading until `later`, zero if `later` already passed
    pub const fn saturating_until(self, later: Timestamp) -> Millis {
        Millis(later.0.saturating_sub(self.0))
    }
}

impl Add<Millis> for Timestamp {
    type Output = Timestamp;

    fn add(self, span: Millis) -> Timestamp {
        self.wrapping_add(span)
    }
}

impl From<u32> for Timestamp {
    fn from(millis: u32) -> Self {
        Self(millis)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}ms", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Timestamp {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "t+{}ms", self.0);
    }
}

/// Span of time in milliseconds: delays, periods and deadline offsets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Millis(u32);

impl Millis {
    /// Zero span
    pub const ZERO: Self = Self(0);

    /// Maximum span
    pub const MAX: Self = Self(u32::MAX);

    /// Create a span from milliseconds
    pub const fn from_millis(millis: u32) -> Self {
        Self(millis)
    }

    /// Create a span from seconds
    pub const fn from_secs(secs: u32) -> Self {
        Self(secs.saturating_mul(1000))
    }

    /// Get the span in milliseconds
    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Get the span in whole seconds
    pub const fn as_secs(self) -> u32 {
        self.0 / 1000
    }

    /// Check if the span is zero
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Millis {
    fn from(millis: u32) -> Self {
        Self(millis)
    }
}

impl fmt::Display for Millis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Millis {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}ms", self.0);
    }
}

/// Macro to create compile-time spans
#[macro_export]
macro_rules! millis {
    ($value:literal ms) => {
        $crate::Millis::from_millis($value)
    };
    ($value:literal s) => {
        $crate::Millis::from_secs($value)
    };
}
