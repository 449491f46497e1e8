//! Scheduler configuration.

/// Expected number of concurrently pending timeouts (and, separately,
/// intervals) when nothing else is configured.
pub const DEFAULT_CAPACITY: usize = 64;

/// Expected number of cancellations queued between two polls.
pub const DEFAULT_REMOVAL_CAPACITY: usize = 16;

/// How an interval's next due time is computed after a non-terminal firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reschedule {
    /// Next due time is the firing poll's time plus the period. Spacing
    /// between firings never drops below the period.
    #[default]
    FromFiring,
    /// Next due time is the previous due time plus the period. Late polls
    /// are caught up on subsequent ticks.
    FixedRate,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Reschedule {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Reschedule::FromFiring => defmt::write!(fmt, "FromFiring"),
            Reschedule::FixedRate => defmt::write!(fmt, "FixedRate"),
        }
    }
}

/// Construction-time settings for a [`Scheduler`](crate::Scheduler).
///
/// The capacities are pre-reservation hints only. Storage grows past them
/// when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub capacity: usize,
    pub removal_capacity: usize,
    pub reschedule: Reschedule,
    pub attached: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            removal_capacity: DEFAULT_REMOVAL_CAPACITY,
            reschedule: Reschedule::FromFiring,
            attached: false,
        }
    }
}

impl SchedulerConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> SchedulerConfigBuilder {
        SchedulerConfigBuilder::default()
    }
}

/// Builder for ergonomic scheduler configuration construction.
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfigBuilder {
    config: SchedulerConfig,
}

impl SchedulerConfigBuilder {
    /// Sets the expected number of concurrently pending tasks per kind.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Sets the expected number of cancellations queued between polls.
    pub fn removal_capacity(mut self, capacity: usize) -> Self {
        self.config.removal_capacity = capacity;
        self
    }

    /// Sets the interval reschedule policy.
    pub fn reschedule(mut self, policy: Reschedule) -> Self {
        self.config.reschedule = policy;
        self
    }

    /// Starts the scheduler already attached to the loop.
    pub fn attached(mut self, attached: bool) -> Self {
        self.config.attached = attached;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> SchedulerConfig {
        self.config
    }
}
