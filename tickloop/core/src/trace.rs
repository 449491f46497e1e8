//! Binary trace records emitted by the scheduler

use alloc::rc::Rc;
use core::fmt;

use heapless::Vec;

use crate::{TaskId, Timestamp};

/// Size of a record payload: `id: u32` followed by `time: u32`
pub const PAYLOAD_SIZE: usize = 8;

/// Payload buffer built on the stack for every record
pub type TracePayload = Vec<u8, PAYLOAD_SIZE>;

/// Outcome reported by a trace hook
pub type TraceResult = Result<(), TraceError>;

/// Sink for trace records. Receives the record type and its little-endian
/// payload.
pub type TraceHook = Rc<dyn Fn(TraceRecord, &[u8]) -> TraceResult>;

/// Trace record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TraceRecord {
    /// Timeout registered; time is its due time
    TimeoutArm = 40,
    /// Timeout callback invoked
    TimeoutFire = 41,
    /// Timeout cancellation requested
    TimeoutCancel = 42,
    /// Interval registered; time is its first due time
    IntervalArm = 43,
    /// Interval callback invoked
    IntervalFire = 44,
    /// Interval callback asked to stop
    IntervalStop = 45,
    /// Interval deadline reached, abandon callback invoked
    IntervalAbandon = 46,
    /// Interval cancellation requested
    IntervalCancel = 47,
    /// Pending removals applied; id is the number of entries removed
    RemovalDrain = 48,
    /// Scheduler attached to the loop
    Attach = 49,
    /// Scheduler detached from the loop
    Detach = 50,
}

impl TraceRecord {
    /// Raw record number
    pub const fn raw(self) -> u8 {
        self as u8
    }

    /// Short record name used by text sinks
    pub const fn name(self) -> &'static str {
        match self {
            Self::TimeoutArm => "TIMEOUT_ARM",
            Self::TimeoutFire => "TIMEOUT_FIRE",
            Self::TimeoutCancel => "TIMEOUT_CANCEL",
            Self::IntervalArm => "INTERVAL_ARM",
            Self::IntervalFire => "INTERVAL_FIRE",
            Self::IntervalStop => "INTERVAL_STOP",
            Self::IntervalAbandon => "INTERVAL_ABANDON",
            Self::IntervalCancel => "INTERVAL_CANCEL",
            Self::RemovalDrain => "REMOVAL_DRAIN",
            Self::Attach => "ATTACH",
            Self::Detach => "DETACH",
        }
    }
}

impl fmt::Display for TraceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for TraceRecord {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.name());
    }
}

/// Errors a trace sink may report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceError {
    /// Sink has no room for the record
    BufferFull,
    /// Sink is not accepting records
    Disabled,
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::BufferFull => write!(f, "Trace buffer is full"),
            TraceError::Disabled => write!(f, "Trace sink is disabled"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TraceError {}

#[cfg(feature = "defmt")]
impl defmt::Format for TraceError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            TraceError::BufferFull => defmt::write!(fmt, "BufferFull"),
            TraceError::Disabled => defmt::write!(fmt, "Disabled"),
        }
    }
}

/// Build the standard payload for a record
pub fn encode_payload(id: u32, at: Timestamp) -> TracePayload {
    let mut payload = TracePayload::new();
    // Capacity matches the two fields exactly.
    let _ = payload.extend_from_slice(&id.to_le_bytes());
    let _ = payload.extend_from_slice(&at.as_millis().to_le_bytes());
    payload
}

/// Decode a payload produced by [`encode_payload`]
pub fn decode_payload(payload: &[u8]) -> Option<(u32, Timestamp)> {
    if payload.len() != PAYLOAD_SIZE {
        return None;
    }
    let id = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
    let at = u32::from_le_bytes([payload[4], payload[5], payload[6], payload[7]]);
    Some((id, Timestamp::from_millis(at)))
}

/// Decoded payload for records that carry a task id
pub fn decode_task(payload: &[u8]) -> Option<(TaskId, Timestamp)> {
    decode_payload(payload).map(|(id, at)| (TaskId::new(id), at))
}
