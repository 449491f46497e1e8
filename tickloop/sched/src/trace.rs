use tickloop_core::trace::encode_payload;
use tickloop_core::{TaskId, Timestamp, TraceHook, TraceRecord};

/// Emits scheduler records to an optional trace hook.
#[derive(Clone, Default)]
pub(crate) struct Tracer {
    hook: Option<TraceHook>,
}

impl Tracer {
    pub(crate) fn new(hook: Option<TraceHook>) -> Self {
        Self { hook }
    }

    pub(crate) fn hook(&self) -> Option<TraceHook> {
        self.hook.clone()
    }

    pub(crate) fn task(&self, record: TraceRecord, id: TaskId, at: Timestamp) {
        self.emit(record, id.raw(), at);
    }

    /// Records without a task carry a count (or zero) in the id slot.
    pub(crate) fn emit(&self, record: TraceRecord, value: u32, at: Timestamp) {
        if let Some(hook) = &self.hook {
            let payload = encode_payload(value, at);
            // Sink failures never affect scheduling.
            let _ = hook(record, &payload);
        }
    }
}
