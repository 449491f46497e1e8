//! Record Formatter
//!
//! Formats scheduler trace records for display

use std::rc::Rc;

use colored::Colorize;
use tickloop::records::decode_payload;
use tickloop::{TaskId, Timestamp, TraceHook, TraceRecord, TraceResult};

#[derive(Debug, Clone, Copy, Default)]
pub struct TraceFormatter {
    json_format: bool,
}

impl TraceFormatter {
    pub fn new(json_format: bool) -> Self {
        Self { json_format }
    }

    /// Render one record, or `None` if the payload is malformed.
    pub fn format_record(&self, record: TraceRecord, payload: &[u8]) -> Option<String> {
        let (value, at) = decode_payload(payload)?;
        Some(if self.json_format {
            self.format_json(record, value, at)
        } else {
            self.format_text(record, value, at)
        })
    }

    /// Trace hook printing every record to stdout.
    pub fn into_hook(self) -> TraceHook {
        Rc::new(move |record: TraceRecord, payload: &[u8]| -> TraceResult {
            if let Some(line) = self.format_record(record, payload) {
                println!("{line}");
            }
            Ok(())
        })
    }

    fn format_text(&self, record: TraceRecord, value: u32, at: Timestamp) -> String {
        let name = record.name();

        // Color based on record kind
        let colored_name = match record {
            TraceRecord::TimeoutArm | TraceRecord::IntervalArm => name.bright_blue(),
            TraceRecord::TimeoutFire | TraceRecord::IntervalFire => name.bright_green(),
            TraceRecord::TimeoutCancel | TraceRecord::IntervalCancel => name.yellow(),
            TraceRecord::IntervalStop => name.cyan(),
            TraceRecord::IntervalAbandon => name.bright_red().bold(),
            TraceRecord::RemovalDrain => name.dimmed(),
            TraceRecord::Attach | TraceRecord::Detach => name.bright_white(),
        };

        let subject = match record {
            TraceRecord::RemovalDrain => format!("removed={value}"),
            TraceRecord::Attach | TraceRecord::Detach => String::new(),
            _ => format!("task={}", TaskId::new(value)).bright_white().to_string(),
        };

        let timestamp = format!("[{:>10}]", at.as_millis()).dimmed();
        format!("{timestamp} {colored_name:18} {subject}")
            .trim_end()
            .to_string()
    }

    fn format_json(&self, record: TraceRecord, value: u32, at: Timestamp) -> String {
        let json = serde_json::json!({
            "time": at.as_millis(),
            "type": record.name(),
            "code": record.raw(),
            "value": value,
        });
        json.to_string()
    }
}
