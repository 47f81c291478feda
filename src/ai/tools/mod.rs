//! Calendar tools offered to the model. Each one deserializes a typed
//! argument record, talks to the calendar and replies with text.
//! Failures come back as a `ToolFailure` which the chat loop renders.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use crate::google::SharedCalendar;
use crate::openai::BoxedToolCall;

mod error;
pub use error::{CalendarToolKind, ToolError, ToolFailure};

pub mod availability;
pub use availability::CheckAvailabilityTool;

pub mod slots;
pub use slots::SuggestSlotsTool;

pub mod booking;
pub use booking::{BookAppointmentTool, BookingRequest};

pub mod cancel;
pub use cancel::RemoveEventTool;

#[cfg(test)]
pub(crate) mod testing;

/// Serializes check-then-act sequences (conflict check then insert,
/// match then delete) against the calendar within this process.
pub type CalendarWriteLock = Arc<Mutex<()>>;

/// All four calendar tools sharing one calendar and write lock.
pub fn calendar_tools(calendar: SharedCalendar) -> Vec<BoxedToolCall> {
    let write_lock: CalendarWriteLock = Arc::new(Mutex::new(()));
    vec![
        Box::new(CheckAvailabilityTool::new(Arc::clone(&calendar))) as BoxedToolCall,
        Box::new(SuggestSlotsTool::new(Arc::clone(&calendar))),
        Box::new(BookAppointmentTool::new(
            Arc::clone(&calendar),
            Arc::clone(&write_lock),
        )),
        Box::new(RemoveEventTool::new(calendar, write_lock)),
    ]
}

/// Models sometimes send no arguments at all for tools whose
/// parameters are optional.
fn parse_args<T: DeserializeOwned>(args: &str) -> Result<T, ToolError> {
    let args = args.trim();
    let args = if args.is_empty() { "{}" } else { args };
    Ok(serde_json::from_str(args)?)
}
