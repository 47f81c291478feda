use std::fmt;

use thiserror::Error;

use crate::core::time::InvalidWindow;
use crate::google::CalendarError;

/// The closed set of calendar operations the model can call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarToolKind {
    CheckAvailability,
    SuggestSlots,
    Book,
    Cancel,
}

impl CalendarToolKind {
    pub const ALL: [CalendarToolKind; 4] = [
        CalendarToolKind::CheckAvailability,
        CalendarToolKind::SuggestSlots,
        CalendarToolKind::Book,
        CalendarToolKind::Cancel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CalendarToolKind::CheckAvailability => "check_calendar_availability",
            CalendarToolKind::SuggestSlots => "suggest_available_time_slots",
            CalendarToolKind::Book => "book_appointment",
            CalendarToolKind::Cancel => "remove_event",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

impl fmt::Display for CalendarToolKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    Arguments(#[from] serde_json::Error),
    #[error(
        "Invalid format. Please provide: title|YYYY-MM-DD|HH:MM|duration_hours|description (last two are optional)"
    )]
    BookingFormat,
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid time '{0}', expected HH:MM (24h)")]
    InvalidTime(String),
    #[error("duration of {0} hours is too long")]
    InvalidDuration(u32),
    #[error("an event title to search for is required")]
    MissingIdentifier,
    #[error(transparent)]
    Window(#[from] InvalidWindow),
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}

/// A `ToolError` tagged with the tool that raised it. Its `Display` is
/// the text handed back to the model.
#[derive(Debug)]
pub struct ToolFailure {
    pub kind: CalendarToolKind,
    pub error: ToolError,
}

impl ToolFailure {
    pub fn new(kind: CalendarToolKind, error: ToolError) -> Self {
        Self { kind, error }
    }
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.kind, &self.error) {
            (CalendarToolKind::Book, ToolError::BookingFormat) => write!(f, "❌ {}", self.error),
            (CalendarToolKind::CheckAvailability, e) => write!(f, "Error checking calendar: {}", e),
            (CalendarToolKind::SuggestSlots, e) => write!(f, "Error suggesting time slots: {}", e),
            (CalendarToolKind::Book, e) => write!(f, "❌ Error booking appointment: {}", e),
            (CalendarToolKind::Cancel, e) => write!(f, "❌ Error removing event: {}", e),
        }
    }
}

impl std::error::Error for ToolFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}
