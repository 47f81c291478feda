pub mod gcal;
pub mod oauth;

pub use gcal::{
    CalendarEvent, CalendarGateway, EventQuery, EventTime, GoogleCalendar, NewEvent,
    SharedCalendar,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("request to Google Calendar failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Google Calendar API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("unexpected response from Google Calendar: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Google authentication failed: {0}")]
    Auth(String),
}
