//! Reusable prompts using Handlebars for templating. Handlebars adds
//! additional security controls since it can't do much out of the box
//! without registering your own helpers. This is ideal since user
//! and model text should be considered untrusted.

use std::fmt;

use anyhow::{Error, Result};
use chrono::NaiveDateTime;
use handlebars::{Handlebars, no_escape};
use serde_json::json;

#[derive(Debug)]
pub enum Prompt {
    TurnPreamble,
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<Prompt> for String {
    fn from(item: Prompt) -> String {
        format!("{:?}", item)
    }
}

// Wraps every inbound message with the current time and a reminder of
// the tools and their argument formats.
const TURN_PREAMBLE_PROMPT: &str = r#"Current: {{date}} {{time}}

{{message}}

Tools: check_calendar_availability(date_or_"all"), suggest_available_time_slots(date), book_appointment("title|date|time|hours|desc"), remove_event(title)
Format dates as YYYY-MM-DD, times as HH:MM (24h). Be concise."#;

pub fn templates<'a>() -> Result<Handlebars<'a>, Error> {
    let mut registry = Handlebars::new();
    registry.set_strict_mode(true);
    // Plain text goes to the model, not HTML
    registry.register_escape_fn(no_escape);
    registry.register_template_string(&Prompt::TurnPreamble.to_string(), TURN_PREAMBLE_PROMPT)?;
    Ok(registry)
}

/// Render the augmented prompt for one inbound message.
pub fn turn_preamble(
    templates: &Handlebars,
    now: NaiveDateTime,
    message: &str,
) -> Result<String, Error> {
    let data = json!({
        "date": now.format("%Y-%m-%d").to_string(),
        "time": now.format("%I:%M %p").to_string(),
        "message": message,
    });
    Ok(templates.render(&Prompt::TurnPreamble.to_string(), &data)?)
}
