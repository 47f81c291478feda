use anyhow::{Error, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::{CalendarToolKind, CalendarWriteLock, ToolError, ToolFailure, parse_args};
use crate::core::time::{TimeWindow, format_for_display};
use crate::google::{CalendarEvent, EventQuery, SharedCalendar};
use crate::openai::{Function, Parameters, Property, ToolCall, ToolType};

const SEARCH_DAYS: i64 = 30;
const MAX_CANDIDATES: u32 = 50;

#[derive(Serialize)]
pub struct RemoveEventProps {
    pub event_identifier: Property,
}

#[derive(Deserialize)]
pub struct RemoveEventArgs {
    #[serde(default)]
    pub event_identifier: String,
}

#[derive(Serialize)]
pub struct RemoveEventTool {
    pub r#type: ToolType,
    pub function: Function<RemoveEventProps>,
    #[serde(skip)]
    calendar: SharedCalendar,
    #[serde(skip)]
    write_lock: CalendarWriteLock,
}

#[async_trait]
impl ToolCall for RemoveEventTool {
    async fn call(&self, args: &str) -> Result<String, Error> {
        self.remove(args)
            .await
            .map_err(|e| ToolFailure::new(CalendarToolKind::Cancel, e).into())
    }

    fn function_name(&self) -> String {
        self.function.name.clone()
    }
}

impl RemoveEventTool {
    pub fn new(calendar: SharedCalendar, write_lock: CalendarWriteLock) -> Self {
        let function = Function {
            name: CalendarToolKind::Cancel.name().to_string(),
            description: String::from(
                "Cancel an upcoming event by its title or part of its title. Nothing is removed when more than one event matches.",
            ),
            parameters: Parameters {
                r#type: String::from("object"),
                properties: RemoveEventProps {
                    event_identifier: Property {
                        r#type: String::from("string"),
                        description: String::from(
                            "Title or partial title of the event to cancel.",
                        ),
                    },
                },
                required: vec![String::from("event_identifier")],
                additional_properties: false,
            },
            strict: true,
        };

        Self {
            r#type: ToolType::Function,
            function,
            calendar,
            write_lock,
        }
    }

    pub async fn remove(&self, args: &str) -> Result<String, ToolError> {
        let args: RemoveEventArgs = parse_args(args)?;
        let identifier = args.event_identifier.trim();
        if identifier.is_empty() {
            return Err(ToolError::MissingIdentifier);
        }

        let window = TimeWindow::next_days(Utc::now().naive_utc(), SEARCH_DAYS)?;
        let query = EventQuery::new(window)
            .max_results(MAX_CANDIDATES)
            .ordered_by_start();

        let _guard = self.write_lock.lock().await;

        let needle = identifier.to_lowercase();
        let matching: Vec<CalendarEvent> = self
            .calendar
            .list_events(&query)
            .await?
            .into_iter()
            .filter(|e| e.title_or("").to_lowercase().contains(&needle))
            .collect();

        match matching.as_slice() {
            [] => Ok(format!(
                "❌ No events found matching '{}'. Please check the event name and try again.",
                identifier
            )),
            [event] => {
                self.calendar.delete_event(&event.id).await?;
                Ok(format!(
                    "✅ Successfully cancelled '{}' scheduled for {}",
                    event.title_or("Unnamed Event"),
                    format_for_display(event.start.as_str())
                ))
            }
            events => {
                tracing::debug!(
                    "{} events match '{}', asking for clarification",
                    events.len(),
                    identifier
                );
                let mut out = format!(
                    "Found {} events matching '{}':\n",
                    events.len(),
                    identifier
                );
                for (i, event) in events.iter().enumerate() {
                    out.push_str(&format!(
                        "{}. {} on {}\n",
                        i + 1,
                        event.title_or("Unnamed Event"),
                        format_for_display(event.start.as_str())
                    ));
                }
                out.push_str("\nPlease be more specific about which event you want to cancel.");
                Ok(out)
            }
        }
    }
}
