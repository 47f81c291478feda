use std::str::FromStr;

use anyhow::{Error, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{CalendarToolKind, CalendarWriteLock, ToolError, ToolFailure, parse_args};
use crate::core::time::{TimeWindow, format_naive_for_display};
use crate::google::{EventQuery, NewEvent, SharedCalendar};
use crate::openai::{Function, Parameters, Property, ToolCall, ToolType};

const DEFAULT_DURATION_HOURS: u32 = 1;

/// A validated `title|YYYY-MM-DD|HH:MM|duration_hours|description`
/// string. Duration and description are optional.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingRequest {
    pub title: String,
    pub start: NaiveDateTime,
    pub duration_hours: u32,
    pub description: Option<String>,
}

impl FromStr for BookingRequest {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('|').map(str::trim).collect();
        if parts.len() < 3 || parts[..3].iter().any(|p| p.is_empty()) {
            return Err(ToolError::BookingFormat);
        }

        let title = parts[0].to_string();
        let date = NaiveDate::parse_from_str(parts[1], "%Y-%m-%d")
            .map_err(|_| ToolError::InvalidDate(parts[1].to_string()))?;
        let time = NaiveTime::parse_from_str(parts[2], "%H:%M")
            .map_err(|_| ToolError::InvalidTime(parts[2].to_string()))?;

        // Anything that isn't a positive whole number of hours falls
        // back to the default
        let duration_hours = parts
            .get(3)
            .and_then(|d| d.parse::<u32>().ok())
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_DURATION_HOURS);

        // The description may itself contain pipes
        let description = parts
            .get(4..)
            .map(|rest| rest.join("|").trim().to_string())
            .filter(|d| !d.is_empty());

        let request = Self {
            title,
            start: NaiveDateTime::new(date, time),
            duration_hours,
            description,
        };
        request.end()?;
        Ok(request)
    }
}

impl BookingRequest {
    /// Fails when the duration runs past the last representable date.
    pub fn end(&self) -> Result<NaiveDateTime, ToolError> {
        self.start
            .checked_add_signed(Duration::hours(i64::from(self.duration_hours)))
            .ok_or(ToolError::InvalidDuration(self.duration_hours))
    }

    pub fn window(&self) -> Result<TimeWindow, ToolError> {
        Ok(TimeWindow::new(self.start, self.end()?)?)
    }

    fn to_new_event(&self) -> Result<NewEvent, ToolError> {
        Ok(NewEvent {
            summary: self.title.clone(),
            description: self.description.clone().unwrap_or_else(|| {
                format!("Appointment booked via AI Assistant: {}", self.title)
            }),
            start: self.start,
            end: self.end()?,
        })
    }
}

#[derive(Serialize)]
pub struct BookAppointmentProps {
    pub appointment_details: Property,
}

#[derive(Deserialize)]
pub struct BookAppointmentArgs {
    #[serde(default)]
    pub appointment_details: String,
}

#[derive(Serialize)]
pub struct BookAppointmentTool {
    pub r#type: ToolType,
    pub function: Function<BookAppointmentProps>,
    #[serde(skip)]
    calendar: SharedCalendar,
    #[serde(skip)]
    write_lock: CalendarWriteLock,
}

#[async_trait]
impl ToolCall for BookAppointmentTool {
    async fn call(&self, args: &str) -> Result<String, Error> {
        self.book(args)
            .await
            .map_err(|e| ToolFailure::new(CalendarToolKind::Book, e).into())
    }

    fn function_name(&self) -> String {
        self.function.name.clone()
    }
}

impl BookAppointmentTool {
    pub fn new(calendar: SharedCalendar, write_lock: CalendarWriteLock) -> Self {
        let function = Function {
            name: CalendarToolKind::Book.name().to_string(),
            description: String::from(
                "Book an appointment if the time is free. Example: \"Meeting|2025-07-07|10:00|1|Team sync\"",
            ),
            parameters: Parameters {
                r#type: String::from("object"),
                properties: BookAppointmentProps {
                    appointment_details: Property {
                        r#type: String::from("string"),
                        description: String::from(
                            "title|YYYY-MM-DD|HH:MM|duration_hours|description with the time in 24h. Duration and description are optional.",
                        ),
                    },
                },
                required: vec![String::from("appointment_details")],
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

    pub async fn book(&self, args: &str) -> Result<String, ToolError> {
        let args: BookAppointmentArgs = parse_args(args)?;
        let request: BookingRequest = args.appointment_details.parse()?;
        let window = request.window()?;

        let _guard = self.write_lock.lock().await;

        let existing = self.calendar.list_events(&EventQuery::new(window)).await?;
        if let Some(conflict) = existing.first() {
            tracing::debug!(
                "Booking '{}' conflicts with event {}",
                request.title,
                conflict.id
            );
            return Ok(format!(
                "⚠️ Time slot conflicts with existing event: {}. Please choose a different time.",
                conflict.title_or("Unnamed event")
            ));
        }

        let created = self.calendar.create_event(&request.to_new_event()?).await?;

        let hours = request.duration_hours;
        Ok(format!(
            "✅ Successfully booked '{}' for {} (Duration: {} hour{})\n\nEvent ID: {}\nCalendar Link: {}",
            request.title,
            format_naive_for_display(&request.start),
            hours,
            if hours == 1 { "" } else { "s" },
            created.id,
            created.html_link.as_deref().unwrap_or("N/A")
        ))
    }
}
