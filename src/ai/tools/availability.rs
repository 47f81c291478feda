use anyhow::{Error, Result};
use async_trait::async_trait;
use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CalendarToolKind, ToolError, ToolFailure, parse_args};
use crate::core::time::{TimeWindow, classify_time_status, format_for_display};
use crate::google::{EventQuery, SharedCalendar};
use crate::openai::{Function, Parameters, Property, ToolCall, ToolType};

const MAX_EVENTS: u32 = 10;
const UPCOMING_DAYS: i64 = 7;
const ALL_DAYS: i64 = 30;

#[derive(Serialize)]
pub struct CheckAvailabilityProps {
    pub date: Property,
}

#[derive(Deserialize)]
pub struct CheckAvailabilityArgs {
    #[serde(default)]
    pub date: Option<String>,
}

/// What part of the calendar the caller asked about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AvailabilityScope {
    Upcoming,
    All,
    Day(NaiveDate),
}

impl AvailabilityScope {
    pub fn parse(input: Option<&str>) -> Result<Self, ToolError> {
        let input = input.map(str::trim).unwrap_or_default();
        if input.is_empty() {
            return Ok(Self::Upcoming);
        }
        match input.to_lowercase().as_str() {
            "all" | "all meetings" | "meetings" => Ok(Self::All),
            _ => NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .map(Self::Day)
                .map_err(|_| ToolError::InvalidDate(input.to_string())),
        }
    }

    fn window(&self, now: NaiveDateTime) -> Result<TimeWindow, ToolError> {
        let window = match self {
            Self::Upcoming => TimeWindow::next_days(now, UPCOMING_DAYS)?,
            Self::All => TimeWindow::next_days(now, ALL_DAYS)?,
            Self::Day(date) => TimeWindow::day(*date),
        };
        Ok(window)
    }

    fn free_message(&self) -> String {
        match self {
            Self::All => String::from(
                "📅 Great news! You have no meetings or events scheduled. Your calendar is completely free!",
            ),
            Self::Day(date) => format!(
                "📅 Your calendar is completely free on {}! No events scheduled.",
                date.format("%Y-%m-%d")
            ),
            Self::Upcoming => String::from(
                "📅 Your calendar looks clear for the next week. No upcoming events found.",
            ),
        }
    }
}

#[derive(Serialize)]
pub struct CheckAvailabilityTool {
    pub r#type: ToolType,
    pub function: Function<CheckAvailabilityProps>,
    #[serde(skip)]
    calendar: SharedCalendar,
}

#[async_trait]
impl ToolCall for CheckAvailabilityTool {
    async fn call(&self, args: &str) -> Result<String, Error> {
        self.check(args)
            .await
            .map_err(|e| ToolFailure::new(CalendarToolKind::CheckAvailability, e).into())
    }

    fn function_name(&self) -> String {
        self.function.name.clone()
    }
}

impl CheckAvailabilityTool {
    pub fn new(calendar: SharedCalendar) -> Self {
        let function = Function {
            name: CalendarToolKind::CheckAvailability.name().to_string(),
            description: String::from(
                "List the events on the user's calendar. Use it to see what is scheduled or whether the user is free.",
            ),
            parameters: Parameters {
                r#type: String::from("object"),
                properties: CheckAvailabilityProps {
                    date: Property {
                        r#type: String::from("string"),
                        description: String::from(
                            "A date as YYYY-MM-DD, \"all\" for the next 30 days, or an empty string for the next week.",
                        ),
                    },
                },
                required: vec![String::from("date")],
                additional_properties: false,
            },
            strict: true,
        };

        Self {
            r#type: ToolType::Function,
            function,
            calendar,
        }
    }

    pub async fn check(&self, args: &str) -> Result<String, ToolError> {
        let args: CheckAvailabilityArgs = parse_args(args)?;
        let scope = AvailabilityScope::parse(args.date.as_deref())?;
        let window = scope.window(Utc::now().naive_utc())?;

        let events = self
            .calendar
            .list_events(&EventQuery::new(window).max_results(MAX_EVENTS).ordered_by_start())
            .await?;

        if events.is_empty() {
            return Ok(scope.free_message());
        }

        let now = Local::now().naive_local();
        let mut out = format!("Found {} event(s):\n", events.len());
        for event in &events {
            let start = event.start.as_str();
            out.push_str(&format!(
                "• {} on {}{}\n",
                event.title_or("No Title"),
                format_for_display(start),
                classify_time_status(start, now)
            ));
        }
        Ok(out.trim().to_string())
    }
}
