use anyhow::{Error, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{CalendarToolKind, ToolError, ToolFailure, parse_args};
use crate::core::time::TimeWindow;
use crate::google::{EventQuery, SharedCalendar};
use crate::openai::{Function, Parameters, Property, ToolCall, ToolType};

/// Candidate slot start hours, tried in order.
const BUSINESS_HOURS: [u32; 4] = [9, 11, 13, 15];
const MAX_SUGGESTIONS: usize = 3;

#[derive(Serialize)]
pub struct SuggestSlotsProps {
    pub date: Property,
}

#[derive(Deserialize)]
pub struct SuggestSlotsArgs {
    #[serde(default)]
    pub date: String,
}

#[derive(Serialize)]
pub struct SuggestSlotsTool {
    pub r#type: ToolType,
    pub function: Function<SuggestSlotsProps>,
    #[serde(skip)]
    calendar: SharedCalendar,
}

#[async_trait]
impl ToolCall for SuggestSlotsTool {
    async fn call(&self, args: &str) -> Result<String, Error> {
        self.suggest(args)
            .await
            .map_err(|e| ToolFailure::new(CalendarToolKind::SuggestSlots, e).into())
    }

    fn function_name(&self) -> String {
        self.function.name.clone()
    }
}

impl SuggestSlotsTool {
    pub fn new(calendar: SharedCalendar) -> Self {
        let function = Function {
            name: CalendarToolKind::SuggestSlots.name().to_string(),
            description: String::from(
                "Suggest up to three free one hour slots during business hours on a given day.",
            ),
            parameters: Parameters {
                r#type: String::from("object"),
                properties: SuggestSlotsProps {
                    date: Property {
                        r#type: String::from("string"),
                        description: String::from("The day to search, formatted YYYY-MM-DD."),
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

    pub async fn suggest(&self, args: &str) -> Result<String, ToolError> {
        let args: SuggestSlotsArgs = parse_args(args)?;
        let input = args.date.trim();
        let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .map_err(|_| ToolError::InvalidDate(input.to_string()))?;

        let free = self.free_slots(date).await?;
        if free.is_empty() {
            return Ok(format!(
                "No available slots found for {} during business hours (9 AM - 5 PM). Try a different date?",
                input
            ));
        }

        let mut out = format!("Available time slots for {}:\n", date.format("%B %d, %Y"));
        for (i, window) in free.iter().enumerate() {
            out.push_str(&format!(
                "{}. {} - {}\n",
                i + 1,
                window.min().format("%I:%M %p"),
                window.max().format("%I:%M %p")
            ));
        }
        Ok(out.trim().to_string())
    }

    /// Probe each candidate hour with its own query and stop as soon as
    /// enough free ones are found.
    async fn free_slots(&self, date: NaiveDate) -> Result<Vec<TimeWindow>, ToolError> {
        let mut free = Vec::new();
        for hour in BUSINESS_HOURS {
            let start = NaiveDateTime::new(date, slot_time(hour));
            let window = TimeWindow::starting_at(start, Duration::hours(1))?;
            let events = self.calendar.list_events(&EventQuery::new(window)).await?;
            if events.is_empty() {
                free.push(window);
            }
            if free.len() >= MAX_SUGGESTIONS {
                break;
            }
        }
        Ok(free)
    }
}

fn slot_time(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}
