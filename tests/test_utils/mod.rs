//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use axum::{Router, body::Body};
use chrono::NaiveDateTime;

use booking_agent::ai::chat::BookingAgent;
use booking_agent::ai::tools::calendar_tools;
use booking_agent::api::{AppState, app};
use booking_agent::core::AppConfig;
use booking_agent::core::time::{parse_wall_clock, utc_label};
use booking_agent::google::{
    CalendarError, CalendarEvent, CalendarGateway, EventQuery, EventTime, NewEvent,
};
use booking_agent::openai::LanguageModel;

/// Calendar kept in memory so the API can be exercised without Google.
#[derive(Default)]
pub struct MemoryCalendar {
    events: Mutex<Vec<CalendarEvent>>,
}

impl MemoryCalendar {
    pub fn with_events(events: Vec<CalendarEvent>) -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(events),
        })
    }

    pub fn events(&self) -> Vec<CalendarEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl CalendarGateway for MemoryCalendar {
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>, CalendarError> {
        let events = self.events.lock().unwrap();
        Ok(events
            .iter()
            .filter(|e| {
                match (
                    parse_wall_clock(e.start.as_str()),
                    parse_wall_clock(e.end.as_str()),
                ) {
                    (Some(start), Some(end)) => query.window.overlaps(start, end),
                    _ => false,
                }
            })
            .cloned()
            .collect())
    }

    async fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent, CalendarError> {
        let mut events = self.events.lock().unwrap();
        let created = timed_event(
            &format!("evt_{}", events.len() + 1),
            &event.summary,
            event.start,
            event.end,
        );
        events.push(created.clone());
        Ok(created)
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        self.events.lock().unwrap().retain(|e| e.id != event_id);
        Ok(())
    }
}

pub fn timed_event(
    id: &str,
    summary: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: Some(summary.to_string()),
        description: None,
        start: EventTime {
            date_time: Some(utc_label(&start)),
            ..EventTime::default()
        },
        end: EventTime {
            date_time: Some(utc_label(&end)),
            ..EventTime::default()
        },
        html_link: None,
    }
}

fn test_config(llm_url: &str) -> AppConfig {
    AppConfig {
        openai_api_hostname: llm_url.to_string(),
        openai_api_key: String::from("test-api-key"),
        openai_model: String::from("gpt-4.1-mini"),
        openai_fallback_model: String::from("gpt-4o-mini"),
        system_message: String::from("You are a helpful calendar assistant."),
        max_iterations: 3,
        gcal_api_url: String::from("http://localhost:9"),
        google_token_url: String::from("http://localhost:9/token"),
        google_client_id: None,
        google_client_secret: None,
        google_refresh_token: None,
        google_access_token: Some(String::from("test_token")),
        calendar_id: Some(String::from("cal_001")),
    }
}

/// Creates a test application router with an agent that talks to the
/// mock language model at `llm_url` and the given calendar.
pub fn test_app(llm_url: &str, calendar: Arc<MemoryCalendar>) -> Router {
    let config = test_config(llm_url);
    let model = LanguageModel::new(llm_url, &config.openai_api_key, &config.openai_model);
    let agent = BookingAgent::builder(model)
        .tools(calendar_tools(calendar))
        .system_message(&config.system_message)
        .max_iterations(config.max_iterations)
        .build()
        .expect("Failed to build agent");

    let app_state = AppState::new(Some(agent), config);
    app(Arc::new(RwLock::new(app_state)))
}

/// Creates a test application router where the agent failed to start.
pub fn test_app_without_agent() -> Router {
    let app_state = AppState::new(None, test_config("http://localhost:9"));
    app(Arc::new(RwLock::new(app_state)))
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not utf8")
}

pub fn text_completion(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "model": "gpt-4.1-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

pub fn tool_call_completion(name: &str, arguments: serde_json::Value) -> String {
    serde_json::json!({
        "id": "chatcmpl-122",
        "object": "chat.completion",
        "model": "gpt-4.1-mini",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_abc123",
                    "type": "function",
                    "function": {"name": name, "arguments": arguments.to_string()}
                }]
            },
            "finish_reason": "tool_calls"
        }]
    })
    .to_string()
}
