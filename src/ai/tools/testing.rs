//! In-memory calendar used by the tool tests. Follows the Google
//! Calendar list semantics: an event is returned when it overlaps the
//! query window.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::core::time::{parse_wall_clock, utc_label};
use crate::google::{
    CalendarError, CalendarEvent, CalendarGateway, EventQuery, EventTime, NewEvent,
};

#[derive(Default)]
pub struct FakeCalendar {
    pub events: Mutex<Vec<CalendarEvent>>,
    pub queries: Mutex<Vec<EventQuery>>,
    pub deleted: Mutex<Vec<String>>,
    pub created: Mutex<Vec<NewEvent>>,
    pub fail_with: Option<u16>,
}

impl FakeCalendar {
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self {
            events: Mutex::new(events),
            ..Self::default()
        }
    }

    pub fn shared(events: Vec<CalendarEvent>) -> Arc<Self> {
        Arc::new(Self::new(events))
    }

    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(status),
            ..Self::default()
        })
    }

    fn check_failure(&self) -> Result<(), CalendarError> {
        match self.fail_with {
            Some(status) => Err(CalendarError::Api {
                status,
                body: String::from("Backend Error"),
            }),
            None => Ok(()),
        }
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<NewEvent> {
        self.created.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    pub fn queries(&self) -> Vec<EventQuery> {
        self.queries.lock().unwrap().clone()
    }
}

fn bounds(event: &CalendarEvent) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let parse = |t: &EventTime| {
        parse_wall_clock(t.as_str()).or_else(|| {
            NaiveDate::parse_from_str(t.as_str(), "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
    };
    Some((parse(&event.start)?, parse(&event.end)?))
}

#[async_trait]
impl CalendarGateway for FakeCalendar {
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>, CalendarError> {
        self.queries.lock().unwrap().push(query.clone());
        self.check_failure()?;

        let mut matching: Vec<(NaiveDateTime, CalendarEvent)> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| {
                let (start, end) = bounds(e)?;
                query.window.overlaps(start, end).then(|| (start, e.clone()))
            })
            .collect();
        if query.order_by_start {
            matching.sort_by_key(|(start, _)| *start);
        }
        let mut events: Vec<CalendarEvent> = matching.into_iter().map(|(_, e)| e).collect();
        if let Some(max) = query.max_results {
            events.truncate(max as usize);
        }
        Ok(events)
    }

    async fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent, CalendarError> {
        self.check_failure()?;
        let mut events = self.events.lock().unwrap();
        let id = format!("evt_new_{}", events.len() + 1);
        let created = timed_event(&id, &event.summary, event.start, event.end);
        events.push(created.clone());
        self.created.lock().unwrap().push(event.clone());
        Ok(created)
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        self.check_failure()?;
        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.id != event_id);
        if events.len() == before {
            return Err(CalendarError::Api {
                status: 404,
                body: String::from("Not Found"),
            });
        }
        self.deleted.lock().unwrap().push(event_id.to_string());
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
            date: None,
            time_zone: Some(String::from("UTC")),
        },
        end: EventTime {
            date_time: Some(utc_label(&end)),
            date: None,
            time_zone: Some(String::from("UTC")),
        },
        html_link: Some(format!("https://calendar.google.com/event?eid={}", id)),
    }
}

pub fn at(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}
