//! Google Calendar v3 client scoped to a single calendar.
//!
//! The calendar ID is resolved once when the client is created and
//! reused for every call after that.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::CalendarError;
use super::oauth::TokenSource;
use crate::core::time::{TimeWindow, utc_label};

pub const PRIMARY_CALENDAR: &str = "primary";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    // Only set for all-day events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventTime {
    /// The `dateTime` if there is one, otherwise the all-day `date`.
    pub fn as_str(&self) -> &str {
        self.date_time
            .as_deref()
            .or(self.date.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub start: EventTime,
    #[serde(default)]
    pub end: EventTime,
    pub html_link: Option<String>,
}

impl CalendarEvent {
    pub fn title_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.summary.as_deref().unwrap_or(placeholder)
    }
}

#[derive(Debug, Deserialize)]
struct ListEventsResponse {
    #[serde(default)]
    items: Vec<CalendarEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListEntry {
    id: String,
    access_role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
}

#[derive(Debug, Clone)]
pub struct EventQuery {
    pub window: TimeWindow,
    pub max_results: Option<u32>,
    pub order_by_start: bool,
}

impl EventQuery {
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            max_results: None,
            order_by_start: false,
        }
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = Some(max_results);
        self
    }

    pub fn ordered_by_start(mut self) -> Self {
        self.order_by_start = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub summary: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl NewEvent {
    fn to_body(&self) -> serde_json::Value {
        json!({
            "summary": self.summary,
            "description": self.description,
            "start": {"dateTime": utc_label(&self.start), "timeZone": "UTC"},
            "end": {"dateTime": utc_label(&self.end), "timeZone": "UTC"},
        })
    }
}

/// The calendar operations the tools need. `GoogleCalendar` is the
/// real implementation.
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    /// Events overlapping the query window with recurring events
    /// expanded into instances.
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>, CalendarError>;

    /// Insert a timed event. No overlap checks are done here.
    async fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent, CalendarError>;

    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError>;
}

pub type SharedCalendar = Arc<dyn CalendarGateway>;

pub struct GoogleCalendar {
    client: Client,
    api_base_url: String,
    calendar_id: String,
    tokens: TokenSource,
}

impl GoogleCalendar {
    /// Create a client, resolving the calendar to use unless one is
    /// given explicitly.
    pub async fn connect(
        api_base_url: &str,
        tokens: TokenSource,
        calendar_id: Option<String>,
    ) -> Self {
        let client = Client::new();
        let api_base_url = api_base_url.trim_end_matches('/').to_string();

        let calendar_id = match calendar_id {
            Some(id) => id,
            None => match resolve_calendar_id(&client, &api_base_url, &tokens).await {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(
                        "Calendar lookup failed, falling back to {}: {}",
                        PRIMARY_CALENDAR,
                        e
                    );
                    PRIMARY_CALENDAR.to_string()
                }
            },
        };
        tracing::info!("Using calendar {}", calendar_id);

        Self {
            client,
            api_base_url,
            calendar_id,
            tokens,
        }
    }

    pub fn calendar_id(&self) -> &str {
        &self.calendar_id
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.api_base_url,
            urlencoding::encode(&self.calendar_id)
        )
    }
}

/// First calendar the account owns, else the primary alias.
async fn resolve_calendar_id(
    client: &Client,
    api_base_url: &str,
    tokens: &TokenSource,
) -> Result<String, CalendarError> {
    let access_token = tokens.access_token().await?;
    let url = format!("{}/users/me/calendarList", api_base_url);
    let res = client.get(&url).bearer_auth(access_token).send().await?;
    let text = check_status(res).await?;
    let calendars: CalendarListResponse = serde_json::from_str(&text)?;

    let owned = calendars
        .items
        .into_iter()
        .find(|cal| cal.access_role.as_deref() == Some("owner"))
        .map(|cal| cal.id);

    Ok(owned.unwrap_or_else(|| PRIMARY_CALENDAR.to_string()))
}

async fn check_status(res: reqwest::Response) -> Result<String, CalendarError> {
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(CalendarError::Api {
            status: status.as_u16(),
            body: text,
        });
    }
    Ok(text)
}

#[async_trait]
impl CalendarGateway for GoogleCalendar {
    async fn list_events(&self, query: &EventQuery) -> Result<Vec<CalendarEvent>, CalendarError> {
        let access_token = self.tokens.access_token().await?;

        let mut params = vec![
            ("timeMin", query.window.min_param()),
            ("timeMax", query.window.max_param()),
            ("singleEvents", String::from("true")),
        ];
        if let Some(max_results) = query.max_results {
            params.push(("maxResults", max_results.to_string()));
        }
        if query.order_by_start {
            params.push(("orderBy", String::from("startTime")));
        }

        tracing::debug!("Listing events {:?}", params);

        let res = self
            .client
            .get(self.events_url())
            .bearer_auth(access_token)
            .query(&params)
            .send()
            .await?;
        let text = check_status(res).await?;
        let events: ListEventsResponse = serde_json::from_str(&text)?;
        Ok(events.items)
    }

    async fn create_event(&self, event: &NewEvent) -> Result<CalendarEvent, CalendarError> {
        let access_token = self.tokens.access_token().await?;
        let res = self
            .client
            .post(self.events_url())
            .bearer_auth(access_token)
            .json(&event.to_body())
            .send()
            .await?;
        let text = check_status(res).await?;
        let created: CalendarEvent = serde_json::from_str(&text)?;
        tracing::info!("Created event {} ({})", created.id, event.summary);
        Ok(created)
    }

    async fn delete_event(&self, event_id: &str) -> Result<(), CalendarError> {
        let access_token = self.tokens.access_token().await?;
        let url = format!("{}/{}", self.events_url(), urlencoding::encode(event_id));
        let res = self
            .client
            .delete(url)
            .bearer_auth(access_token)
            .send()
            .await?;
        check_status(res).await?;
        tracing::info!("Deleted event {}", event_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mockito::Matcher;

    fn tokens() -> TokenSource {
        TokenSource::from_access_token("test_token")
    }

    async fn calendar(server: &mockito::Server) -> GoogleCalendar {
        GoogleCalendar::connect(&server.url(), tokens(), Some(String::from("cal_001"))).await
    }

    #[test]
    fn test_event_time_prefers_date_time() {
        let timed = EventTime {
            date_time: Some(String::from("2025-07-07T10:00:00Z")),
            date: None,
            time_zone: None,
        };
        assert_eq!(timed.as_str(), "2025-07-07T10:00:00Z");

        let all_day = EventTime {
            date_time: None,
            date: Some(String::from("2025-07-07")),
            time_zone: None,
        };
        assert_eq!(all_day.as_str(), "2025-07-07");
        assert_eq!(EventTime::default().as_str(), "");
    }

    #[test]
    fn test_new_event_body() {
        let start = NaiveDate::from_ymd_opt(2025, 7, 7)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let event = NewEvent {
            summary: String::from("Meeting"),
            description: String::from("desc"),
            start,
            end: start + chrono::Duration::hours(2),
        };
        let body = event.to_body();
        assert_eq!(body["start"]["dateTime"], "2025-07-07T10:00:00Z");
        assert_eq!(body["end"]["dateTime"], "2025-07-07T12:00:00Z");
        assert_eq!(body["start"]["timeZone"], "UTC");
    }

    #[tokio::test]
    async fn test_resolves_owner_calendar() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/me/calendarList")
            .match_header("authorization", "Bearer test_token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items": [
                    {"id": "shared_cal", "accessRole": "reader"},
                    {"id": "owned_cal", "accessRole": "owner"}
                ]}"#,
            )
            .create_async()
            .await;

        let gcal = GoogleCalendar::connect(&server.url(), tokens(), None).await;
        assert_eq!(gcal.calendar_id(), "owned_cal");
    }

    #[tokio::test]
    async fn test_resolves_primary_without_owner() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/me/calendarList")
            .with_status(200)
            .with_body(r#"{"items": [{"id": "shared_cal", "accessRole": "reader"}]}"#)
            .create_async()
            .await;

        let gcal = GoogleCalendar::connect(&server.url(), tokens(), None).await;
        assert_eq!(gcal.calendar_id(), PRIMARY_CALENDAR);
    }

    #[tokio::test]
    async fn test_resolves_primary_on_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/users/me/calendarList")
            .with_status(403)
            .with_body(r#"{"error": {"message": "Forbidden"}}"#)
            .create_async()
            .await;

        let gcal = GoogleCalendar::connect(&server.url(), tokens(), None).await;
        assert_eq!(gcal.calendar_id(), PRIMARY_CALENDAR);
    }

    #[tokio::test]
    async fn test_list_events() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/calendars/cal_001/events")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("timeMin".into(), "2025-07-07T00:00:00Z".into()),
                Matcher::UrlEncoded("timeMax".into(), "2025-07-08T00:00:00Z".into()),
                Matcher::UrlEncoded("singleEvents".into(), "true".into()),
                Matcher::UrlEncoded("maxResults".into(), "10".into()),
                Matcher::UrlEncoded("orderBy".into(), "startTime".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"items": [
                    {
                        "id": "evt_001",
                        "summary": "Team Sync",
                        "start": {"dateTime": "2025-07-07T10:00:00Z"},
                        "end": {"dateTime": "2025-07-07T11:00:00Z"},
                        "htmlLink": "https://calendar.google.com/event?eid=evt_001"
                    },
                    {
                        "id": "evt_002",
                        "start": {"date": "2025-07-07"},
                        "end": {"date": "2025-07-08"}
                    }
                ]}"#,
            )
            .create_async()
            .await;

        let gcal = calendar(&server).await;
        let window = TimeWindow::day(NaiveDate::from_ymd_opt(2025, 7, 7).unwrap());
        let events = gcal
            .list_events(&EventQuery::new(window).max_results(10).ordered_by_start())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title_or("No Title"), "Team Sync");
        assert_eq!(events[1].title_or("No Title"), "No Title");
        assert_eq!(events[1].start.as_str(), "2025-07-07");
    }

    #[tokio::test]
    async fn test_list_events_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/calendars/cal_001/events")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error": {"message": "Unauthorized"}}"#)
            .create_async()
            .await;

        let gcal = calendar(&server).await;
        let window = TimeWindow::day(NaiveDate::from_ymd_opt(2025, 7, 7).unwrap());
        let err = gcal.list_events(&EventQuery::new(window)).await.unwrap_err();
        assert!(matches!(err, CalendarError::Api { status: 401, .. }));
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[tokio::test]
    async fn test_create_event() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/calendars/cal_001/events")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "summary": "Meeting",
                "start": {"dateTime": "2025-07-07T10:00:00Z", "timeZone": "UTC"},
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "id": "evt_new",
                    "summary": "Meeting",
                    "start": {"dateTime": "2025-07-07T10:00:00Z"},
                    "end": {"dateTime": "2025-07-07T11:00:00Z"},
                    "htmlLink": "https://calendar.google.com/event?eid=evt_new"
                }"#,
            )
            .create_async()
            .await;

        let gcal = calendar(&server).await;
        let start = NaiveDate::from_ymd_opt(2025, 7, 7)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let created = gcal
            .create_event(&NewEvent {
                summary: String::from("Meeting"),
                description: String::from("Team sync"),
                start,
                end: start + chrono::Duration::hours(1),
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(created.id, "evt_new");
    }

    #[tokio::test]
    async fn test_delete_event() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/calendars/cal_001/events/evt_001")
            .with_status(204)
            .create_async()
            .await;

        let gcal = calendar(&server).await;
        gcal.delete_event("evt_001").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_missing_event_surfaces_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/calendars/cal_001/events/gone")
            .with_status(410)
            .with_body(r#"{"error": {"message": "Resource has been deleted"}}"#)
            .create_async()
            .await;

        let gcal = calendar(&server).await;
        let err = gcal.delete_event("gone").await.unwrap_err();
        assert!(matches!(err, CalendarError::Api { status: 410, .. }));
    }
}
