//! Time helpers shared by the calendar tools: rendering calendar
//! timestamps for people and bounding calendar queries.
//!
//! Timestamps are treated as wall-clock values. A trailing `Z` or UTC
//! offset is dropped rather than converted so that what the user
//! booked is what they see.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

const DISPLAY_FORMAT: &str = "%B %d, %Y at %I:%M %p";
const QUERY_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Events have no reliable duration for status purposes so every timed
/// event is assumed to take an hour.
const ASSUMED_EVENT_HOURS: i64 = 1;

/// Parse a calendar timestamp into its wall-clock time. Returns `None`
/// for date-only values and anything malformed.
pub fn parse_wall_clock(timestamp: &str) -> Option<NaiveDateTime> {
    if !timestamp.contains('T') {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(dt.naive_local());
    }
    let trimmed = timestamp.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .ok()
}

/// Render a timestamp as "Month DD, YYYY at HH:MM AM/PM". Date-only
/// and malformed input is returned unchanged.
pub fn format_for_display(timestamp: &str) -> String {
    match parse_wall_clock(timestamp) {
        Some(dt) => dt.format(DISPLAY_FORMAT).to_string(),
        None => timestamp.to_string(),
    }
}

pub fn format_naive_for_display(dt: &NaiveDateTime) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeStatus {
    Unknown,
    Finished,
    HappeningNow,
    Upcoming,
}

impl TimeStatus {
    pub fn suffix(&self) -> &'static str {
        match self {
            TimeStatus::Unknown => "",
            TimeStatus::Finished => " (already finished)",
            TimeStatus::HappeningNow => " (happening now!)",
            TimeStatus::Upcoming => " (upcoming)",
        }
    }
}

impl fmt::Display for TimeStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Classify an event relative to `now`. All-day events and malformed
/// start times have no status.
pub fn classify_time_status(event_start: &str, now: NaiveDateTime) -> TimeStatus {
    let Some(start) = parse_wall_clock(event_start) else {
        return TimeStatus::Unknown;
    };
    let end = start + Duration::hours(ASSUMED_EVENT_HOURS);

    if end < now {
        TimeStatus::Finished
    } else if start <= now {
        TimeStatus::HappeningNow
    } else {
        TimeStatus::Upcoming
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid time window: {min} is not before {max}")]
pub struct InvalidWindow {
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
}

/// Half-open interval `[min, max)` used to bound calendar queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    min: NaiveDateTime,
    max: NaiveDateTime,
}

impl TimeWindow {
    pub fn new(min: NaiveDateTime, max: NaiveDateTime) -> Result<Self, InvalidWindow> {
        if min >= max {
            return Err(InvalidWindow { min, max });
        }
        Ok(Self { min, max })
    }

    /// The whole calendar day.
    pub fn day(date: NaiveDate) -> Self {
        let min = date.and_time(NaiveTime::MIN);
        Self {
            min,
            max: min + Duration::days(1),
        }
    }

    pub fn starting_at(start: NaiveDateTime, length: Duration) -> Result<Self, InvalidWindow> {
        Self::new(start, start + length)
    }

    /// `now` through `now + days`.
    pub fn next_days(now: NaiveDateTime, days: i64) -> Result<Self, InvalidWindow> {
        Self::starting_at(now, Duration::days(days))
    }

    pub fn min(&self) -> NaiveDateTime {
        self.min
    }

    pub fn max(&self) -> NaiveDateTime {
        self.max
    }

    pub fn min_param(&self) -> String {
        self.min.format(QUERY_FORMAT).to_string()
    }

    pub fn max_param(&self) -> String {
        self.max.format(QUERY_FORMAT).to_string()
    }

    /// True when `[start, end)` shares any instant with this window.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start < self.max && end > self.min
    }
}

/// Format a wall-clock time as a UTC labelled RFC 3339 string the way
/// the calendar API expects for event bodies.
pub fn utc_label(dt: &NaiveDateTime) -> String {
    dt.format(QUERY_FORMAT).to_string()
}
