//! Single-event iCalendar documents for milestone reminders.
//!
//! The layout is fixed: one `VEVENT` with a UTC `DTSTART` truncated to the
//! minute, a summary and a constant description, lines joined with CRLF.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::error::IcsError;

pub const DESCRIPTION: &str = "Automated milestone calendar reminder from Age Calculator.";

const CRLF: &str = "\r\n";
const DTSTART: &str = "DTSTART:";
const DTSTART_FORMAT: &str = "%Y%m%dT%H%M00Z";
const DTSTART_PARSE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEvent {
    pub start: DateTime<Utc>,
    pub title: String,
    pub description: String,
}

impl CalendarEvent {
    pub fn new(start: DateTime<Utc>, title: impl Into<String>) -> Self {
        Self {
            start,
            title: title.into(),
            description: DESCRIPTION.to_string(),
        }
    }

    /// Render the event as a calendar document.
    pub fn to_ics(&self) -> String {
        [
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            "BEGIN:VEVENT".to_string(),
            format!("{DTSTART}{}", self.start.format(DTSTART_FORMAT)),
            format!("SUMMARY:{}", self.title),
            format!("DESCRIPTION:{}", self.description),
            "END:VEVENT".to_string(),
            "END:VCALENDAR".to_string(),
        ]
        .join(CRLF)
    }

    /// Download name: the title with anything but ASCII letters and digits
    /// replaced by `_`.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .title
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{stem}.ics")
    }
}

/// Calendar document for an event titled `title` starting at `instant`.
pub fn export(instant: DateTime<Utc>, title: &str) -> String {
    CalendarEvent::new(instant, title).to_ics()
}

/// Read the start instant back out of a document produced by [`export`].
pub fn parse_dtstart(document: &str) -> Result<DateTime<Utc>, IcsError> {
    let value = document
        .lines()
        .find_map(|line| line.trim_end_matches('\r').strip_prefix(DTSTART))
        .ok_or(IcsError::MissingStart)?;

    NaiveDateTime::parse_from_str(value, DTSTART_PARSE_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|_| IcsError::InvalidStart(value.to_string()))
}
