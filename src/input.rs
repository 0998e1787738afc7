//! Turns the raw birth fields a user typed into one absolute instant.
//!
//! The wall-clock date and time are read as local time in the selected IANA
//! zone (or the host zone when none is selected) and converted to UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::InputError;

/// Zone used when the host zone cannot be discovered.
pub const FALLBACK_TIMEZONE: &str = "UTC";

/// Raw, unvalidated birth details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthInput {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM` or `HH:MM:SS`
    pub time: Option<String>,
    /// IANA zone name, e.g. `Asia/Kolkata`
    pub timezone: Option<String>,
}

impl BirthInput {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Self::default()
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }
}

/// A validated birth instant, never later than `now`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanonicalBirth {
    pub birth: DateTime<Utc>,
    pub now: DateTime<Utc>,
    pub timezone: String,
}

/// Validate `input` against `now` and resolve it to a UTC instant.
pub fn normalize(input: &BirthInput, now: DateTime<Utc>) -> Result<CanonicalBirth, InputError> {
    let date = input.date.trim();
    if date.is_empty() {
        return Err(InputError::MissingDate);
    }
    let date = parse_date(date)?;

    let time = input
        .time
        .as_deref()
        .and_then(parse_time)
        .unwrap_or(NaiveTime::MIN);

    let timezone = match input.timezone.as_deref().map(str::trim) {
        Some(tz) if !tz.is_empty() => tz.to_string(),
        _ => local_timezone(),
    };

    let birth = wall_clock_to_utc(date.and_time(time), &timezone);
    if birth > now {
        return Err(InputError::FutureBirth { birth, now });
    }

    debug!(%birth, %timezone, "normalized birth input");
    Ok(CanonicalBirth {
        birth,
        now,
        timezone,
    })
}

/// Interpret `wall` as local time in `timezone`.
///
/// An unknown zone, or a wall-clock time skipped by a DST transition, keeps
/// the wall clock as if it were UTC. Repeated local times take the earlier
/// instant.
pub fn wall_clock_to_utc(wall: NaiveDateTime, timezone: &str) -> DateTime<Utc> {
    let tz = match timezone.parse::<Tz>() {
        Ok(tz) => tz,
        Err(err) => {
            warn!(timezone, %err, "unknown timezone, using wall clock as UTC");
            return wall.and_utc();
        }
    };

    match tz.from_local_datetime(&wall).earliest() {
        Some(local) => local.with_timezone(&Utc),
        None => {
            warn!(timezone, %wall, "local time does not exist, using wall clock as UTC");
            wall.and_utc()
        }
    }
}

/// The host's IANA zone, or [`FALLBACK_TIMEZONE`].
pub fn local_timezone() -> String {
    match iana_time_zone::get_timezone() {
        Ok(tz) => tz,
        Err(err) => {
            warn!(%err, "cannot detect local timezone, falling back to {FALLBACK_TIMEZONE}");
            FALLBACK_TIMEZONE.to_string()
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, InputError> {
    let invalid = || InputError::InvalidDate(s.to_string());

    let parts: Vec<&str> = s.split('-').collect();
    let [year, month, day] = parts.as_slice() else {
        return Err(invalid());
    };

    let year: i32 = year.trim().parse().map_err(|_| invalid())?;
    let month: u32 = month.trim().parse().map_err(|_| invalid())?;
    let day: u32 = day.trim().parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

// Only hour and minute are taken; seconds are always zero. Anything short of
// hour and minute is ignored rather than rejected.
fn parse_time(s: &str) -> Option<NaiveTime> {
    let mut parts = s.trim().split(':');
    let hour: u32 = parts.next()?.trim().parse().ok()?;
    let minute: u32 = parts.next()?.trim().parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}
