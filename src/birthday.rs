//! Countdown to the next birthday.
//!
//! Ordinary birthdays recur every year on the birth month and day, at the
//! birth hour and minute. Someone born on February 29 is instead observed on
//! February 28 of the next leap year, at midnight UTC.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use serde::Serialize;

use crate::age::{MS_PER_DAY, MS_PER_HOUR, MS_PER_MINUTE, MS_PER_SECOND, is_leap_year};

/// The next anniversary and the time left until it.
///
/// `days`, `hours`, `minutes` and `seconds` split one duration; they are not
/// rounded independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextBirthday {
    pub date: DateTime<Utc>,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub total_seconds: i64,
    /// Full English weekday name of `date`.
    pub weekday: String,
}

/// Next birthday after `now` of someone born at `birth`.
///
/// Returns `None` only when the anniversary would fall outside the calendar
/// range chrono can represent.
pub fn next_birthday(birth: DateTime<Utc>, now: DateTime<Utc>) -> Option<NextBirthday> {
    let date = if is_leap_day(birth) {
        leap_day_observance(now)?
    } else {
        yearly_anniversary(birth, now)?
    };
    Some(NextBirthday::until(date, now))
}

impl NextBirthday {
    fn until(date: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let ms = (date - now).num_milliseconds();
        Self {
            date,
            days: ms / MS_PER_DAY,
            hours: ms % MS_PER_DAY / MS_PER_HOUR,
            minutes: ms % MS_PER_HOUR / MS_PER_MINUTE,
            seconds: ms % MS_PER_MINUTE / MS_PER_SECOND,
            total_seconds: ms / MS_PER_SECOND,
            weekday: date.format("%A").to_string(),
        }
    }
}

fn is_leap_day(birth: DateTime<Utc>) -> bool {
    birth.month() == 2 && birth.day() == 29
}

// This year's anniversary unless it is today or already passed.
fn yearly_anniversary(birth: DateTime<Utc>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mut year = now.year();
    if (now.month(), now.day()) >= (birth.month(), birth.day()) {
        year += 1;
    }
    at_utc(year, birth.month(), birth.day(), birth.hour(), birth.minute())
}

// Feb 28 of the first leap year, from `now`'s year on, that is still ahead.
fn leap_day_observance(now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let mut year = now.year();
    loop {
        if is_leap_year(year) {
            let candidate = at_utc(year, 2, 28, 0, 0)?;
            if candidate > now {
                return Some(candidate);
            }
        }
        year += 1;
    }
}

fn at_utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day)?
        .and_hms_opt(hour, minute, 0)
        .map(|dt| dt.and_utc())
}
