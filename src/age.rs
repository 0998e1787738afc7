//! age.rs
//!
//! Elapsed lifetime between a birth instant and "now", both as a calendar
//! breakdown ("X years, Y months, Z days") and as linear totals.
//!
//! Chrono does not provide a built-in year/month/day diff (unlike Python’s
//! relativedelta), so we implement the calendar-aware borrowing rules manually.
//!
//! This logic correctly handles:
//!   • month underflow (borrowing from years)
//!   • day underflow (borrowing from previous month)
//!   • leap years
//!   • varying month lengths

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

pub(crate) const MS_PER_SECOND: i64 = 1_000;
pub(crate) const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
pub(crate) const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
pub(crate) const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
const MS_PER_WEEK: i64 = 7 * MS_PER_DAY;

/// Age of a person at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgeBreakdown {
    pub years: i32,
    /// 0..=11
    pub months: i32,
    pub days: i32,
    /// Rounded to 5 decimal places.
    pub weeks: f64,
    pub total_days: i64,
    pub total_hours: i64,
    pub total_minutes: i64,
    pub total_seconds: i64,
}

/// Age at `now` of someone born at `birth`.
pub fn compute(birth: DateTime<Utc>, now: DateTime<Utc>) -> AgeBreakdown {
    let elapsed = (now - birth).num_milliseconds();
    let (years, months, days) = calendar_diff(birth.date_naive(), now.date_naive());

    AgeBreakdown {
        years,
        months,
        days,
        weeks: round_to(elapsed as f64 / MS_PER_WEEK as f64, 5),
        total_days: elapsed.div_euclid(MS_PER_DAY),
        total_hours: elapsed.div_euclid(MS_PER_HOUR),
        total_minutes: elapsed.div_euclid(MS_PER_MINUTE),
        total_seconds: elapsed.div_euclid(MS_PER_SECOND),
    }
}

/// Years, months and days from `birthdate` to `today` with calendar borrowing.
pub fn calendar_diff(birthdate: NaiveDate, today: NaiveDate) -> (i32, i32, i32) {
    let mut years = today.year() - birthdate.year();
    let mut months = today.month() as i32 - birthdate.month() as i32;
    let mut days = today.day() as i32 - birthdate.day() as i32;

    // Fix day underflow
    if days < 0 {
        months -= 1;

        // Determine the previous month relative to `today`.
        let (prev_year, prev_month) = if today.month() == 1 {
            (today.year() - 1, 12)
        } else {
            (today.year(), today.month() - 1)
        };

        // Add days from the previous month (28–31 depending on month & leap year)
        days += days_in_month(prev_year, prev_month) as i32;

        // Born on a day the previous month does not have (e.g. Jan 31 seen
        // from March): count from that month's last day instead.
        if days < 0 {
            days = today.day() as i32;
        }
    }

    // Fix month underflow
    if months < 0 {
        years -= 1;
        months += 12;
    }

    (years, months, days)
}

impl fmt::Display for AgeBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} year{}, {} month{}, {} day{}",
            self.years,
            plural(self.years),
            self.months,
            plural(self.months),
            self.days,
            plural(self.days)
        )
    }
}

fn plural(n: i32) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Returns number of days in a given year/month (handles leap years)
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30, // should never occur but keeps function total
    }
}

/// Leap-year rule (Gregorian):
///   - divisible by 4 → leap year
///   - except divisible by 100 → not leap year
///   - except divisible by 400 → leap year
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_instant_is_zero() {
        let birth = utc(1992, 6, 14);
        let age = compute(birth, birth);
        assert_eq!(
            age,
            AgeBreakdown {
                years: 0,
                months: 0,
                days: 0,
                weeks: 0.0,
                total_days: 0,
                total_hours: 0,
                total_minutes: 0,
                total_seconds: 0,
            }
        );
    }

    #[test]
    fn leap_day_birth_on_march_first() {
        let age = compute(utc(2016, 2, 29), utc(2020, 3, 1));
        assert_eq!((age.years, age.months, age.days), (4, 0, 1));
    }

    #[test]
    fn total_days_lived() {
        let age = compute(utc(2000, 6, 20), utc(2025, 8, 24));
        assert_eq!(age.total_days, 9196);
        assert_eq!((age.years, age.months, age.days), (25, 2, 4));
    }

    #[test]
    fn totals_are_floored() {
        let birth = utc(2024, 1, 1);
        let now = birth + Duration::hours(25) + Duration::minutes(30) + Duration::milliseconds(999);
        let age = compute(birth, now);
        assert_eq!(age.total_days, 1);
        assert_eq!(age.total_hours, 25);
        assert_eq!(age.total_minutes, 25 * 60 + 30);
        assert_eq!(age.total_seconds, (25 * 60 + 30) * 60);
    }

    #[test]
    fn weeks_keep_five_decimals() {
        assert_eq!(compute(utc(2024, 1, 1), utc(2024, 1, 8)).weeks, 1.0);
        assert_eq!(compute(utc(2024, 1, 1), utc(2024, 1, 11)).weeks, 1.42857);
    }

    #[test]
    fn day_borrow_uses_previous_month_length() {
        // March borrows February: 28 days in 2023, 29 in 2024.
        assert_eq!(calendar_diff(date(2022, 1, 30), date(2023, 3, 2)), (1, 1, 0));
        assert_eq!(calendar_diff(date(2023, 1, 30), date(2024, 3, 2)), (1, 1, 1));
        // January borrows December of the previous year.
        assert_eq!(calendar_diff(date(2020, 6, 15), date(2021, 1, 10)), (0, 6, 26));
    }

    #[test]
    fn birth_day_past_borrowed_month_end() {
        assert_eq!(calendar_diff(date(2023, 1, 31), date(2023, 3, 1)), (0, 1, 1));
        assert_eq!(calendar_diff(date(2023, 1, 31), date(2023, 3, 30)), (0, 1, 27));
    }

    #[test]
    fn breakdown_stays_within_bounds() {
        let births = [date(1999, 1, 31), date(2000, 2, 29), date(2001, 5, 31), date(2003, 12, 1)];
        let mut today = date(2004, 1, 1);
        while today <= date(2006, 12, 31) {
            let (prev_year, prev_month) = if today.month() == 1 {
                (today.year() - 1, 12)
            } else {
                (today.year(), today.month() - 1)
            };
            let limit = days_in_month(prev_year, prev_month)
                .max(days_in_month(today.year(), today.month())) as i32;

            for birth in births {
                let (years, months, days) = calendar_diff(birth, today);
                assert!(years >= 0, "{birth} -> {today}");
                assert!((0..=11).contains(&months), "{birth} -> {today}");
                assert!((0..limit).contains(&days), "{birth} -> {today}: {days}");
            }
            today = today.succ_opt().unwrap();
        }
    }

    #[test]
    fn display_pluralizes() {
        let age = compute(utc(2023, 5, 13), utc(2024, 6, 14));
        assert_eq!(age.to_string(), "1 year, 1 month, 1 day");
        let age = compute(utc(1992, 6, 14), utc(2025, 1, 1));
        assert_eq!(age.to_string(), "32 years, 6 months, 18 days");
    }

    #[test]
    fn leap_years() {
        assert!(is_leap_year(2000));
        assert!(is_leap_year(2024));
        assert!(!is_leap_year(1900));
        assert!(!is_leap_year(2023));
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2100, 2), 28);
    }
}
