use chrono::{DateTime, Utc};

use crate::error::InputError;
use crate::milestone::Milestone;
use crate::snapshot::Snapshot;

const MIN_COL_CHARS: usize = 44;

// Utilities for building the text report

pub fn build_stat_row(key: &str, value: &str, align_width: usize) -> String {
    let key_part = format!("{key}: ");
    let base_len = key_part.len() + value.len();
    let available = align_width.saturating_sub(base_len);

    let dots = match available {
        0 => "".to_string(),
        1 => " ".to_string(),
        2 => ". ".to_string(),
        n => format!("{} ", ".".repeat(n - 1)),
    };

    format!("{key_part}{dots}{value}")
}

fn build_header_line(label: &str, align_width: usize) -> String {
    let base = format!("{label} ");
    let dash_count = align_width.saturating_sub(base.len());
    format!("{base}{}", "-".repeat(dash_count))
}

fn us_date(instant: DateTime<Utc>) -> String {
    instant.format("%-m/%-d/%Y").to_string()
}

fn us_date_time(instant: DateTime<Utc>) -> String {
    instant.format("%-m/%-d/%Y %-I:%M:%S %p UTC").to_string()
}

enum Line {
    Header(&'static str),
    Row(&'static str, String),
    Blank,
}

/// Render a snapshot as aligned `key: ..... value` rows.
pub fn render(snapshot: &Snapshot) -> String {
    let age = &snapshot.age;
    let mut lines = vec![
        Line::Header("Age"),
        Line::Row(
            "Born",
            format!("{} ({})", us_date_time(snapshot.birth.birth), snapshot.birth.timezone),
        ),
        Line::Row("Age", age.to_string()),
        Line::Row("Years", age.years.to_string()),
        Line::Row("Months", age.months.to_string()),
        Line::Row("Weeks", format!("{:.5}", age.weeks)),
        Line::Row("Days", age.days.to_string()),
        Line::Row("Hours", age.total_hours.to_string()),
        Line::Row("Minutes", age.total_minutes.to_string()),
        Line::Row("Seconds", age.total_seconds.to_string()),
        Line::Row("Days lived (total)", age.total_days.to_string()),
        Line::Blank,
        Line::Header("- Next Birthday"),
    ];

    match &snapshot.next_birthday {
        Some(next) => {
            lines.push(Line::Row(
                "Date",
                format!("{} ({})", us_date(next.date), next.weekday),
            ));
            lines.push(Line::Row(
                "Countdown",
                format!(
                    "{} days, {}h, {}m, {}s",
                    next.days, next.hours, next.minutes, next.seconds
                ),
            ));
        }
        None => lines.push(Line::Row("Date", "out of calendar range".to_string())),
    }

    lines.push(Line::Blank);
    lines.push(Line::Header("- Milestones"));
    match &snapshot.milestones {
        Some(milestones) => {
            let now = snapshot.now();
            let reached = |m: &Milestone| if m.is_reached(now) { " (reached)" } else { "" };
            lines.push(Line::Row(
                milestones.day.title,
                format!("{}{}", us_date(milestones.day.instant), reached(&milestones.day)),
            ));
            lines.push(Line::Row(
                milestones.second.title,
                format!(
                    "{}{}",
                    us_date_time(milestones.second.instant),
                    reached(&milestones.second)
                ),
            ));
        }
        None => lines.push(Line::Row("Milestones", "out of calendar range".to_string())),
    }

    let align_width = lines
        .iter()
        .map(|line| match line {
            Line::Row(k, v) => k.len() + 2 + v.len(),
            _ => 0,
        })
        .max()
        .unwrap_or(0)
        .max(MIN_COL_CHARS);

    let mut out = String::new();
    for line in &lines {
        match line {
            Line::Header(label) => out.push_str(&build_header_line(label, align_width)),
            Line::Row(key, value) => out.push_str(&build_stat_row(key, value, align_width)),
            Line::Blank => {}
        }
        out.push('\n');
    }
    out
}

pub fn render_error(err: &InputError) -> String {
    format!("Error: {err}\n")
}
