use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::ics::CalendarEvent;

pub const DAY_MILESTONE_DAYS: i64 = 10_000;
pub const SECOND_MILESTONE_SECONDS: i64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneKind {
    /// 10,000 days after birth
    Day,
    /// 1,000,000,000 seconds after birth
    Second,
}

impl MilestoneKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Day => "10,000th Day",
            Self::Second => "1,000,000,000th Second",
        }
    }

    pub fn offset(self) -> Duration {
        match self {
            Self::Day => Duration::days(DAY_MILESTONE_DAYS),
            Self::Second => Duration::seconds(SECOND_MILESTONE_SECONDS),
        }
    }
}

/// A fixed offset from birth worth celebrating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub kind: MilestoneKind,
    pub title: &'static str,
    pub instant: DateTime<Utc>,
}

impl Milestone {
    /// `None` if the milestone lies beyond the representable calendar.
    pub fn of(kind: MilestoneKind, birth: DateTime<Utc>) -> Option<Self> {
        Some(Self {
            kind,
            title: kind.title(),
            instant: birth.checked_add_signed(kind.offset())?,
        })
    }

    pub fn is_reached(&self, now: DateTime<Utc>) -> bool {
        self.instant <= now
    }

    pub fn to_event(&self) -> CalendarEvent {
        CalendarEvent::new(self.instant, self.title)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Milestones {
    pub day: Milestone,
    pub second: Milestone,
}

impl Milestones {
    pub fn get(&self, kind: MilestoneKind) -> &Milestone {
        match kind {
            MilestoneKind::Day => &self.day,
            MilestoneKind::Second => &self.second,
        }
    }
}

/// Both milestones of someone born at `birth`. Independent of "now".
pub fn milestones(birth: DateTime<Utc>) -> Option<Milestones> {
    Some(Milestones {
        day: Milestone::of(MilestoneKind::Day, birth)?,
        second: Milestone::of(MilestoneKind::Second, birth)?,
    })
}
