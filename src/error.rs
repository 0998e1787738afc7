use chrono::{DateTime, Utc};
use thiserror::Error;

/// Reasons a raw birth input cannot become a canonical birth instant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("birth date required")]
    MissingDate,

    #[error("enter a valid date (expected YYYY-MM-DD, got {0:?})")]
    InvalidDate(String),

    #[error("date of birth {birth} is in the future (now is {now})")]
    FutureBirth {
        birth: DateTime<Utc>,
        now: DateTime<Utc>,
    },
}

/// Failure to read a calendar-event document back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IcsError {
    #[error("no DTSTART line in calendar document")]
    MissingStart,

    #[error("malformed DTSTART value {0:?}")]
    InvalidStart(String),
}
