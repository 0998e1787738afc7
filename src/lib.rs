//! Elapsed lifetime, next-birthday countdown and life milestones from a birth
//! date, optional birth time and timezone, kept live as time advances.

pub mod age;
pub mod birthday;
pub mod clock;
pub mod config;
pub mod error;
pub mod ics;
pub mod input;
pub mod live;
pub mod milestone;
pub mod report;
pub mod snapshot;

pub use age::AgeBreakdown;
pub use birthday::NextBirthday;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{IcsError, InputError};
pub use ics::CalendarEvent;
pub use input::{BirthInput, CanonicalBirth};
pub use live::{LiveClock, Pass, Scheduler, TokioScheduler, Trigger};
pub use milestone::{Milestone, MilestoneKind, Milestones};
pub use snapshot::Snapshot;
