use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::age::{self, AgeBreakdown};
use crate::birthday::{NextBirthday, next_birthday};
use crate::clock::Clock;
use crate::error::InputError;
use crate::input::{BirthInput, CanonicalBirth, normalize};
use crate::milestone::{Milestones, milestones};

/// Everything one pass computes from a birth input, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub birth: CanonicalBirth,
    pub age: AgeBreakdown,
    pub next_birthday: Option<NextBirthday>,
    pub milestones: Option<Milestones>,
}

impl Snapshot {
    /// Run the whole pipeline against `now`.
    pub fn compute(input: &BirthInput, now: DateTime<Utc>) -> Result<Self, InputError> {
        let birth = normalize(input, now)?;
        Ok(Self {
            age: age::compute(birth.birth, birth.now),
            next_birthday: next_birthday(birth.birth, birth.now),
            milestones: milestones(birth.birth),
            birth,
        })
    }

    pub fn take(input: &BirthInput, clock: &impl Clock) -> Result<Self, InputError> {
        Self::compute(input, clock.now())
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.birth.now
    }
}
