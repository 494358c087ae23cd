//! Experience scoring and the derived detective level.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::case::{Case, SuspectId};

/// Experience for naming the killer.
pub const WIN_XP: i32 = 100;
/// Experience for naming an innocent suspect.
pub const LOSE_XP: i32 = -20;
/// Experience for each question asked during an interrogation.
pub const QUESTION_BONUS: ExperienceDelta = ExperienceDelta(5);
/// Experience needed per detective level.
pub const XP_PER_LEVEL: u32 = 50;

/// Outcome of an accusation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Outcome {
    /// The accused suspect was the killer.
    #[display("WIN")]
    Win,
    /// The accused suspect was innocent.
    #[display("LOSE")]
    Lose,
}

/// Signed change to a detective's experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{:+} XP", _0)]
pub struct ExperienceDelta(i32);

impl ExperienceDelta {
    /// Raw signed value of the delta.
    pub fn value(self) -> i32 {
        self.0
    }
}

/// Experience change for an accusation outcome.
#[instrument]
pub fn score(outcome: Outcome) -> ExperienceDelta {
    match outcome {
        Outcome::Win => ExperienceDelta(WIN_XP),
        Outcome::Lose => ExperienceDelta(LOSE_XP),
    }
}

/// Decides the outcome of accusing `accused`, or `None` if the suspect is not
/// part of the case.
#[instrument(skip(case), fields(case_id = %case.id()))]
pub fn judge(case: &Case, accused: &SuspectId) -> Option<Outcome> {
    let suspect = case.suspect(accused)?;
    let outcome = if suspect.is_killer() {
        Outcome::Win
    } else {
        Outcome::Lose
    };
    debug!(suspect = %suspect.name(), outcome = %outcome, "Accusation judged");
    Some(outcome)
}

/// Accumulated detective experience, never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Experience(u32);

impl Experience {
    /// Creates an experience counter at `points`.
    pub fn new(points: u32) -> Self {
        Self(points)
    }

    /// Current experience points.
    pub fn points(self) -> u32 {
        self.0
    }

    /// Detective level, derived from the points on every call.
    pub fn level(self) -> u32 {
        self.0 / XP_PER_LEVEL + 1
    }

    /// Applies `delta`, flooring the result at zero.
    #[instrument]
    pub fn apply(self, delta: ExperienceDelta) -> Self {
        let points = self.0.saturating_add_signed(delta.value());
        debug!(before = self.0, after = points, "Experience adjusted");
        Self(points)
    }
}
