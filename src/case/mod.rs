//! Murder case data model.
//!
//! A [`Case`] and its [`Suspect`]s are built once by the
//! [`CaseGenerator`](crate::CaseGenerator) and never mutated afterwards; a new
//! case replaces the old one wholesale.

mod generator;

pub use generator::{
    CASE_SUSPECT_COUNT, CaseGenerator, CaseSource, GenerationFailure, case_response_schema,
    parse_case,
};

use derive_getters::Getters;
use derive_more::{Display, From};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/notionists/svg";

/// Unique identifier of a generated case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize)]
pub struct CaseId(String);

/// Identifier of a suspect, stable within one case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, From, Serialize)]
pub struct SuspectId(String);

impl From<&str> for SuspectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// How hard the case is to crack.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize, JsonSchema,
)]
pub enum Difficulty {
    /// An obvious slip-up.
    Easy,
    /// The default when the provider does not say.
    #[default]
    Medium,
    /// The killer covers their tracks well.
    Hard,
}

/// A person of interest in a case.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suspect {
    id: SuspectId,
    name: String,
    /// Role label, e.g. "The Butler".
    role: String,
    bio: String,
    motive: String,
    alibi: String,
    #[getter(skip)]
    is_killer: bool,
    /// Opaque seed for deterministic avatar rendering.
    avatar_seed: String,
    /// Portrait image URL derived from `avatar_seed`.
    avatar_url: String,
}

impl Suspect {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: SuspectId,
        name: String,
        role: String,
        bio: String,
        motive: String,
        alibi: String,
        is_killer: bool,
        avatar_seed: String,
    ) -> Self {
        Self {
            id,
            name,
            role,
            bio,
            motive,
            alibi,
            is_killer,
            avatar_url: avatar_url_for(&avatar_seed),
            avatar_seed,
        }
    }

    /// Whether this suspect committed the murder.
    pub fn is_killer(&self) -> bool {
        self.is_killer
    }
}

fn avatar_url_for(seed: &str) -> String {
    format!("{}?seed={}&backgroundColor=transparent", AVATAR_BASE_URL, seed)
}

/// A generated murder case.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    id: CaseId,
    title: String,
    description: String,
    location: String,
    victim: String,
    time_of_death: String,
    /// Clues in the order the case file presents them.
    clues: Vec<String>,
    suspects: Vec<Suspect>,
    difficulty: Difficulty,
}

impl Case {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: CaseId,
        title: String,
        description: String,
        location: String,
        victim: String,
        time_of_death: String,
        clues: Vec<String>,
        suspects: Vec<Suspect>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id,
            title,
            description,
            location,
            victim,
            time_of_death,
            clues,
            suspects,
            difficulty,
        }
    }

    /// Looks up a suspect by id.
    #[instrument(skip(self), fields(case_id = %self.id))]
    pub fn suspect(&self, id: &SuspectId) -> Option<&Suspect> {
        self.suspects.iter().find(|s| s.id() == id)
    }

    /// Returns the killer, if the case has exactly one.
    #[instrument(skip(self), fields(case_id = %self.id))]
    pub fn killer(&self) -> Option<&Suspect> {
        let mut killers = self.suspects.iter().filter(|s| s.is_killer());
        match (killers.next(), killers.next()) {
            (Some(killer), None) => Some(killer),
            _ => None,
        }
    }
}
