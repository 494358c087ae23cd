//! Case generation: prompt, provider call, and strict parse-and-validate.

use derive_more::Display;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::{Case, CaseId, Difficulty, Suspect, SuspectId};
use crate::invariants::{Invariant, SingleKillerInvariant, SuspectCountInvariant, UniqueSuspectIdsInvariant};
use crate::language::Language;
use crate::llm_client::{LlmClient, ResponseSchema};

/// Number of suspects every case must have.
pub const CASE_SUSPECT_COUNT: usize = 3;

/// Why a case could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerationFailure {
    /// The provider call failed or returned no content.
    #[display("Case request failed: {}", _0)]
    Transport(String),

    /// The document is not parseable JSON.
    #[display("Case document is not valid JSON: {}", _0)]
    MalformedJson(String),

    /// The JSON does not match the case schema.
    #[display("Case document violates schema: {}", _0)]
    Schema(String),

    /// The case does not have the required number of suspects.
    #[display("Case has {} suspects, expected {}", _0, CASE_SUSPECT_COUNT)]
    SuspectCount(usize),

    /// The case does not have exactly one killer.
    #[display("Case has {} killers, expected exactly one", _0)]
    KillerCount(usize),
}

impl std::error::Error for GenerationFailure {}

/// Anything that can produce a fresh case.
#[async_trait::async_trait]
pub trait CaseSource: Send + Sync {
    /// Generates a new, validated case in the given language.
    async fn generate_case(&self, language: Language) -> Result<Case, GenerationFailure>;
}

/// Shape the provider is asked to return, before ids are assigned.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct CaseDraft {
    title: String,
    description: String,
    location: String,
    victim: String,
    time_of_death: String,
    clues: Vec<String>,
    #[schemars(length(min = 3, max = 3))]
    suspects: Vec<SuspectDraft>,
    #[serde(default)]
    difficulty: Difficulty,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SuspectDraft {
    name: String,
    role: String,
    bio: String,
    motive: String,
    alibi: String,
    is_killer: bool,
}

/// JSON schema the provider's case document must conform to.
#[instrument]
pub fn case_response_schema() -> ResponseSchema {
    ResponseSchema::new("murder_case", schemars::schema_for!(CaseDraft).to_value())
}

/// Case generator backed by an LLM provider.
#[derive(Debug, Clone)]
pub struct CaseGenerator {
    llm: LlmClient,
    max_tokens: u32,
}

impl CaseGenerator {
    /// Creates a generator that asks `llm` for cases of at most `max_tokens`.
    #[instrument(skip(llm))]
    pub fn new(llm: LlmClient, max_tokens: u32) -> Self {
        info!("Creating CaseGenerator");
        Self { llm, max_tokens }
    }

    /// System instruction for the case author.
    #[instrument]
    pub fn system_prompt(language: Language) -> String {
        format!(
            "You are a crime novelist. Write a unique, noir-style murder mystery in {lang}.\n\
             1. Invent a victim and a crime scene.\n\
             2. Invent exactly {count} suspects.\n\
             3. EXACTLY ONE suspect is the killer (isKiller: true); every other suspect has isKiller: false.\n\
             4. The innocent suspects have suspicious motives but alibis that hold up, or false alibis that can be checked.\n\
             5. Give the killer a subtle slip-up in their alibi or motive.\n\
             6. Rate the difficulty as Easy, Medium, or Hard.\n\
             7. Return only JSON.",
            lang = language.prompt_name(),
            count = CASE_SUSPECT_COUNT,
        )
    }

    /// User message that requests a case.
    #[instrument]
    pub fn request_prompt(language: Language) -> String {
        format!(
            "Generate a new murder mystery case in {}.",
            language.prompt_name()
        )
    }
}

#[async_trait::async_trait]
impl CaseSource for CaseGenerator {
    #[instrument(skip(self))]
    async fn generate_case(&self, language: Language) -> Result<Case, GenerationFailure> {
        info!("Requesting new case");
        let raw = self
            .llm
            .structured(
                &Self::system_prompt(language),
                &Self::request_prompt(language),
                &case_response_schema(),
                self.max_tokens,
            )
            .await
            .map_err(|e| {
                error!(error = %e, "Case request failed");
                GenerationFailure::Transport(e.message)
            })?;

        parse_case(&raw)
    }
}

/// Parses and validates a provider case document into a [`Case`].
///
/// Assigns a fresh case id, `suspect-<index>` suspect ids, and a random avatar
/// seed per suspect. Rejects documents without exactly
/// [`CASE_SUSPECT_COUNT`] suspects or without exactly one killer.
#[instrument(skip(raw), fields(raw_length = raw.len()))]
pub fn parse_case(raw: &str) -> Result<Case, GenerationFailure> {
    let json = strip_code_fence(raw);

    let draft: CaseDraft = serde_json::from_str(json).map_err(|e| {
        warn!(error = %e, "Case document rejected");
        if e.is_data() {
            GenerationFailure::Schema(e.to_string())
        } else {
            GenerationFailure::MalformedJson(e.to_string())
        }
    })?;

    for (field, value) in [
        ("title", &draft.title),
        ("victim", &draft.victim),
        ("location", &draft.location),
    ] {
        if value.trim().is_empty() {
            return Err(GenerationFailure::Schema(format!("{} is blank", field)));
        }
    }
    if let Some(index) = draft.suspects.iter().position(|s| s.name.trim().is_empty()) {
        return Err(GenerationFailure::Schema(format!(
            "suspect {} has a blank name",
            index
        )));
    }

    let case = assemble(draft);

    if !SuspectCountInvariant::holds(&case) {
        warn!(count = case.suspects().len(), "{}", SuspectCountInvariant::description());
        return Err(GenerationFailure::SuspectCount(case.suspects().len()));
    }
    if !SingleKillerInvariant::holds(&case) {
        let killers = case.suspects().iter().filter(|s| s.is_killer()).count();
        warn!(killers, "{}", SingleKillerInvariant::description());
        return Err(GenerationFailure::KillerCount(killers));
    }
    debug_assert!(UniqueSuspectIdsInvariant::holds(&case));

    info!(case_id = %case.id(), title = %case.title(), difficulty = %case.difficulty(), "Case validated");
    Ok(case)
}

/// Attaches identifiers and avatar seeds to a draft.
#[instrument(skip(draft))]
fn assemble(draft: CaseDraft) -> Case {
    let suspects = draft
        .suspects
        .into_iter()
        .enumerate()
        .map(|(index, s)| {
            Suspect::new(
                SuspectId::from(format!("suspect-{}", index)),
                s.name,
                s.role,
                s.bio,
                s.motive,
                s.alibi,
                s.is_killer,
                Uuid::new_v4().simple().to_string(),
            )
        })
        .collect();

    let id = CaseId::from(Uuid::new_v4().to_string());
    debug!(case_id = %id, "Assembled case from draft");
    Case::new(
        id,
        draft.title,
        draft.description,
        draft.location,
        draft.victim,
        draft.time_of_death,
        draft.clues,
        suspects,
        draft.difficulty,
    )
}

/// Removes a surrounding Markdown code fence, if any.
#[instrument(skip(raw))]
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json"), which may share a line with the body.
    let body = body.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
