//! Noir Detective library - a murder mystery played against an LLM
//!
//! The player takes a procedurally generated case, interrogates three
//! AI-voiced suspects, and names the killer.
//!
//! # Architecture
//!
//! - **Session**: the whole game state, stepped by a pure transition function
//! - **Machine**: [`step`] applies one [`Event`] to a [`Session`]
//! - **Controller**: runs provider calls and feeds their results to [`step`]
//! - **Case / Dialogue**: the two provider clients, behind [`CaseSource`] and
//!   [`DialogueSource`]
//! - **LLM client**: OpenAI, Anthropic and Gemini behind one [`LlmClient`]
//! - **TUI**: one terminal screen per [`View`]
//!
//! # Example
//!
//! ```no_run
//! use noir_detective::{
//!     Action, CaseGenerator, DialogueClient, GameConfig, GameController, LlmClient, Session,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GameConfig::load(None)?;
//! let llm = LlmClient::new(config.create_llm_config()?);
//!
//! let mut controller = GameController::new(
//!     Session::new(*config.max_energy(), *config.language()),
//!     CaseGenerator::new(llm.clone(), *config.case_max_tokens()),
//!     DialogueClient::new(llm),
//! );
//! controller.dispatch(Action::NewCase).await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod case;
mod config;
mod controller;
mod dialogue;
mod invariants;
mod language;
mod llm_client;
mod machine;
mod scoring;
mod session;
mod tui;

// Crate-level exports - Case model and generator
pub use case::{
    CASE_SUSPECT_COUNT, Case, CaseGenerator, CaseId, CaseSource, Difficulty, GenerationFailure,
    Suspect, SuspectId, case_response_schema, parse_case,
};

// Crate-level exports - Dialogue
pub use dialogue::{DialogueClient, DialogueFailure, DialogueMessage, DialogueSource, Sender};

// Crate-level exports - Configuration
pub use config::{CONFIG_ENV_VAR, ConfigError, GameConfig};

// Crate-level exports - LLM client
pub use llm_client::{
    ChatRole, ChatTurn, LlmClient, LlmConfig, LlmError, LlmProvider, ResponseSchema,
};

// Crate-level exports - Session state and transitions
pub use controller::{Action, GameController};
pub use machine::{Event, Rejection, Transition, step};
pub use session::{DEFAULT_MAX_ENERGY, Energy, Session, View};

// Crate-level exports - Scoring
pub use scoring::{
    Experience, ExperienceDelta, LOSE_XP, Outcome, QUESTION_BONUS, WIN_XP, XP_PER_LEVEL, judge,
    score,
};

// Crate-level exports - Language
pub use language::{Language, Phrasebook};

// Crate-level exports - Invariants
pub use invariants::{
    CaseInvariants, EnergyBoundedInvariant, Invariant, InvariantSet, InvariantViolation,
    SelectionScopedInvariant, SessionInvariants, SingleKillerInvariant, SuspectCountInvariant,
    TranscriptScopedInvariant, UniqueSuspectIdsInvariant,
};

// Crate-level exports - Terminal UI
pub use tui::{ActiveScreen, App, Screen, ScreenAction, run_tui};
