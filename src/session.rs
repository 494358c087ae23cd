//! Session state: the single value the view controller steps forward.

use derive_getters::Getters;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::case::{Case, SuspectId};
use crate::dialogue::DialogueMessage;
use crate::language::Language;
use crate::scoring::{Experience, Outcome};

/// Interrogation energy a fresh session starts with.
pub const DEFAULT_MAX_ENERGY: u32 = 10;

/// Views of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize)]
pub enum View {
    /// The detective's office; start of every cycle.
    #[default]
    Office,
    /// Overview of the active case.
    CaseFile,
    /// Questioning one suspect.
    Interrogation,
    /// Choosing whom to accuse.
    Accusation,
    /// Verdict of the last accusation.
    Result,
    /// Energy restock.
    Shop,
}

/// Interrogation energy, bounded by `0..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Energy {
    current: u32,
    max: u32,
}

impl Energy {
    /// Creates a full energy pool of size `max`.
    pub fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Remaining energy.
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Energy after a restock.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// True when no question can be asked.
    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    /// Spends one unit. Returns `false`, leaving energy unchanged, when empty.
    #[instrument]
    pub fn consume(&mut self) -> bool {
        match self.current.checked_sub(1) {
            Some(left) => {
                self.current = left;
                true
            }
            None => false,
        }
    }

    /// Refills to `max`.
    pub fn restock(&mut self) {
        self.current = self.max;
    }
}

/// The whole state of one player's game.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Session {
    view: View,
    case: Option<Case>,
    selected_suspect: Option<SuspectId>,
    energy: Energy,
    experience: Experience,
    outcome: Option<Outcome>,
    /// Messages of the current interrogation, oldest first.
    transcript: Vec<DialogueMessage>,
    language: Language,
    /// User-visible notice after a failed provider call.
    notice: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENERGY, Language::default())
    }
}

impl Session {
    /// Creates a session in the office with full energy and no case.
    #[instrument]
    pub fn new(max_energy: u32, language: Language) -> Self {
        debug!("Creating session");
        Self {
            view: View::Office,
            case: None,
            selected_suspect: None,
            energy: Energy::full(max_energy),
            experience: Experience::default(),
            outcome: None,
            transcript: Vec::new(),
            language,
            notice: None,
        }
    }

    /// Detective level, derived from experience.
    pub fn level(&self) -> u32 {
        self.experience.level()
    }

    /// The suspect currently being interrogated, if any.
    #[instrument(skip(self))]
    pub fn selected(&self) -> Option<&crate::case::Suspect> {
        let id = self.selected_suspect.as_ref()?;
        self.case.as_ref()?.suspect(id)
    }

    pub(crate) fn set_view(&mut self, view: View) {
        debug!(from = %self.view, to = %view, "View change");
        self.view = view;
    }

    pub(crate) fn replace_case(&mut self, case: Case) {
        self.case = Some(case);
    }

    pub(crate) fn select_suspect(&mut self, id: Option<SuspectId>) {
        self.selected_suspect = id;
    }

    pub(crate) fn energy_mut(&mut self) -> &mut Energy {
        &mut self.energy
    }

    pub(crate) fn set_experience(&mut self, experience: Experience) {
        self.experience = experience;
    }

    pub(crate) fn set_outcome(&mut self, outcome: Option<Outcome>) {
        self.outcome = outcome;
    }

    pub(crate) fn transcript_mut(&mut self) -> &mut Vec<DialogueMessage> {
        &mut self.transcript
    }

    pub(crate) fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub(crate) fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_never_underflows() {
        let mut energy = Energy::full(2);
        assert!(energy.consume());
        assert!(energy.consume());
        assert!(!energy.consume());
        assert_eq!(energy.current(), 0);
        assert!(energy.is_empty());
    }

    #[test]
    fn test_restock_fills_to_max() {
        let mut energy = Energy::full(3);
        energy.consume();
        energy.restock();
        assert_eq!(energy.current(), 3);
        energy.restock();
        assert_eq!(energy.current(), energy.max());
    }

    #[test]
    fn test_fresh_session_defaults() {
        let session = Session::default();
        assert_eq!(*session.view(), View::Office);
        assert!(session.case().is_none());
        assert!(session.selected().is_none());
        assert_eq!(session.energy().current(), DEFAULT_MAX_ENERGY);
        assert_eq!(session.experience().points(), 0);
        assert_eq!(session.level(), 1);
        assert!(session.outcome().is_none());
    }
}
