//! First-class invariants for cases and sessions.
//!
//! Invariants are logical properties that must hold throughout a game. Case
//! invariants double as the validation rules for generated cases; session
//! invariants are checked in debug builds after every transition.

use crate::case::{CASE_SUSPECT_COUNT, Case};
use crate::session::{Session, View};

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
///
/// Implementations are provided for tuples of two and three invariants.
pub trait InvariantSet<S> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if !I3::holds(state) {
            violations.push(InvariantViolation::new(I3::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = Vec::new();

        if !I1::holds(state) {
            violations.push(InvariantViolation::new(I1::description()));
        }

        if !I2::holds(state) {
            violations.push(InvariantViolation::new(I2::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// A case has exactly [`CASE_SUSPECT_COUNT`] suspects.
#[derive(Debug, Clone, Copy)]
pub struct SuspectCountInvariant;

impl Invariant<Case> for SuspectCountInvariant {
    fn holds(case: &Case) -> bool {
        case.suspects().len() == CASE_SUSPECT_COUNT
    }

    fn description() -> &'static str {
        "Case has exactly three suspects"
    }
}

/// Exactly one suspect in a case is the killer.
#[derive(Debug, Clone, Copy)]
pub struct SingleKillerInvariant;

impl Invariant<Case> for SingleKillerInvariant {
    fn holds(case: &Case) -> bool {
        case.suspects().iter().filter(|s| s.is_killer()).count() == 1
    }

    fn description() -> &'static str {
        "Exactly one suspect is the killer"
    }
}

/// Suspect ids are unique within a case.
#[derive(Debug, Clone, Copy)]
pub struct UniqueSuspectIdsInvariant;

impl Invariant<Case> for UniqueSuspectIdsInvariant {
    fn holds(case: &Case) -> bool {
        let suspects = case.suspects();
        suspects
            .iter()
            .enumerate()
            .all(|(i, a)| suspects[i + 1..].iter().all(|b| a.id() != b.id()))
    }

    fn description() -> &'static str {
        "Suspect ids are unique within the case"
    }
}

/// All case invariants as a composable set.
pub type CaseInvariants = (
    SuspectCountInvariant,
    SingleKillerInvariant,
    UniqueSuspectIdsInvariant,
);

/// Energy stays within `0..=max`.
#[derive(Debug, Clone, Copy)]
pub struct EnergyBoundedInvariant;

impl Invariant<Session> for EnergyBoundedInvariant {
    fn holds(session: &Session) -> bool {
        session.energy().current() <= session.energy().max()
    }

    fn description() -> &'static str {
        "Energy never exceeds its maximum"
    }
}

/// A suspect is selected exactly while interrogating one from the active case.
#[derive(Debug, Clone, Copy)]
pub struct SelectionScopedInvariant;

impl Invariant<Session> for SelectionScopedInvariant {
    fn holds(session: &Session) -> bool {
        match (session.view(), session.selected_suspect()) {
            (View::Interrogation, Some(id)) => session
                .case()
                .as_ref()
                .is_some_and(|case| case.suspect(id).is_some()),
            (View::Interrogation, None) => false,
            (_, selected) => selected.is_none(),
        }
    }

    fn description() -> &'static str {
        "A suspect is selected only during interrogation and belongs to the active case"
    }
}

/// The transcript only exists during an interrogation.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptScopedInvariant;

impl Invariant<Session> for TranscriptScopedInvariant {
    fn holds(session: &Session) -> bool {
        *session.view() == View::Interrogation || session.transcript().is_empty()
    }

    fn description() -> &'static str {
        "The transcript is discarded outside interrogation"
    }
}

/// All session invariants as a composable set.
pub type SessionInvariants = (
    EnergyBoundedInvariant,
    SelectionScopedInvariant,
    TranscriptScopedInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::parse_case;

    const CASE: &str = r#"{"title":"T","description":"D","location":"L","victim":"V","timeOfDeath":"midnight","clues":["c"],"suspects":[
        {"name":"A","role":"r","bio":"b","motive":"m","alibi":"a","isKiller":true},
        {"name":"B","role":"r","bio":"b","motive":"m","alibi":"a","isKiller":false},
        {"name":"C","role":"r","bio":"b","motive":"m","alibi":"a","isKiller":false}]}"#;

    #[test]
    fn test_case_invariants_hold_for_parsed_case() {
        let case = parse_case(CASE).expect("valid case");
        assert!(CaseInvariants::check_all(&case).is_ok());
    }

    #[test]
    fn test_session_invariants_hold_for_fresh_session() {
        assert!(SessionInvariants::check_all(&Session::default()).is_ok());
    }

    #[test]
    fn test_two_tuple_set_reports_each_violation() {
        struct Never;
        impl Invariant<u8> for Never {
            fn holds(_: &u8) -> bool {
                false
            }
            fn description() -> &'static str {
                "never"
            }
        }
        struct Always;
        impl Invariant<u8> for Always {
            fn holds(_: &u8) -> bool {
                true
            }
            fn description() -> &'static str {
                "always"
            }
        }

        let violations = <(Never, Always)>::check_all(&0u8).expect_err("one violation");
        assert_eq!(violations, vec![InvariantViolation::new("never")]);
        let violations = <(Never, Never, Always)>::check_all(&0u8).expect_err("two violations");
        assert_eq!(violations.len(), 2);
    }
}
