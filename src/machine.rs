//! Pure view transitions over a [`Session`].
//!
//! [`step`] is the only place game rules live. It performs no I/O: provider
//! results arrive as events and are applied like any user action.

use derive_more::Display;
use tracing::{debug, info, instrument, warn};

use crate::case::{Case, SuspectId};
use crate::dialogue::DialogueMessage;
use crate::invariants::{InvariantSet, SessionInvariants};
use crate::scoring::{QUESTION_BONUS, judge, score};
use crate::session::{Session, View};

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The generator produced a validated case.
    CaseGenerated(Case),
    /// The generator failed; carries the failure description.
    CaseGenerationFailed(String),
    /// Office: open the shop.
    OpenShop,
    /// Office: switch between English and Russian.
    ToggleLanguage,
    /// Case file: start questioning a suspect.
    SelectSuspect(SuspectId),
    /// Case file: move on to naming the killer.
    RequestAccusation,
    /// Leave the interrogation or the shop.
    Back,
    /// Accusation: name the killer.
    Accuse(SuspectId),
    /// Accusation: go back to the case file instead.
    Defer,
    /// Shop: refill energy.
    Restock,
    /// Result: return to the office.
    Acknowledge,
    /// Interrogation: the detective asks a question.
    QuestionAsked(String),
    /// The suspect answered.
    ReplyReceived(String),
    /// The dialogue call failed; carries the failure description.
    ReplyFailed(String),
}

impl Event {
    /// Short name for logs and rejections.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CaseGenerated(_) => "case_generated",
            Self::CaseGenerationFailed(_) => "case_generation_failed",
            Self::OpenShop => "open_shop",
            Self::ToggleLanguage => "toggle_language",
            Self::SelectSuspect(_) => "select_suspect",
            Self::RequestAccusation => "request_accusation",
            Self::Back => "back",
            Self::Accuse(_) => "accuse",
            Self::Defer => "defer",
            Self::Restock => "restock",
            Self::Acknowledge => "acknowledge",
            Self::QuestionAsked(_) => "question_asked",
            Self::ReplyReceived(_) => "reply_received",
            Self::ReplyFailed(_) => "reply_failed",
        }
    }

    /// Failure events leave their notice in place.
    fn is_failure(&self) -> bool {
        matches!(self, Self::CaseGenerationFailed(_) | Self::ReplyFailed(_))
    }
}

/// Why an event was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Rejection {
    /// The event has no meaning in the current view.
    #[display("{} is not allowed in {}", event, view)]
    WrongView {
        /// View the session was in.
        view: View,
        /// Name of the rejected event.
        event: &'static str,
    },
    /// The view needs an active case and there is none.
    #[display("No active case")]
    NoActiveCase,
    /// The suspect id is not part of the active case.
    #[display("Unknown suspect: {}", _0)]
    UnknownSuspect(SuspectId),
    /// The question was empty or whitespace.
    #[display("Question is blank")]
    BlankQuestion,
    /// No energy is left for another question.
    #[display("Out of energy")]
    OutOfEnergy,
}

/// What [`step`] did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The view changed.
    Moved {
        /// View before the event.
        from: View,
        /// View after the event.
        to: View,
    },
    /// The event was applied without changing the view.
    Stayed,
    /// The event was rejected; the session is unchanged.
    Rejected(Rejection),
}

impl Transition {
    /// True unless the event was rejected.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Applies `event` to `session`.
///
/// A rejected event returns the session untouched. Every accepted event
/// except a provider failure clears the pending notice.
#[instrument(skip(session, event), fields(view = %session.view(), event = event.name()))]
pub fn step(mut session: Session, event: Event) -> (Session, Transition) {
    let keeps_notice = event.is_failure();
    match apply(&mut session, event) {
        Ok(transition) => {
            if !keeps_notice {
                session.set_notice(None);
            }
            debug_assert!(
                SessionInvariants::check_all(&session).is_ok(),
                "session invariants violated after {:?}",
                transition
            );
            debug!(transition = ?transition, energy = session.energy().current(), "Event applied");
            (session, transition)
        }
        Err(rejection) => {
            warn!(reason = %rejection, "Event rejected");
            (session, Transition::Rejected(rejection))
        }
    }
}

/// Checks every guard before mutating, so an `Err` leaves `session` as it was.
fn apply(session: &mut Session, event: Event) -> Result<Transition, Rejection> {
    let from = *session.view();
    let wrong_view = |event: &Event| Rejection::WrongView {
        view: from,
        event: event.name(),
    };

    match (from, event) {
        (View::Office, Event::CaseGenerated(case)) => {
            info!(case_id = %case.id(), title = %case.title(), "New case opened");
            session.replace_case(case);
            session.set_outcome(None);
            Ok(move_to(session, View::CaseFile))
        }
        (View::Office, Event::CaseGenerationFailed(reason)) => {
            warn!(reason = %reason, "Case generation failed");
            let notice = session.language().phrases().connection_lost;
            session.set_notice(Some(notice.to_string()));
            Ok(Transition::Stayed)
        }
        (View::Office, Event::OpenShop) => Ok(move_to(session, View::Shop)),
        (View::Office, Event::ToggleLanguage) => {
            let language = session.language().toggle();
            info!(language = %language.display_name(), "Language switched");
            session.set_language(language);
            Ok(Transition::Stayed)
        }

        (View::CaseFile, Event::SelectSuspect(id)) => {
            let case = session.case().as_ref().ok_or(Rejection::NoActiveCase)?;
            let suspect = case
                .suspect(&id)
                .ok_or_else(|| Rejection::UnknownSuspect(id.clone()))?;
            let greeting = session.language().phrases().greeting(suspect.name());
            session.select_suspect(Some(id));
            session.transcript_mut().push(DialogueMessage::suspect(greeting));
            Ok(move_to(session, View::Interrogation))
        }
        (View::CaseFile, Event::RequestAccusation) => {
            if session.case().is_none() {
                return Err(Rejection::NoActiveCase);
            }
            Ok(move_to(session, View::Accusation))
        }

        (View::Interrogation, Event::Back) => {
            session.select_suspect(None);
            session.transcript_mut().clear();
            Ok(move_to(session, View::CaseFile))
        }
        (View::Interrogation, Event::QuestionAsked(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(Rejection::BlankQuestion);
            }
            if !session.energy_mut().consume() {
                return Err(Rejection::OutOfEnergy);
            }
            let experience = session.experience().apply(QUESTION_BONUS);
            session.set_experience(experience);
            session.transcript_mut().push(DialogueMessage::detective(text));
            Ok(Transition::Stayed)
        }
        (View::Interrogation, Event::ReplyReceived(text)) => {
            session.transcript_mut().push(DialogueMessage::suspect(text));
            Ok(Transition::Stayed)
        }
        (View::Interrogation, Event::ReplyFailed(reason)) => {
            warn!(reason = %reason, "Suspect reply failed");
            let notice = session.language().phrases().connection_lost;
            session.set_notice(Some(notice.to_string()));
            Ok(Transition::Stayed)
        }

        (View::Accusation, Event::Accuse(id)) => {
            let case = session.case().as_ref().ok_or(Rejection::NoActiveCase)?;
            let outcome = judge(case, &id).ok_or(Rejection::UnknownSuspect(id))?;
            let delta = score(outcome);
            let experience = session.experience().apply(delta);
            info!(outcome = %outcome, delta = %delta, experience = experience.points(), "Accusation resolved");
            session.set_experience(experience);
            session.set_outcome(Some(outcome));
            Ok(move_to(session, View::Result))
        }
        (View::Accusation, Event::Defer) => Ok(move_to(session, View::CaseFile)),

        (View::Shop, Event::Restock) => {
            session.energy_mut().restock();
            Ok(move_to(session, View::Office))
        }
        (View::Shop, Event::Back) => Ok(move_to(session, View::Office)),

        (View::Result, Event::Acknowledge) => {
            session.set_outcome(None);
            Ok(move_to(session, View::Office))
        }

        (_, event) => Err(wrong_view(&event)),
    }
}

fn move_to(session: &mut Session, to: View) -> Transition {
    let from = *session.view();
    session.set_view(to);
    Transition::Moved { from, to }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::parse_case;
    use crate::dialogue::Sender;
    use crate::language::Language;
    use crate::scoring::Outcome;

    const CASE: &str = r#"{"title":"Death at the Pier","description":"Fog and a body.","location":"Pier 9","victim":"Harold Finch","timeOfDeath":"23:40","clues":["A wet glove"],"suspects":[
        {"name":"Vera Lang","role":"The Widow","bio":"Cold.","motive":"Insurance.","alibi":"At the opera.","isKiller":false},
        {"name":"Sal Moretti","role":"The Dock Boss","bio":"Ruthless.","motive":"Debts.","alibi":"Playing cards.","isKiller":true},
        {"name":"Tom Price","role":"The Clerk","bio":"Timid.","motive":"None known.","alibi":"Asleep.","isKiller":false}]}"#;

    fn case() -> Case {
        parse_case(CASE).expect("valid case")
    }

    fn run(session: Session, events: Vec<Event>) -> Session {
        events.into_iter().fold(session, |s, e| {
            let (next, transition) = step(s, e);
            assert!(transition.is_accepted(), "unexpected {:?}", transition);
            next
        })
    }

    fn in_case_file() -> Session {
        run(Session::default(), vec![Event::CaseGenerated(case())])
    }

    fn interrogating(max_energy: u32) -> Session {
        let session = Session::new(max_energy, Language::En);
        run(
            session,
            vec![
                Event::CaseGenerated(case()),
                Event::SelectSuspect("suspect-0".into()),
            ],
        )
    }

    #[test]
    fn test_case_generated_moves_to_case_file() {
        let (session, transition) = step(Session::default(), Event::CaseGenerated(case()));
        assert_eq!(
            transition,
            Transition::Moved {
                from: View::Office,
                to: View::CaseFile
            }
        );
        assert!(session.case().is_some());
    }

    #[test]
    fn test_generation_failure_stays_with_notice() {
        let (session, transition) = step(
            Session::default(),
            Event::CaseGenerationFailed("timeout".to_string()),
        );
        assert_eq!(transition, Transition::Stayed);
        assert_eq!(*session.view(), View::Office);
        assert!(session.case().is_none());
        assert_eq!(
            session.notice().as_deref(),
            Some(Language::En.phrases().connection_lost)
        );

        let (session, _) = step(session, Event::CaseGenerated(case()));
        assert!(session.notice().is_none());
    }

    #[test]
    fn test_case_generated_outside_office_is_rejected() {
        let session = in_case_file();
        let before = session.case().clone();
        let (session, transition) = step(session, Event::CaseGenerated(case()));
        assert!(matches!(
            transition,
            Transition::Rejected(Rejection::WrongView {
                view: View::CaseFile,
                ..
            })
        ));
        assert_eq!(*session.case(), before);
    }

    #[test]
    fn test_toggle_language_only_in_office() {
        let (session, _) = step(Session::default(), Event::ToggleLanguage);
        assert_eq!(*session.language(), Language::Ru);

        let (session, transition) = step(in_case_file(), Event::ToggleLanguage);
        assert!(!transition.is_accepted());
        assert_eq!(*session.language(), Language::En);
    }

    #[test]
    fn test_select_suspect_seeds_greeting() {
        let session = interrogating(10);
        assert_eq!(*session.view(), View::Interrogation);
        assert_eq!(session.selected().map(|s| s.name().as_str()), Some("Vera Lang"));
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(*session.transcript()[0].sender(), Sender::Suspect);
        assert!(session.transcript()[0].text().contains("Vera Lang"));
    }

    #[test]
    fn test_select_unknown_suspect_is_rejected() {
        let (session, transition) = step(in_case_file(), Event::SelectSuspect("suspect-7".into()));
        assert_eq!(
            transition,
            Transition::Rejected(Rejection::UnknownSuspect("suspect-7".into()))
        );
        assert_eq!(*session.view(), View::CaseFile);
        assert!(session.selected_suspect().is_none());
    }

    #[test]
    fn test_back_discards_transcript() {
        let session = run(
            interrogating(10),
            vec![
                Event::QuestionAsked("Where were you?".to_string()),
                Event::ReplyReceived("Home.".to_string()),
                Event::Back,
            ],
        );
        assert_eq!(*session.view(), View::CaseFile);
        assert!(session.selected_suspect().is_none());
        assert!(session.transcript().is_empty());
    }

    #[test]
    fn test_question_consumes_energy_and_grants_bonus() {
        let (session, transition) =
            step(interrogating(10), Event::QuestionAsked("  Where were you?  ".to_string()));
        assert_eq!(transition, Transition::Stayed);
        assert_eq!(session.energy().current(), 9);
        assert_eq!(session.experience().points(), 5);
        let last = session.transcript().last().expect("message appended");
        assert_eq!(*last.sender(), Sender::Detective);
        assert_eq!(last.text(), "Where were you?");
    }

    #[test]
    fn test_question_without_energy_is_rejected() {
        let session = run(
            interrogating(1),
            vec![Event::QuestionAsked("First?".to_string())],
        );
        let transcript = session.transcript().len();
        let (session, transition) = step(session, Event::QuestionAsked("Second?".to_string()));
        assert_eq!(transition, Transition::Rejected(Rejection::OutOfEnergy));
        assert_eq!(session.energy().current(), 0);
        assert_eq!(session.transcript().len(), transcript);
        assert_eq!(session.experience().points(), 5);
    }

    #[test]
    fn test_blank_question_is_rejected() {
        let (session, transition) = step(interrogating(10), Event::QuestionAsked("   ".to_string()));
        assert_eq!(transition, Transition::Rejected(Rejection::BlankQuestion));
        assert_eq!(session.energy().current(), 10);
    }

    #[test]
    fn test_reply_failure_keeps_question_and_sets_notice() {
        let session = run(
            interrogating(10),
            vec![
                Event::QuestionAsked("Why?".to_string()),
                Event::ReplyFailed("boom".to_string()),
            ],
        );
        assert_eq!(session.transcript().len(), 2);
        assert_eq!(session.energy().current(), 9);
        assert!(session.notice().is_some());
    }

    #[test]
    fn test_reply_outside_interrogation_is_rejected() {
        let (_, transition) = step(in_case_file(), Event::ReplyReceived("late".to_string()));
        assert!(!transition.is_accepted());
    }

    #[test]
    fn test_accuse_killer_wins() {
        let session = run(
            in_case_file(),
            vec![Event::RequestAccusation, Event::Accuse("suspect-1".into())],
        );
        assert_eq!(*session.view(), View::Result);
        assert_eq!(*session.outcome(), Some(Outcome::Win));
        assert_eq!(session.experience().points(), 100);
        assert_eq!(session.level(), 3);
    }

    #[test]
    fn test_accuse_innocent_loses_and_floors() {
        let session = run(
            in_case_file(),
            vec![Event::RequestAccusation, Event::Accuse("suspect-2".into())],
        );
        assert_eq!(*session.outcome(), Some(Outcome::Lose));
        assert_eq!(session.experience().points(), 0);
    }

    #[test]
    fn test_accuse_unknown_suspect_is_rejected() {
        let session = run(in_case_file(), vec![Event::RequestAccusation]);
        let (session, transition) = step(session, Event::Accuse("nobody".into()));
        assert!(!transition.is_accepted());
        assert_eq!(*session.view(), View::Accusation);
        assert!(session.outcome().is_none());
    }

    #[test]
    fn test_defer_returns_to_case_file() {
        let session = run(in_case_file(), vec![Event::RequestAccusation, Event::Defer]);
        assert_eq!(*session.view(), View::CaseFile);
    }

    #[test]
    fn test_acknowledge_clears_outcome() {
        let session = run(
            in_case_file(),
            vec![
                Event::RequestAccusation,
                Event::Accuse("suspect-1".into()),
                Event::Acknowledge,
            ],
        );
        assert_eq!(*session.view(), View::Office);
        assert!(session.outcome().is_none());
        assert!(session.case().is_some());
    }

    #[test]
    fn test_shop_restock_and_back() {
        let session = run(
            interrogating(3),
            vec![
                Event::QuestionAsked("One".to_string()),
                Event::QuestionAsked("Two".to_string()),
                Event::Back,
                Event::RequestAccusation,
                Event::Accuse("suspect-1".into()),
                Event::Acknowledge,
                Event::OpenShop,
                Event::Restock,
            ],
        );
        assert_eq!(*session.view(), View::Office);
        assert_eq!(session.energy().current(), 3);

        let session = run(session, vec![Event::OpenShop, Event::Back]);
        assert_eq!(*session.view(), View::Office);
    }

    #[test]
    fn test_unlisted_pairs_are_rejected() {
        let cases = [
            (Session::default(), Event::Back),
            (Session::default(), Event::Acknowledge),
            (Session::default(), Event::RequestAccusation),
            (in_case_file(), Event::Restock),
            (in_case_file(), Event::OpenShop),
            (in_case_file(), Event::Accuse("suspect-1".into())),
        ];
        for (session, event) in cases {
            let view = *session.view();
            let (after, transition) = step(session, event);
            assert!(matches!(transition, Transition::Rejected(Rejection::WrongView { .. })));
            assert_eq!(*after.view(), view);
        }
    }

    /// Small xorshift generator so event sequences are reproducible.
    struct EventStream {
        state: u64,
        case: Case,
    }

    impl EventStream {
        fn new(seed: u64) -> Self {
            Self {
                state: seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1,
                case: case(),
            }
        }

        fn below(&mut self, n: u64) -> u64 {
            self.state ^= self.state << 13;
            self.state ^= self.state >> 7;
            self.state ^= self.state << 17;
            self.state % n
        }

        fn suspect(&mut self) -> SuspectId {
            // Index 3 names nobody in the case.
            format!("suspect-{}", self.below(4)).into()
        }

        fn next_event(&mut self) -> Event {
            match self.below(14) {
                0 => Event::CaseGenerated(self.case.clone()),
                1 => Event::CaseGenerationFailed("timeout".to_string()),
                2 => Event::OpenShop,
                3 => Event::ToggleLanguage,
                4 => Event::SelectSuspect(self.suspect()),
                5 => Event::RequestAccusation,
                6 => Event::Back,
                7 => Event::Accuse(self.suspect()),
                8 => Event::Defer,
                9 => Event::Restock,
                10 => Event::Acknowledge,
                11 => {
                    let text = if self.below(4) == 0 { "   " } else { "Where were you?" };
                    Event::QuestionAsked(text.to_string())
                }
                12 => Event::ReplyReceived("Home.".to_string()),
                _ => Event::ReplyFailed("reset".to_string()),
            }
        }
    }

    #[test]
    fn test_generated_sequences_hold_invariants() {
        use crate::scoring::XP_PER_LEVEL;

        let mut rejected = 0;
        for seed in 1..=64u64 {
            let mut events = EventStream::new(seed);
            let max_energy = 1 + (seed % 4) as u32;
            let mut session = Session::new(max_energy, Language::En);
            for _ in 0..400 {
                let before = session.clone();
                let event = events.next_event();
                let name = event.name();
                let (after, transition) = step(session, event);

                assert!(after.energy().current() <= after.energy().max());
                assert_eq!(after.energy().max(), max_energy);
                assert_eq!(
                    after.level(),
                    after.experience().points() / XP_PER_LEVEL + 1
                );
                assert!(SessionInvariants::check_all(&after).is_ok());
                if !transition.is_accepted() {
                    rejected += 1;
                    assert_eq!(after, before, "seed {seed}: rejected {name} changed the session");
                }
                session = after;
            }
        }
        assert!(rejected > 0);
    }
}
