//! Async view controller: runs provider calls and feeds results to [`step`].

use tracing::{debug, error, info, instrument, warn};

use crate::case::{CaseSource, SuspectId};
use crate::dialogue::DialogueSource;
use crate::machine::{Event, Rejection, Transition, step};
use crate::session::{Session, View};

/// A player action, as issued by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Office: generate a new case.
    NewCase,
    /// Office: open the shop.
    OpenShop,
    /// Office: switch language.
    ToggleLanguage,
    /// Case file: interrogate a suspect.
    SelectSuspect(SuspectId),
    /// Case file: go to the accusation.
    RequestAccusation,
    /// Leave the interrogation or the shop.
    Back,
    /// Accusation: name the killer.
    Accuse(SuspectId),
    /// Accusation: return to the case file.
    Defer,
    /// Shop: refill energy.
    Restock,
    /// Result: back to the office.
    Acknowledge,
    /// Interrogation: ask the selected suspect a question.
    Ask(String),
}

impl Action {
    /// True for actions that wait on a provider call.
    pub fn needs_network(&self) -> bool {
        matches!(self, Self::NewCase | Self::Ask(_))
    }
}

/// Owns the session and the provider clients.
///
/// Each [`dispatch`](Self::dispatch) awaits its provider call before
/// returning, so at most one call is in flight.
#[derive(Debug)]
pub struct GameController<C, D> {
    session: Session,
    cases: C,
    dialogue: D,
}

impl<C, D> GameController<C, D>
where
    C: CaseSource,
    D: DialogueSource,
{
    /// Creates a controller over `session`.
    #[instrument(skip_all)]
    pub fn new(session: Session, cases: C, dialogue: D) -> Self {
        info!("Creating GameController");
        Self {
            session,
            cases,
            dialogue,
        }
    }

    /// Current session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Consumes the controller, returning the session.
    pub fn into_session(self) -> Session {
        self.session
    }

    /// Handles one player action.
    #[instrument(skip(self), fields(view = %self.session.view()))]
    pub async fn dispatch(&mut self, action: Action) -> Transition {
        match action {
            Action::NewCase => self.new_case().await,
            Action::Ask(text) => self.ask(text).await,
            Action::OpenShop => self.apply(Event::OpenShop),
            Action::ToggleLanguage => self.apply(Event::ToggleLanguage),
            Action::SelectSuspect(id) => self.apply(Event::SelectSuspect(id)),
            Action::RequestAccusation => self.apply(Event::RequestAccusation),
            Action::Back => self.apply(Event::Back),
            Action::Accuse(id) => self.apply(Event::Accuse(id)),
            Action::Defer => self.apply(Event::Defer),
            Action::Restock => self.apply(Event::Restock),
            Action::Acknowledge => self.apply(Event::Acknowledge),
        }
    }

    fn apply(&mut self, event: Event) -> Transition {
        let session = std::mem::take(&mut self.session);
        let (session, transition) = step(session, event);
        self.session = session;
        transition
    }

    /// Requests a case, only from the office.
    #[instrument(skip(self))]
    async fn new_case(&mut self) -> Transition {
        let view = *self.session.view();
        if view != View::Office {
            warn!(view = %view, "New case requested outside the office");
            return Transition::Rejected(Rejection::WrongView {
                view,
                event: "new_case",
            });
        }

        let language = *self.session.language();
        info!(language = %language.display_name(), "Requesting new case");
        let event = match self.cases.generate_case(language).await {
            Ok(case) => Event::CaseGenerated(case),
            Err(e) => {
                error!(error = %e, "Case generation failed");
                Event::CaseGenerationFailed(e.to_string())
            }
        };
        self.apply(event)
    }

    /// Records the question, then asks the suspect.
    ///
    /// No provider call is made when the question is rejected.
    #[instrument(skip(self, text))]
    async fn ask(&mut self, text: String) -> Transition {
        let transition = self.apply(Event::QuestionAsked(text));
        if !transition.is_accepted() {
            debug!(transition = ?transition, "Question not asked");
            return transition;
        }

        let session = &self.session;
        let (Some(case), Some(suspect), Some((question, history))) = (
            session.case().as_ref(),
            session.selected(),
            session.transcript().split_last(),
        ) else {
            return transition;
        };

        let reply = self
            .dialogue
            .send_message(case, suspect, history, question.text(), *session.language())
            .await;

        let event = match reply {
            Ok(text) => Event::ReplyReceived(text),
            Err(e) => {
                error!(error = %e, "Suspect did not answer");
                Event::ReplyFailed(e.to_string())
            }
        };
        self.apply(event)
    }
}
