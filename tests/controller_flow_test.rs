//! End-to-end game flows through the controller with scripted providers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use noir_detective::{
    Action, Case, CaseSource, DialogueFailure, DialogueMessage, DialogueSource, GameController,
    GenerationFailure, Language, Outcome, Rejection, Sender, Session, Suspect, SuspectId,
    Transition, View, parse_case,
};

const CASE: &str = r#"{"title":"Blood on Bourbon Street","description":"A trumpet player lies dead behind the club.","location":"The Blue Note","victim":"Eli Brooks","timeOfDeath":"01:30","clues":["A broken reed","Cigar ash by the door"],"suspects":[
    {"name":"Mae Dunn","role":"The Singer","bio":"Ambitious.","motive":"Top billing.","alibi":"On stage.","isKiller":false},
    {"name":"Lou Greco","role":"The Manager","bio":"Greedy.","motive":"Skimmed receipts.","alibi":"In the office.","isKiller":true},
    {"name":"Benny Shaw","role":"The Drummer","bio":"Nervous.","motive":"Gambling debts.","alibi":"Smoking outside.","isKiller":false}],"difficulty":"Easy"}"#;

/// Case source that replays scripted results in order.
#[derive(Debug)]
struct ScriptedCases {
    results: Mutex<VecDeque<Result<Case, GenerationFailure>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedCases {
    fn new(results: Vec<Result<Case, GenerationFailure>>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Self {
            results: Mutex::new(results.into()),
            calls: Arc::clone(&calls),
        };
        (source, calls)
    }
}

#[async_trait::async_trait]
impl CaseSource for ScriptedCases {
    async fn generate_case(&self, _language: Language) -> Result<Case, GenerationFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Err(GenerationFailure::Transport("script exhausted".to_string())))
    }
}

/// What the dialogue source was asked.
#[derive(Debug, Clone)]
struct DialogueCall {
    suspect: String,
    history: Vec<(Sender, String)>,
    user_text: String,
}

/// Dialogue source that replays scripted replies and records each call.
#[derive(Debug)]
struct ScriptedDialogue {
    replies: Mutex<VecDeque<Result<String, DialogueFailure>>>,
    calls: Arc<Mutex<Vec<DialogueCall>>>,
}

impl ScriptedDialogue {
    fn new(replies: Vec<Result<String, DialogueFailure>>) -> (Self, Arc<Mutex<Vec<DialogueCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let source = Self {
            replies: Mutex::new(replies.into()),
            calls: Arc::clone(&calls),
        };
        (source, calls)
    }
}

#[async_trait::async_trait]
impl DialogueSource for ScriptedDialogue {
    async fn send_message(
        &self,
        _case: &Case,
        suspect: &Suspect,
        history: &[DialogueMessage],
        user_text: &str,
        _language: Language,
    ) -> Result<String, DialogueFailure> {
        self.calls.lock().expect("lock").push(DialogueCall {
            suspect: suspect.name().clone(),
            history: history
                .iter()
                .map(|m| (*m.sender(), m.text().clone()))
                .collect(),
            user_text: user_text.to_string(),
        });
        self.replies
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or(Err(DialogueFailure::EmptyReply))
    }
}

fn case() -> Case {
    parse_case(CASE).expect("valid case")
}

fn killer_id(controller: &GameController<ScriptedCases, ScriptedDialogue>) -> SuspectId {
    controller
        .session()
        .case()
        .as_ref()
        .and_then(|c| c.killer())
        .map(|s| s.id().clone())
        .expect("active case with a killer")
}

fn setup(
    max_energy: u32,
    cases: Vec<Result<Case, GenerationFailure>>,
    replies: Vec<Result<String, DialogueFailure>>,
) -> (
    GameController<ScriptedCases, ScriptedDialogue>,
    Arc<AtomicUsize>,
    Arc<Mutex<Vec<DialogueCall>>>,
) {
    let (cases, case_calls) = ScriptedCases::new(cases);
    let (dialogue, dialogue_calls) = ScriptedDialogue::new(replies);
    let controller = GameController::new(Session::new(max_energy, Language::En), cases, dialogue);
    (controller, case_calls, dialogue_calls)
}

#[tokio::test]
async fn test_accusing_the_killer_wins() {
    let (mut controller, _, _) = setup(10, vec![Ok(case())], vec![]);

    let transition = controller.dispatch(Action::NewCase).await;
    assert_eq!(
        transition,
        Transition::Moved {
            from: View::Office,
            to: View::CaseFile
        }
    );

    controller.dispatch(Action::RequestAccusation).await;
    let killer = killer_id(&controller);
    assert_eq!(killer, SuspectId::from("suspect-1"));
    let transition = controller.dispatch(Action::Accuse(killer)).await;
    assert_eq!(
        transition,
        Transition::Moved {
            from: View::Accusation,
            to: View::Result
        }
    );

    let session = controller.session();
    assert_eq!(*session.outcome(), Some(Outcome::Win));
    assert_eq!(session.experience().points(), 100);
    assert_eq!(session.level(), 3);

    controller.dispatch(Action::Acknowledge).await;
    assert_eq!(*controller.session().view(), View::Office);
    assert!(controller.session().outcome().is_none());
}

#[tokio::test]
async fn test_accusing_an_innocent_loses_and_floors_at_zero() {
    let (mut controller, _, _) = setup(10, vec![Ok(case())], vec![]);
    controller.dispatch(Action::NewCase).await;
    controller.dispatch(Action::RequestAccusation).await;
    controller.dispatch(Action::Accuse("suspect-0".into())).await;

    let session = controller.session();
    assert_eq!(*session.view(), View::Result);
    assert_eq!(*session.outcome(), Some(Outcome::Lose));
    assert_eq!(session.experience().points(), 0);
    assert_eq!(session.level(), 1);
}

#[tokio::test]
async fn test_question_without_energy_makes_no_call() {
    let (mut controller, _, dialogue_calls) = setup(
        1,
        vec![Ok(case())],
        vec![Ok("I was on stage all night.".to_string())],
    );
    controller.dispatch(Action::NewCase).await;
    controller
        .dispatch(Action::SelectSuspect("suspect-0".into()))
        .await;

    let transition = controller
        .dispatch(Action::Ask("Where were you?".to_string()))
        .await;
    assert_eq!(transition, Transition::Stayed);
    assert_eq!(controller.session().energy().current(), 0);
    assert_eq!(controller.session().transcript().len(), 3);

    let transition = controller
        .dispatch(Action::Ask("And after that?".to_string()))
        .await;
    assert_eq!(transition, Transition::Rejected(Rejection::OutOfEnergy));
    assert_eq!(dialogue_calls.lock().expect("lock").len(), 1);
    assert_eq!(controller.session().transcript().len(), 3);
    assert_eq!(controller.session().energy().current(), 0);
}

#[tokio::test]
async fn test_dialogue_receives_history_before_the_question() {
    let (mut controller, _, dialogue_calls) = setup(
        10,
        vec![Ok(case())],
        vec![
            Ok("In my office.".to_string()),
            Ok("Nobody. I work alone.".to_string()),
        ],
    );
    controller.dispatch(Action::NewCase).await;
    controller
        .dispatch(Action::SelectSuspect("suspect-1".into()))
        .await;
    controller
        .dispatch(Action::Ask("Where were you?".to_string()))
        .await;
    controller
        .dispatch(Action::Ask("Who saw you?".to_string()))
        .await;

    let calls = dialogue_calls.lock().expect("lock");
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].suspect, "Lou Greco");
    assert_eq!(calls[0].user_text, "Where were you?");
    assert_eq!(calls[0].history.len(), 1);
    assert_eq!(calls[0].history[0].0, Sender::Suspect);

    assert_eq!(calls[1].user_text, "Who saw you?");
    assert_eq!(
        calls[1].history[1..],
        [
            (Sender::Detective, "Where were you?".to_string()),
            (Sender::Suspect, "In my office.".to_string()),
        ]
    );

    let session = controller.session();
    assert_eq!(session.transcript().len(), 5);
    assert_eq!(session.experience().points(), 10);
    assert_eq!(session.energy().current(), 8);
}

#[tokio::test]
async fn test_reply_failure_sets_notice_and_keeps_question() {
    let (mut controller, _, _) = setup(
        10,
        vec![Ok(case())],
        vec![Err(DialogueFailure::Transport("timeout".to_string()))],
    );
    controller.dispatch(Action::NewCase).await;
    controller
        .dispatch(Action::SelectSuspect("suspect-2".into()))
        .await;
    controller.dispatch(Action::Ask("Why?".to_string())).await;

    let session = controller.session();
    assert_eq!(*session.view(), View::Interrogation);
    assert_eq!(
        session.notice().as_deref(),
        Some(Language::En.phrases().connection_lost)
    );
    assert_eq!(session.energy().current(), 9);
    let last = session.transcript().last().expect("question kept");
    assert_eq!(*last.sender(), Sender::Detective);
}

#[tokio::test]
async fn test_killerless_case_is_rejected_and_office_keeps_notice() {
    let no_killer = CASE.replace(r#""isKiller":true"#, r#""isKiller":false"#);
    let failure = parse_case(&no_killer).expect_err("no killer");
    assert_eq!(failure, GenerationFailure::KillerCount(0));

    let (mut controller, case_calls, _) = setup(10, vec![Err(failure)], vec![]);
    let transition = controller.dispatch(Action::NewCase).await;

    assert_eq!(transition, Transition::Stayed);
    assert_eq!(case_calls.load(Ordering::SeqCst), 1);
    let session = controller.session();
    assert_eq!(*session.view(), View::Office);
    assert!(session.case().is_none());
    assert!(session.notice().is_some());
}

#[tokio::test]
async fn test_leaving_interrogation_discards_transcript() {
    let (mut controller, _, _) = setup(
        10,
        vec![Ok(case())],
        vec![Ok("Ask my band.".to_string())],
    );
    controller.dispatch(Action::NewCase).await;
    controller
        .dispatch(Action::SelectSuspect("suspect-2".into()))
        .await;
    controller
        .dispatch(Action::Ask("Smoking, were you?".to_string()))
        .await;
    assert_eq!(controller.session().transcript().len(), 3);

    controller.dispatch(Action::Back).await;
    assert_eq!(*controller.session().view(), View::CaseFile);
    assert!(controller.session().transcript().is_empty());
    assert!(controller.session().selected_suspect().is_none());

    controller
        .dispatch(Action::SelectSuspect("suspect-2".into()))
        .await;
    let transcript = controller.session().transcript();
    assert_eq!(transcript.len(), 1);
    assert!(transcript[0].text().contains("Benny Shaw"));
}

#[tokio::test]
async fn test_new_case_outside_office_makes_no_call() {
    let (mut controller, case_calls, _) = setup(10, vec![Ok(case()), Ok(case())], vec![]);
    controller.dispatch(Action::NewCase).await;
    let transition = controller.dispatch(Action::NewCase).await;

    assert!(matches!(
        transition,
        Transition::Rejected(Rejection::WrongView {
            view: View::CaseFile,
            ..
        })
    ));
    assert_eq!(case_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_shop_restores_energy_after_a_case() {
    let (mut controller, _, _) = setup(
        2,
        vec![Ok(case())],
        vec![Ok("No.".to_string()), Ok("Still no.".to_string())],
    );
    controller.dispatch(Action::NewCase).await;
    controller
        .dispatch(Action::SelectSuspect("suspect-0".into()))
        .await;
    controller.dispatch(Action::Ask("Did you?".to_string())).await;
    controller.dispatch(Action::Ask("Really?".to_string())).await;
    assert!(controller.session().energy().is_empty());

    controller.dispatch(Action::Back).await;
    controller.dispatch(Action::RequestAccusation).await;
    let killer = killer_id(&controller);
    controller.dispatch(Action::Accuse(killer)).await;
    controller.dispatch(Action::Acknowledge).await;
    controller.dispatch(Action::OpenShop).await;
    controller.dispatch(Action::Restock).await;

    let session = controller.session();
    assert_eq!(*session.view(), View::Office);
    assert_eq!(session.energy().current(), 2);
    assert_eq!(session.experience().points(), 110);
}

#[tokio::test]
async fn test_language_toggle_stays_in_office() {
    let (mut controller, _, _) = setup(10, vec![Ok(case())], vec![]);
    controller.dispatch(Action::ToggleLanguage).await;
    assert_eq!(*controller.session().language(), Language::Ru);

    controller
        .dispatch(Action::SelectSuspect("suspect-0".into()))
        .await;
    assert_eq!(*controller.session().view(), View::Office);
}
