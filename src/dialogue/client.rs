//! Suspect reply client: persona prompt plus the conversation so far.

use derive_more::Display;
use tracing::{debug, error, info, instrument, warn};

use super::{DialogueMessage, Sender};
use crate::case::{Case, Suspect};
use crate::language::Language;
use crate::llm_client::{ChatRole, ChatTurn, LlmClient};

/// Why a suspect reply could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum DialogueFailure {
    /// The provider call failed.
    #[display("Dialogue request failed: {}", _0)]
    Transport(String),

    /// The provider answered with nothing to say.
    #[display("Suspect reply was empty")]
    EmptyReply,
}

impl std::error::Error for DialogueFailure {}

/// Anything that can voice a suspect.
///
/// Callers enforce the energy precondition; implementations only talk.
#[async_trait::async_trait]
pub trait DialogueSource: Send + Sync {
    /// Produces the suspect's in-character reply to `user_text`.
    ///
    /// `history` is the transcript before `user_text` was asked.
    async fn send_message(
        &self,
        case: &Case,
        suspect: &Suspect,
        history: &[DialogueMessage],
        user_text: &str,
        language: Language,
    ) -> Result<String, DialogueFailure>;
}

/// Dialogue client backed by an LLM provider.
#[derive(Debug, Clone)]
pub struct DialogueClient {
    llm: LlmClient,
}

impl DialogueClient {
    /// Creates a dialogue client.
    #[instrument(skip(llm))]
    pub fn new(llm: LlmClient) -> Self {
        info!("Creating DialogueClient");
        Self { llm }
    }

    /// System instruction that puts the model in the suspect's shoes.
    #[instrument(skip(case, suspect), fields(suspect = %suspect.name()))]
    pub fn system_prompt(case: &Case, suspect: &Suspect, language: Language) -> String {
        format!(
            "You are roleplaying a character in a murder mystery. The conversation is in {lang}.\n\
             \n\
             The case: {title}. {victim} was found dead at {location}; time of death: {time}.\n\
             \n\
             Name: {name}\n\
             Role: {role}\n\
             Bio: {bio}\n\
             Is killer: {killer}\n\
             Motive: {motive}\n\
             Alibi: {alibi}\n\
             \n\
             The user is the detective questioning you.\n\
             - Answer in character. Be defensive, nervous, or arrogant as your bio suggests.\n\
             - If you are the killer, lie about the crime, but let subtle hints slip if pressed hard.\n\
             - If you are innocent, tell the truth, though you may be hiding something else (an affair, a theft).\n\
             - Keep every reply to 2-3 sentences.",
            lang = language.prompt_name(),
            title = case.title(),
            victim = case.victim(),
            location = case.location(),
            time = case.time_of_death(),
            name = suspect.name(),
            role = suspect.role(),
            bio = suspect.bio(),
            killer = if suspect.is_killer() { "YES" } else { "NO" },
            motive = suspect.motive(),
            alibi = suspect.alibi(),
        )
    }

    /// Builds the provider conversation from the transcript and the new question.
    ///
    /// Leading suspect lines (the greeting) are dropped so the conversation
    /// opens with the detective, and consecutive lines from the same speaker
    /// are merged into one turn.
    #[instrument(skip(history, user_text), fields(history = history.len()))]
    pub fn conversation(history: &[DialogueMessage], user_text: &str) -> Vec<ChatTurn> {
        let mut turns: Vec<ChatTurn> = Vec::with_capacity(history.len() + 1);

        let opening = history
            .iter()
            .position(|m| *m.sender() == Sender::Detective)
            .unwrap_or(history.len());

        let lines = history[opening..]
            .iter()
            .map(|m| {
                let role = match m.sender() {
                    Sender::Detective => ChatRole::User,
                    Sender::Suspect => ChatRole::Assistant,
                };
                (role, m.text().as_str())
            })
            .chain(std::iter::once((ChatRole::User, user_text)));

        for (role, text) in lines {
            match turns.last_mut() {
                Some(last) if last.role == role => {
                    last.text.push('\n');
                    last.text.push_str(text);
                }
                _ => turns.push(ChatTurn {
                    role,
                    text: text.to_string(),
                }),
            }
        }

        debug!(turns = turns.len(), "Conversation built");
        turns
    }
}

#[async_trait::async_trait]
impl DialogueSource for DialogueClient {
    #[instrument(skip(self, case, suspect, history, user_text), fields(case_id = %case.id(), suspect_id = %suspect.id()))]
    async fn send_message(
        &self,
        case: &Case,
        suspect: &Suspect,
        history: &[DialogueMessage],
        user_text: &str,
        language: Language,
    ) -> Result<String, DialogueFailure> {
        let system_prompt = Self::system_prompt(case, suspect, language);
        let turns = Self::conversation(history, user_text);

        let reply = self.llm.chat(&system_prompt, &turns).await.map_err(|e| {
            error!(error = %e, "Suspect reply failed");
            DialogueFailure::Transport(e.message)
        })?;

        let reply = reply.trim();
        if reply.is_empty() {
            warn!("Suspect reply was empty");
            return Err(DialogueFailure::EmptyReply);
        }

        info!(reply_length = reply.len(), "Suspect replied");
        Ok(reply.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::parse_case;

    const CASE: &str = r#"{"title":"The Velvet Room","description":"A singer is dead.","location":"The Velvet Room","victim":"Lola Marsh","timeOfDeath":"02:15","clues":["Lipstick on a glass"],"suspects":[
        {"name":"Nick Vane","role":"The Pianist","bio":"Moody.","motive":"Jealousy.","alibi":"Playing the last set.","isKiller":true},
        {"name":"Rosa Bell","role":"The Owner","bio":"Sharp.","motive":"Debts.","alibi":"Counting the till.","isKiller":false},
        {"name":"Eddie Cole","role":"The Bouncer","bio":"Loyal.","motive":"None known.","alibi":"At the door.","isKiller":false}]}"#;

    #[test]
    fn test_system_prompt_embeds_persona_and_case() {
        let case = parse_case(CASE).expect("valid case");
        let killer = &case.suspects()[0];
        let prompt = DialogueClient::system_prompt(&case, killer, Language::En);
        assert!(prompt.contains("Nick Vane"));
        assert!(prompt.contains("Is killer: YES"));
        assert!(prompt.contains("Lola Marsh"));
        assert!(prompt.contains("English"));

        let innocent = &case.suspects()[1];
        let prompt = DialogueClient::system_prompt(&case, innocent, Language::Ru);
        assert!(prompt.contains("Is killer: NO"));
        assert!(prompt.contains("Russian"));
    }

    #[test]
    fn test_conversation_without_history() {
        let turns = DialogueClient::conversation(&[], "Where were you?");
        assert_eq!(turns, vec![ChatTurn::user("Where were you?")]);
    }

    #[test]
    fn test_conversation_drops_greeting_and_alternates() {
        let history = vec![
            DialogueMessage::suspect("Make it quick."),
            DialogueMessage::detective("Where were you at two?"),
            DialogueMessage::suspect("At the piano."),
        ];
        let turns = DialogueClient::conversation(&history, "Who saw you?");
        assert_eq!(
            turns,
            vec![
                ChatTurn::user("Where were you at two?"),
                ChatTurn::assistant("At the piano."),
                ChatTurn::user("Who saw you?"),
            ]
        );
    }

    #[test]
    fn test_conversation_merges_unanswered_question() {
        let history = vec![DialogueMessage::detective("Hello?")];
        let turns = DialogueClient::conversation(&history, "Anyone there?");
        assert_eq!(turns, vec![ChatTurn::user("Hello?\nAnyone there?")]);
    }
}
