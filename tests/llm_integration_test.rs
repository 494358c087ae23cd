//! Live provider tests. Run with `--features api` and the provider keys set.

use noir_detective::{
    CaseGenerator, CaseSource, ChatTurn, DialogueClient, DialogueSource, Language, LlmClient,
    LlmConfig, LlmProvider,
};
use tracing::instrument;

fn live_client(provider: LlmProvider) -> LlmClient {
    dotenvy::dotenv().ok();

    let var = provider.api_key_var();
    let api_key = std::env::var(var).unwrap_or_else(|_| panic!("{} not set", var));

    LlmClient::new(LlmConfig::new(
        provider,
        api_key,
        provider.default_model().to_string(),
        200,
    ))
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_anthropic_connectivity() {
    let client = live_client(LlmProvider::Anthropic);

    let response = client
        .chat(
            "You are a helpful assistant.",
            &[ChatTurn::user("Say 'Hello, world!' and nothing else.")],
        )
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_openai_connectivity() {
    let client = live_client(LlmProvider::OpenAI);

    let response = client
        .chat(
            "You are a helpful assistant.",
            &[ChatTurn::user("Say 'Hello, world!' and nothing else.")],
        )
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
#[instrument]
async fn test_gemini_generates_playable_case() {
    let client = live_client(LlmProvider::Gemini);
    let generator = CaseGenerator::new(client.clone(), 4096);

    let case = generator
        .generate_case(Language::En)
        .await
        .expect("Failed to generate case");
    assert_eq!(case.suspects().len(), 3);
    let killer = case.killer().expect("exactly one killer");
    eprintln!("Case: {} (killer: {})", case.title(), killer.name());

    let dialogue = DialogueClient::new(client);
    let reply = dialogue
        .send_message(
            &case,
            killer,
            &[],
            "Where were you at the time of the murder?",
            Language::En,
        )
        .await
        .expect("Failed to get reply");
    assert!(!reply.is_empty(), "Reply should not be empty");
    eprintln!("Reply: {}", reply);
}
