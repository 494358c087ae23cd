//! LLM API client abstraction for OpenAI, Anthropic, and Gemini.

use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, ResponseFormat, ResponseFormatJsonSchema,
    },
};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com";
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const OPENAI_API_BASE: &str = "https://api.openai.com";

/// LLM provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    /// OpenAI (GPT models).
    OpenAI,
    /// Anthropic (Claude models).
    Anthropic,
    /// Google Gemini.
    #[default]
    Gemini,
}

impl LlmProvider {
    /// Model used when the configuration does not name one.
    #[instrument]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-haiku-20241022",
            Self::Gemini => "gemini-2.5-flash",
        }
    }

    /// Environment variable holding this provider's API key.
    #[instrument]
    pub fn api_key_var(self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }
}

/// Configuration for LLM client.
#[derive(Debug, Clone, Getters)]
pub struct LlmConfig {
    provider: LlmProvider,
    #[getter(skip)]
    api_key: String,
    model: String,
    max_tokens: u32,
    api_base: Option<String>,
}

impl LlmConfig {
    /// Creates a new LLM configuration.
    #[instrument(skip(api_key), fields(provider = ?provider, model = %model))]
    pub fn new(provider: LlmProvider, api_key: String, model: String, max_tokens: u32) -> Self {
        debug!("Creating LLM config");
        Self {
            provider,
            api_key,
            model,
            max_tokens,
            api_base: None,
        }
    }

    /// Points the client at a different API base URL (proxies, local mocks).
    #[instrument(skip(self))]
    pub fn with_api_base(mut self, api_base: impl Into<String> + std::fmt::Debug) -> Self {
        self.api_base = Some(api_base.into());
        self
    }

    /// Gets the API key.
    #[instrument(skip(self))]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    #[instrument(skip(self))]
    fn base_or(&self, default: &str) -> String {
        self.api_base
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }
}

/// Who spoke a turn of a multi-turn conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// The human side of the conversation.
    User,
    /// The model side of the conversation.
    Assistant,
}

/// One turn of a conversation sent to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    /// Speaker of the turn.
    pub role: ChatRole,
    /// Text of the turn.
    pub text: String,
}

impl ChatTurn {
    /// Creates a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    /// Creates an assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            text: text.into(),
        }
    }
}

/// A named JSON schema the provider must conform its output to.
#[derive(Debug, Clone, Getters)]
pub struct ResponseSchema {
    name: String,
    schema: serde_json::Value,
}

impl ResponseSchema {
    /// Creates a response schema from a name and a JSON schema document.
    #[instrument(skip(schema))]
    pub fn new(name: impl Into<String> + std::fmt::Debug, schema: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// LLM client that abstracts over multiple providers.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Creates a new LLM client.
    #[instrument(skip(config), fields(provider = ?config.provider()))]
    pub fn new(config: LlmConfig) -> Self {
        info!("Creating LLM client");
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Generates a free-text reply to a multi-turn conversation.
    #[instrument(skip(self, system_prompt, turns), fields(provider = ?self.config.provider, model = %self.config.model, turns = turns.len()))]
    pub async fn chat(&self, system_prompt: &str, turns: &[ChatTurn]) -> Result<String, LlmError> {
        debug!("Generating chat completion");
        self.complete(system_prompt, turns, None, self.config.max_tokens)
            .await
    }

    /// Generates a JSON document conforming to `schema`.
    ///
    /// The raw text is returned; parsing and validation belong to the caller.
    #[instrument(skip(self, system_prompt, user_message, schema), fields(provider = ?self.config.provider, schema = %schema.name))]
    pub async fn structured(
        &self,
        system_prompt: &str,
        user_message: &str,
        schema: &ResponseSchema,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        debug!("Generating structured completion");
        let turns = [ChatTurn::user(user_message)];
        self.complete(system_prompt, &turns, Some(schema), max_tokens)
            .await
    }

    #[instrument(skip_all)]
    async fn complete(
        &self,
        system_prompt: &str,
        turns: &[ChatTurn],
        schema: Option<&ResponseSchema>,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        match self.config.provider {
            LlmProvider::OpenAI => {
                self.generate_openai(system_prompt, turns, schema, max_tokens)
                    .await
            }
            LlmProvider::Anthropic => {
                self.generate_anthropic(system_prompt, turns, schema, max_tokens)
                    .await
            }
            LlmProvider::Gemini => {
                self.generate_gemini(system_prompt, turns, schema, max_tokens)
                    .await
            }
        }
    }

    /// Generates a completion using Anthropic Claude.
    ///
    /// The messages API has no schema enforcement, so the schema is appended
    /// to the system prompt.
    #[instrument(skip_all)]
    async fn generate_anthropic(
        &self,
        system_prompt: &str,
        turns: &[ChatTurn],
        schema: Option<&ResponseSchema>,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        debug!("Building Anthropic API request");
        let system = match schema {
            Some(schema) => format!(
                "{}\n\nRespond with a single JSON object and nothing else. It must match this JSON schema:\n{}",
                system_prompt, schema.schema
            ),
            None => system_prompt.to_string(),
        };

        let messages: Vec<serde_json::Value> = turns
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                };
                serde_json::json!({ "role": role, "content": turn.text })
            })
            .collect();

        let request_body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": max_tokens,
            "system": system,
            "messages": messages,
        });

        let url = format!("{}/v1/messages", self.config.base_or(ANTHROPIC_API_BASE));
        debug!(url = %url, "Sending request to Anthropic");
        let response = self
            .http
            .post(&url)
            .header("x-api-key", self.config.api_key.clone())
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Anthropic API request failed");
                LlmError::new(format!("Anthropic API request failed: {}", e))
            })?;

        let response_json = read_json_response(response, "Anthropic").await?;

        let content = response_json["content"]
            .as_array()
            .map(|blocks| {
                blocks
                    .iter()
                    .filter(|block| block["type"] == "text")
                    .filter_map(|block| block["text"].as_str())
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                error!(response = %response_json, "No text content in Anthropic response");
                LlmError::new("No text content in Anthropic response".to_string())
            })?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    /// Generates a completion using Google Gemini.
    #[instrument(skip_all)]
    async fn generate_gemini(
        &self,
        system_prompt: &str,
        turns: &[ChatTurn],
        schema: Option<&ResponseSchema>,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        debug!("Building Gemini API request");
        let contents: Vec<serde_json::Value> = turns
            .iter()
            .map(|turn| {
                let role = match turn.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "model",
                };
                serde_json::json!({ "role": role, "parts": [{ "text": turn.text }] })
            })
            .collect();

        let mut generation_config = serde_json::json!({ "maxOutputTokens": max_tokens });
        if let Some(schema) = schema {
            generation_config["responseMimeType"] = "application/json".into();
            generation_config["responseJsonSchema"] = schema.schema.clone();
        }

        let request_body = serde_json::json!({
            "systemInstruction": { "parts": [{ "text": system_prompt }] },
            "contents": contents,
            "generationConfig": generation_config,
        });

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_or(GEMINI_API_BASE),
            self.config.model
        );
        debug!(url = %url, "Sending request to Gemini");
        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", self.config.api_key.clone())
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Gemini API request failed");
                LlmError::new(format!("Gemini API request failed: {}", e))
            })?;

        let response_json = read_json_response(response, "Gemini").await?;

        // Thought parts carry reasoning, not the answer.
        let content = response_json["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter(|part| part["thought"].as_bool() != Some(true))
                    .filter_map(|part| part["text"].as_str())
                    .collect::<String>()
            })
            .filter(|text| !text.is_empty())
            .ok_or_else(|| {
                error!(response = %response_json, "No text content in Gemini response");
                LlmError::new("No text content in Gemini response".to_string())
            })?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    /// Generates a completion using OpenAI.
    #[instrument(skip_all)]
    async fn generate_openai(
        &self,
        system_prompt: &str,
        turns: &[ChatTurn],
        schema: Option<&ResponseSchema>,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        debug!("Creating OpenAI client");

        let openai_config = OpenAIConfig::new()
            .with_api_key(self.config.api_key.clone())
            .with_api_base(format!("{}/v1", self.config.base_or(OPENAI_API_BASE)));
        let client = OpenAIClient::with_config(openai_config);

        debug!("Building chat completion request");
        let mut messages = vec![ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| {
                    error!(error = ?e, "Failed to build system message");
                    LlmError::new(format!("Failed to build system message: {}", e))
                })?,
        )];

        for turn in turns {
            let message = match turn.role {
                ChatRole::User => ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(turn.text.as_str())
                        .build()
                        .map_err(|e| {
                            error!(error = ?e, "Failed to build user message");
                            LlmError::new(format!("Failed to build user message: {}", e))
                        })?,
                ),
                ChatRole::Assistant => ChatCompletionRequestMessage::Assistant(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(turn.text.as_str())
                        .build()
                        .map_err(|e| {
                            error!(error = ?e, "Failed to build assistant message");
                            LlmError::new(format!("Failed to build assistant message: {}", e))
                        })?,
                ),
            };
            messages.push(message);
        }

        let mut builder = CreateChatCompletionRequestArgs::default();
        builder
            .model(&self.config.model)
            .messages(messages)
            .max_tokens(max_tokens);
        if let Some(schema) = schema {
            builder.response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: None,
                    name: schema.name.clone(),
                    schema: Some(schema.schema.clone()),
                    strict: Some(false),
                },
            });
        }
        let request = builder.build().map_err(|e| {
            error!(error = ?e, "Failed to build request");
            LlmError::new(format!("Failed to build request: {}", e))
        })?;

        debug!("Sending request to OpenAI");
        let response = client.chat().create(request).await.map_err(|e| {
            error!(error = ?e, "OpenAI API error");
            LlmError::new(format!("OpenAI API error: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                error!("No content in OpenAI response");
                LlmError::new("No content in OpenAI response".to_string())
            })?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }
}

/// Reads a provider response body, failing on non-success status or invalid JSON.
#[instrument(skip(response))]
async fn read_json_response(
    response: reqwest::Response,
    provider: &str,
) -> Result<serde_json::Value, LlmError> {
    let status = response.status();
    let response_text = response.text().await.map_err(|e| {
        error!(error = ?e, "Failed to read response");
        LlmError::new(format!("Failed to read {} response: {}", provider, e))
    })?;

    if !status.is_success() {
        error!(status = %status, response = %response_text, "Provider API error");
        return Err(LlmError::new(format!(
            "{} API error {}: {}",
            provider, status, response_text
        )));
    }

    debug!(response_length = response_text.len(), "Parsing response");
    serde_json::from_str(&response_text).map_err(|e| {
        error!(error = ?e, response = %response_text, "Failed to parse response");
        LlmError::new(format!("Failed to parse {} response: {}", provider, e))
    })
}

/// LLM client error.
#[derive(Debug, Clone, Display, Error)]
#[display("LLM error: {} at {}:{}", message, file, line)]
pub struct LlmError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl LlmError {
    /// Creates a new LLM error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "LLM error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_models_match_provider() {
        assert!(LlmProvider::OpenAI.default_model().starts_with("gpt"));
        assert!(LlmProvider::Anthropic.default_model().starts_with("claude"));
        assert!(LlmProvider::Gemini.default_model().starts_with("gemini"));
    }

    #[test]
    fn test_api_base_trailing_slash_trimmed() {
        let config = LlmConfig::new(LlmProvider::Gemini, "k".into(), "m".into(), 10)
            .with_api_base("http://127.0.0.1:9999/");
        assert_eq!(config.base_or(GEMINI_API_BASE), "http://127.0.0.1:9999");
    }

    #[test]
    fn test_api_base_defaults() {
        let config = LlmConfig::new(LlmProvider::Anthropic, "k".into(), "m".into(), 10);
        assert_eq!(config.base_or(ANTHROPIC_API_BASE), ANTHROPIC_API_BASE);
    }

    #[test]
    fn test_provider_deserializes_lowercase() {
        let provider: LlmProvider = serde_json::from_str("\"anthropic\"").expect("parse");
        assert_eq!(provider, LlmProvider::Anthropic);
    }
}
