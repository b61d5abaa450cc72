use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{ChatMessage, ChatRole, Recommendation},
};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_API_VERSION: &str = "2023-06-01";
const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

const INTERPRET_MAX_TOKENS: u32 = 300;
const GENERATE_MAX_TOKENS: u32 = 1000;

const HTTP_TIMEOUT_SECS: u64 = 60;

const INTERPRET_SYSTEM_PROMPT: &str = "\
You are a movie recommendation assistant for a Plex media server.
The user has a library of movies and wants recommendations.

If the user is asking for movie recommendations, extract what kind of movie they're looking for.
Focus on extracting genres, themes, moods, or similar movies mentioned.

If the user is referring to previous recommendations (e.g., \"play the second one\" or \"tell me more about the third movie\"),
identify this as a follow-up command, not a new recommendation request.

Return a concise description that captures the essence of what they're looking for,
or clearly indicate if this is a follow-up command about previous recommendations.";

/// Language-model collaborator contract.
///
/// `interpret_request` accepts conversation history for context even though
/// the turn orchestration currently passes none.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Maps free text to a short intent description
    async fn interpret_request(
        &self,
        user_text: &str,
        history: &[ChatMessage],
    ) -> AppResult<String>;

    /// Produces a conversational reply presenting the recommendations
    async fn generate_reply(
        &self,
        user_text: &str,
        recommendations: &[Recommendation],
    ) -> AppResult<String>;
}

/// Supported LLM backends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Anthropic,
    OpenAi,
}

impl LlmProvider {
    pub fn parse(name: &str) -> AppResult<Self> {
        match name.to_lowercase().as_str() {
            "anthropic" => Ok(LlmProvider::Anthropic),
            "openai" => Ok(LlmProvider::OpenAi),
            other => Err(AppError::InvalidInput(format!(
                "Unknown LLM provider: {}",
                other
            ))),
        }
    }
}

/// LLM client backing both intent interpretation and reply generation
pub struct LlmService {
    provider: LlmProvider,
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl LlmService {
    /// Builds the client for the configured provider.
    ///
    /// Fails when the provider name is unknown or the matching API key is
    /// missing.
    pub fn new(config: &Config) -> AppResult<Self> {
        let provider = LlmProvider::parse(&config.llm_provider)?;

        let (api_key, api_url, model) = match provider {
            LlmProvider::Anthropic => (
                config.anthropic_api_key.clone().ok_or_else(|| {
                    AppError::InvalidInput(
                        "Anthropic API key is required for provider 'anthropic'".to_string(),
                    )
                })?,
                ANTHROPIC_API_URL.to_string(),
                config.anthropic_model.clone(),
            ),
            LlmProvider::OpenAi => (
                config.openai_api_key.clone().ok_or_else(|| {
                    AppError::InvalidInput(
                        "OpenAI API key is required for provider 'openai'".to_string(),
                    )
                })?,
                OPENAI_API_URL.to_string(),
                config.openai_model.clone(),
            ),
        };

        tracing::info!(provider = ?provider, model = %model, "Initializing LLM service");

        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            provider,
            http_client,
            api_key,
            api_url,
            model,
        })
    }

    async fn anthropic_complete(
        &self,
        system: Option<&str>,
        messages: Vec<serde_json::Value>,
        max_tokens: u32,
    ) -> AppResult<String> {
        let mut body = json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "messages": messages,
        });
        if let Some(system) = system {
            body["system"] = json!(system);
        }

        let response = self
            .http_client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Anthropic API returned status {}: {}",
                status, body
            )));
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            text: String,
        }

        #[derive(Deserialize)]
        struct MessagesResponse {
            content: Vec<ContentBlock>,
        }

        let parsed: MessagesResponse = response.json().await?;
        parsed
            .content
            .first()
            .map(|block| block.text.clone())
            .ok_or_else(|| AppError::ExternalApi("Anthropic response had no content".to_string()))
    }

    async fn openai_complete(&self, messages: Vec<serde_json::Value>) -> AppResult<String> {
        let body = json!({
            "model": self.model,
            "messages": messages,
        });

        let response = self
            .http_client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "OpenAI API returned status {}: {}",
                status, body
            )));
        }

        #[derive(Deserialize)]
        struct Message {
            content: String,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: Message,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| AppError::ExternalApi("OpenAI response had no choices".to_string()))
    }
}

/// Converts transcript entries plus the current input into wire messages
fn conversation_messages(user_text: &str, history: &[ChatMessage]) -> Vec<serde_json::Value> {
    let mut messages: Vec<serde_json::Value> = history
        .iter()
        .map(|message| {
            json!({
                "role": match message.role {
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                },
                "content": message.content,
            })
        })
        .collect();
    messages.push(json!({ "role": "user", "content": user_text }));
    messages
}

/// Builds the reply-generation prompt around a numbered listing
fn generate_prompt(user_text: &str, recommendations: &[Recommendation]) -> String {
    format!(
        "The user asked: \"{}\"\n\n\
         Based on their request, here are some movie recommendations from their Plex library:\n\n\
         {}\n\n\
         Create a friendly, conversational response that presents these recommendations.\n\
         Explain briefly why each movie might match what they're looking for.\n\
         If they mentioned a specific movie, you can reference how these recommendations relate to it.",
        user_text,
        numbered_listing(recommendations)
    )
}

/// Numbered display listing: "1. Inception (2010) - Action, Sci-Fi"
pub fn numbered_listing(recommendations: &[Recommendation]) -> String {
    recommendations
        .iter()
        .enumerate()
        .map(|(i, rec)| format!("{}. {}", i + 1, rec.listing_line()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl LanguageModel for LlmService {
    async fn interpret_request(
        &self,
        user_text: &str,
        history: &[ChatMessage],
    ) -> AppResult<String> {
        tracing::info!(input = %user_text, "Interpreting user request");
        let messages = conversation_messages(user_text, history);

        let interpreted = match self.provider {
            LlmProvider::Anthropic => {
                self.anthropic_complete(
                    Some(INTERPRET_SYSTEM_PROMPT),
                    messages,
                    INTERPRET_MAX_TOKENS,
                )
                .await?
            }
            LlmProvider::OpenAi => {
                let mut with_system =
                    vec![json!({ "role": "system", "content": INTERPRET_SYSTEM_PROMPT })];
                with_system.extend(messages);
                self.openai_complete(with_system).await?
            }
        };

        tracing::info!(interpreted = %interpreted, "Interpreted query");
        Ok(interpreted)
    }

    async fn generate_reply(
        &self,
        user_text: &str,
        recommendations: &[Recommendation],
    ) -> AppResult<String> {
        tracing::info!("Generating recommendation response");
        let prompt = generate_prompt(user_text, recommendations);
        let messages = vec![json!({ "role": "user", "content": prompt })];

        match self.provider {
            LlmProvider::Anthropic => {
                self.anthropic_complete(None, messages, GENERATE_MAX_TOKENS)
                    .await
            }
            LlmProvider::OpenAi => self.openai_complete(messages).await,
        }
    }
}
