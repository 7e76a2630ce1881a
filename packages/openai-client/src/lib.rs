//! OpenAI-compatible REST API client
//!
//! A minimal client for chat completions against OpenAI and providers that
//! speak the same wire format (Perplexity, OpenRouter). No domain logic.
//!
//! # Example
//!
//! ```rust,ignore
//! use openai_client::{OpenAIClient, ChatRequest, Message, Provider};
//!
//! let client = OpenAIClient::for_provider(Provider::Perplexity, api_key);
//!
//! let completion = client.chat_completion_raw(
//!     ChatRequest::new("sonar-pro").message(Message::user("Is the sky blue?")),
//! ).await?;
//!
//! println!("{:?} {:?}", completion.content(), completion.citations);
//! ```

pub mod error;
pub mod provider;
pub mod types;

pub use error::{OpenAIError, Result};
pub use provider::{ModelRef, Provider};
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

/// OpenAI-compatible API client.
#[derive(Clone)]
pub struct OpenAIClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::for_provider(Provider::OpenAI, api_key)
    }

    /// Create a client pointed at a provider's default endpoint.
    pub fn for_provider(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: provider.default_base_url().to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| OpenAIError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Get the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Chat completion.
    ///
    /// Send messages to the chat completion API and get the text back.
    pub async fn chat_completion(&self, request: ChatRequest) -> Result<ChatResponse> {
        let completion = self.chat_completion_raw(request).await?;

        let content = completion
            .content()
            .map(str::to_string)
            .ok_or_else(|| OpenAIError::Parse("No content in response".into()))?;

        Ok(ChatResponse {
            content,
            usage: completion.usage,
        })
    }

    /// Chat completion returning the full provider response.
    ///
    /// Errors carry the HTTP status so callers can decide whether to retry.
    pub async fn chat_completion_raw(&self, request: ChatRequest) -> Result<ChatCompletion> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Chat completion request failed");
                OpenAIError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Chat completion API error");
            return Err(OpenAIError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| OpenAIError::Parse(e.to_string()))?;

        if completion.choices.is_empty() {
            return Err(OpenAIError::Parse("No choices in response".into()));
        }

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            citations = completion.citations.len(),
            "Chat completion"
        );

        Ok(completion)
    }
}
