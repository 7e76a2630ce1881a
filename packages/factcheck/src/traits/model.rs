//! Model-calling collaborator used by the batched generator.

use std::sync::Arc;

use async_trait::async_trait;
use openai_client::{ChatCompletion, Message, Result};

/// Calls a model on a batch of conversations.
///
/// Implementations must return exactly one completion per conversation, in
/// the order given. Failures are reported through
/// [`OpenAIError`](openai_client::OpenAIError), whose
/// [`is_retryable`](openai_client::OpenAIError::is_retryable) classification
/// drives the generator's retry policy.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Complete every conversation in `batch` with `model`.
    ///
    /// `model` may be provider-qualified (`perplexity/sonar-pro`).
    async fn complete_batch(
        &self,
        model: &str,
        batch: &[Vec<Message>],
        max_output_tokens: u32,
    ) -> Result<Vec<ChatCompletion>>;
}

#[async_trait]
impl<T: ModelClient + ?Sized> ModelClient for Arc<T> {
    async fn complete_batch(
        &self,
        model: &str,
        batch: &[Vec<Message>],
        max_output_tokens: u32,
    ) -> Result<Vec<ChatCompletion>> {
        (**self).complete_batch(model, batch, max_output_tokens).await
    }
}
