//! Batched generator.
//!
//! Turns an ordered list of prompts into an equally long, equally ordered
//! list of model outputs. Prompts are cut into contiguous batches; each batch
//! is one call to the [`ModelClient`], retried on transient failures. If any
//! batch fails for good, the whole request fails: callers never see a
//! shorter output list.

use std::time::Duration;

use futures::{stream, StreamExt, TryStreamExt};
use openai_client::{ChatCompletion, Message};
use tracing::{debug, error, info, warn};

use crate::error::GenerationError;
use crate::traits::model::ModelClient;
use crate::types::Prompt;

/// Longest delay between two attempts of the same batch.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Per-stage generation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOptions {
    pub model: String,
    pub max_output_tokens: u32,
    pub batch_size: usize,
    pub retry_budget: u32,
}

/// One call to the batched generator.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompts: Vec<Prompt>,
    pub model: String,
    pub max_output_tokens: u32,
    pub retry_budget: u32,
    pub batch_size: usize,
    /// Reduce each response to its text instead of passing the full completion.
    pub convert_to_text: bool,
}

impl GenerationRequest {
    /// Create a text-mode request with default limits.
    pub fn new(prompts: Vec<Prompt>, model: impl Into<String>) -> Self {
        Self {
            prompts,
            model: model.into(),
            max_output_tokens: 128,
            retry_budget: 4,
            batch_size: 20,
            convert_to_text: true,
        }
    }

    /// Create a request using a stage's settings.
    pub fn for_stage(prompts: Vec<Prompt>, stage: &StageOptions) -> Self {
        Self {
            prompts,
            model: stage.model.clone(),
            max_output_tokens: stage.max_output_tokens,
            retry_budget: stage.retry_budget,
            batch_size: stage.batch_size,
            convert_to_text: true,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_retry_budget(mut self, retry_budget: u32) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Keep full completions (content plus citation metadata).
    pub fn full_responses(mut self) -> Self {
        self.convert_to_text = false;
        self
    }

    /// Number of batch calls this request needs.
    pub fn batch_count(&self) -> usize {
        if self.batch_size == 0 {
            0
        } else {
            self.prompts.len().div_ceil(self.batch_size)
        }
    }
}

/// One model output.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    /// Primary text only (`convert_to_text`).
    Text(String),
    /// The complete provider response.
    Full(ChatCompletion),
}

impl Generation {
    /// Primary text of the output.
    pub fn text(&self) -> Option<&str> {
        match self {
            Generation::Text(text) => Some(text),
            Generation::Full(completion) => completion.content(),
        }
    }

    /// Citation metadata attached by the provider, if kept.
    pub fn citations(&self) -> &[String] {
        match self {
            Generation::Text(_) => &[],
            Generation::Full(completion) => &completion.citations,
        }
    }

    fn from_completion(completion: ChatCompletion, convert_to_text: bool) -> Self {
        if convert_to_text {
            Generation::Text(completion.content().unwrap_or_default().to_string())
        } else {
            Generation::Full(completion)
        }
    }
}

/// Order-preserving batched generation with bounded retries.
pub struct BatchedGenerator<C> {
    client: C,
    max_concurrent_batches: usize,
    retry_backoff: Duration,
}

impl<C: ModelClient> BatchedGenerator<C> {
    /// Create a generator dispatching batches sequentially.
    pub fn new(client: C) -> Self {
        Self {
            client,
            max_concurrent_batches: 1,
            retry_backoff: Duration::from_millis(500),
        }
    }

    /// Allow up to `n` batches in flight. Results are still returned in
    /// prompt order.
    pub fn with_max_concurrent_batches(mut self, n: usize) -> Self {
        self.max_concurrent_batches = n.max(1);
        self
    }

    /// Base delay for exponential backoff between attempts.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// The underlying model client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run a request. The result has exactly one output per prompt, in
    /// prompt order, or is an error.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<Vec<Generation>, GenerationError> {
        if request.batch_size == 0 {
            return Err(GenerationError::InvalidRequest(
                "batch_size must be at least 1".into(),
            ));
        }
        if request.prompts.is_empty() {
            return Ok(Vec::new());
        }

        let conversations: Vec<Vec<Message>> =
            request.prompts.iter().map(Prompt::to_messages).collect();
        let batches: Vec<&[Vec<Message>]> = conversations.chunks(request.batch_size).collect();

        info!(
            model = %request.model,
            prompts = conversations.len(),
            batches = batches.len(),
            "Generating"
        );

        let completions: Vec<ChatCompletion> = if self.max_concurrent_batches <= 1 {
            let mut out = Vec::with_capacity(conversations.len());
            for (index, batch) in batches.iter().enumerate() {
                out.extend(self.run_batch(index, batch, request).await?);
            }
            out
        } else {
            let mut tagged: Vec<(usize, Vec<ChatCompletion>)> =
                stream::iter(batches.iter().enumerate())
                    .map(|(index, batch)| async move {
                        self.run_batch(index, batch, request)
                            .await
                            .map(|out| (index, out))
                    })
                    .buffer_unordered(self.max_concurrent_batches)
                    .try_collect()
                    .await?;
            tagged.sort_by_key(|(index, _)| *index);
            tagged.into_iter().flat_map(|(_, out)| out).collect()
        };

        Ok(completions
            .into_iter()
            .map(|c| Generation::from_completion(c, request.convert_to_text))
            .collect())
    }

    async fn run_batch(
        &self,
        index: usize,
        batch: &[Vec<Message>],
        request: &GenerationRequest,
    ) -> Result<Vec<ChatCompletion>, GenerationError> {
        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            match self
                .client
                .complete_batch(&request.model, batch, request.max_output_tokens)
                .await
            {
                Ok(outputs) => {
                    if outputs.len() != batch.len() {
                        error!(
                            batch = index,
                            expected = batch.len(),
                            actual = outputs.len(),
                            "Model client returned wrong number of outputs"
                        );
                        return Err(GenerationError::BatchLength {
                            batch: index,
                            expected: batch.len(),
                            actual: outputs.len(),
                        });
                    }
                    debug!(batch = index, size = batch.len(), attempts, "Batch complete");
                    return Ok(outputs);
                }
                Err(err) => {
                    let retries_used = attempts - 1;
                    if err.is_retryable() && retries_used < request.retry_budget {
                        let delay = self.backoff(retries_used);
                        warn!(
                            batch = index,
                            attempt = attempts,
                            status = ?err.status(),
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "Batch call failed, retrying"
                        );
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        continue;
                    }

                    error!(
                        batch = index,
                        attempts,
                        retryable = err.is_retryable(),
                        error = %err,
                        "Batch call failed, abandoning request"
                    );
                    return Err(GenerationError::BatchFailed {
                        batch: index,
                        attempts,
                        source: err,
                    });
                }
            }
        }
    }

    fn backoff(&self, retries_used: u32) -> Duration {
        let factor = 2u32.saturating_pow(retries_used);
        self.retry_backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}
