//! Testing utilities including a mock model client.
//!
//! Lets the pipeline be exercised end to end without network calls.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use openai_client::{ChatCompletion, Message, OpenAIError, Result};

use crate::traits::model::ModelClient;

type Responder = dyn Fn(&str, &[Message]) -> ChatCompletion + Send + Sync;

/// A mock model client for testing.
///
/// Every conversation is answered by a responder closure. Failures can be
/// queued for the earliest calls or pinned to a specific call index.
pub struct MockModelClient {
    responder: Arc<Responder>,

    /// Failures consumed by the next calls, one per call
    failures: Arc<RwLock<VecDeque<OpenAIError>>>,

    /// Failures pinned to a call index
    scheduled: Arc<RwLock<HashMap<usize, OpenAIError>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockModelCall>>>,

    drop_last_output: bool,
    reverse_delay: bool,
}

/// Record of a batch call made to the mock.
#[derive(Debug, Clone)]
pub struct MockModelCall {
    pub model: String,
    pub conversations: Vec<Vec<Message>>,
    pub max_output_tokens: u32,
}

impl MockModelClient {
    /// Create a mock answering each conversation with `responder`.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &[Message]) -> ChatCompletion + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            failures: Arc::default(),
            scheduled: Arc::default(),
            calls: Arc::default(),
            drop_last_output: false,
            reverse_delay: false,
        }
    }

    /// Answer each conversation with `echo: <last turn>`.
    pub fn echo() -> Self {
        Self::new(|_model, messages| {
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
            ChatCompletion::from_content(format!("echo: {last}"))
        })
    }

    /// Answer with text computed from the last turn.
    pub fn with_text<F>(respond: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::new(move |_model, messages| {
            let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
            ChatCompletion::from_content(respond(last))
        })
    }

    /// Fail the next calls with these errors, in order.
    pub fn fail_next(self, errors: Vec<OpenAIError>) -> Self {
        self.failures.write().unwrap().extend(errors);
        self
    }

    /// Fail the call with this zero-based index.
    pub fn fail_call(self, index: usize, error: OpenAIError) -> Self {
        self.scheduled.write().unwrap().insert(index, error);
        self
    }

    /// Return one output fewer than requested on every call.
    pub fn drop_last_output(mut self) -> Self {
        self.drop_last_output = true;
        self
    }

    /// Make earlier calls finish after later ones.
    pub fn with_reverse_delay(mut self) -> Self {
        self.reverse_delay = true;
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockModelCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of conversations in each call, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .map(|c| c.conversations.len())
            .collect()
    }

    /// Models requested, in call order.
    pub fn models(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .map(|c| c.model.clone())
            .collect()
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    async fn complete_batch(
        &self,
        model: &str,
        batch: &[Vec<Message>],
        max_output_tokens: u32,
    ) -> Result<Vec<ChatCompletion>> {
        let index = {
            let mut calls = self.calls.write().unwrap();
            calls.push(MockModelCall {
                model: model.to_string(),
                conversations: batch.to_vec(),
                max_output_tokens,
            });
            calls.len() - 1
        };

        if self.reverse_delay {
            let steps = 10u64.saturating_sub(index as u64);
            tokio::time::sleep(Duration::from_millis(steps * 5)).await;
        }

        if let Some(err) = self.scheduled.write().unwrap().remove(&index) {
            return Err(err);
        }
        if let Some(err) = self.failures.write().unwrap().pop_front() {
            return Err(err);
        }

        let mut outputs: Vec<ChatCompletion> = batch
            .iter()
            .map(|conversation| (self.responder)(model, conversation))
            .collect();
        if self.drop_last_output {
            outputs.pop();
        }
        Ok(outputs)
    }
}
