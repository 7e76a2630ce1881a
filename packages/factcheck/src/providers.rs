//! Provider-routed model client.
//!
//! Splits provider-qualified model ids and sends each conversation to the
//! matching OpenAI-compatible endpoint. Conversations within one batch are
//! sent concurrently and joined back in order.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::try_join_all;
use openai_client::{
    ChatCompletion, ChatRequest, Message, ModelRef, OpenAIClient, OpenAIError, Provider, Result,
};
use tracing::debug;

use crate::credentials::ProviderCredentials;
use crate::traits::model::ModelClient;

/// One [`OpenAIClient`] per configured provider.
#[derive(Clone, Default)]
pub struct ProviderClients {
    clients: HashMap<Provider, OpenAIClient>,
}

impl ProviderClients {
    /// Create with no providers configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build clients for every provider that has an API key.
    pub fn from_credentials(credentials: &ProviderCredentials) -> Self {
        let clients = credentials
            .configured()
            .filter_map(|provider| {
                let key = credentials.api_key(provider)?;
                let client = OpenAIClient::for_provider(provider, key.expose())
                    .with_base_url(credentials.base_url(provider));
                Some((provider, client))
            })
            .collect();
        Self { clients }
    }

    fn client_for(&self, provider: Provider) -> Result<&OpenAIClient> {
        self.clients.get(&provider).ok_or_else(|| {
            OpenAIError::Config(format!(
                "no client for provider '{}' ({} not set)",
                provider,
                provider.api_key_var()
            ))
        })
    }
}

#[async_trait]
impl ModelClient for ProviderClients {
    async fn complete_batch(
        &self,
        model: &str,
        batch: &[Vec<Message>],
        max_output_tokens: u32,
    ) -> Result<Vec<ChatCompletion>> {
        let model_ref = ModelRef::parse(model)?;
        let client = self.client_for(model_ref.provider)?;

        debug!(
            provider = %model_ref.provider,
            model = model_ref.model,
            batch_size = batch.len(),
            "Dispatching batch"
        );

        let requests = batch.iter().map(|messages| {
            let request = ChatRequest::new(model_ref.model)
                .messages(messages.clone())
                .output_limit(max_output_tokens);
            client.chat_completion_raw(request)
        });

        try_join_all(requests).await
    }
}
