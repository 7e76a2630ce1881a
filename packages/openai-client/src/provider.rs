//! Provider routing for OpenAI-compatible endpoints.
//!
//! Model ids may be qualified with a provider prefix, e.g.
//! `perplexity/sonar-pro` or `openrouter/anthropic/claude-3.5-sonnet`.
//! Bare ids (`gpt-4o`) go to OpenAI.

use std::fmt;

use crate::error::{OpenAIError, Result};

/// A chat-completions provider speaking the OpenAI wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAI,
    Perplexity,
    OpenRouter,
}

impl Provider {
    /// All known providers.
    pub const ALL: [Provider; 3] = [Provider::OpenAI, Provider::Perplexity, Provider::OpenRouter];

    /// Prefix used in qualified model ids.
    pub fn prefix(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Perplexity => "perplexity",
            Provider::OpenRouter => "openrouter",
        }
    }

    /// Look up a provider by its model-id prefix.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.prefix() == prefix)
    }

    /// Default REST base URL.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1",
            Provider::Perplexity => "https://api.perplexity.ai",
            Provider::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    /// Environment variable conventionally holding the API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Perplexity => "PERPLEXITY_API_KEY",
            Provider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    /// Environment variable overriding the base URL.
    pub fn base_url_var(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_BASE_URL",
            Provider::Perplexity => "PERPLEXITY_BASE_URL",
            Provider::OpenRouter => "OPENROUTER_BASE_URL",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A model id split into provider and provider-local model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelRef<'a> {
    pub provider: Provider,
    pub model: &'a str,
}

impl<'a> ModelRef<'a> {
    /// Parse a possibly provider-qualified model id.
    ///
    /// Only the first `/` separates the provider, so OpenRouter ids keep
    /// their own vendor prefix.
    pub fn parse(id: &'a str) -> Result<Self> {
        let id = id.trim();
        if id.is_empty() {
            return Err(OpenAIError::Config("empty model id".into()));
        }

        match id.split_once('/') {
            None => Ok(Self {
                provider: Provider::OpenAI,
                model: id,
            }),
            Some((prefix, model)) => {
                let provider = Provider::from_prefix(prefix).ok_or_else(|| {
                    OpenAIError::Config(format!(
                        "unknown provider '{}' in model id '{}'",
                        prefix, id
                    ))
                })?;
                if model.is_empty() {
                    return Err(OpenAIError::Config(format!("model id '{}' has no model name", id)));
                }
                Ok(Self { provider, model })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_id_routes_to_openai() {
        let r = ModelRef::parse("gpt-4-turbo").unwrap();
        assert_eq!(r.provider, Provider::OpenAI);
        assert_eq!(r.model, "gpt-4-turbo");
    }

    #[test]
    fn test_qualified_ids() {
        let r = ModelRef::parse("perplexity/sonar-pro").unwrap();
        assert_eq!(r.provider, Provider::Perplexity);
        assert_eq!(r.model, "sonar-pro");

        let r = ModelRef::parse("openrouter/anthropic/claude-3.5-sonnet").unwrap();
        assert_eq!(r.provider, Provider::OpenRouter);
        assert_eq!(r.model, "anthropic/claude-3.5-sonnet");

        let r = ModelRef::parse("openai/gpt-4o").unwrap();
        assert_eq!(r.provider, Provider::OpenAI);
        assert_eq!(r.model, "gpt-4o");
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let err = ModelRef::parse("acme/model-1").unwrap_err();
        assert!(matches!(err, OpenAIError::Config(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_empty_ids_rejected() {
        assert!(ModelRef::parse("").is_err());
        assert!(ModelRef::parse("perplexity/").is_err());
    }
}
