//! Provider credentials with secure memory.
//!
//! Uses the `secrecy` crate so API keys never show up in logs or debug
//! output of the configuration.

use std::collections::HashMap;
use std::fmt;

use openai_client::Provider;
use secrecy::{ExposeSecret, SecretBox};

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually building a client.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// API keys and endpoint overrides per provider.
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    api_keys: HashMap<Provider, SecretString>,
    base_urls: HashMap<Provider, String>,
}

impl ProviderCredentials {
    /// Create an empty credential set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API key for a provider.
    pub fn with_api_key(mut self, provider: Provider, key: impl Into<SecretString>) -> Self {
        self.api_keys.insert(provider, key.into());
        self
    }

    /// Override the base URL for a provider.
    pub fn with_base_url(mut self, provider: Provider, url: impl Into<String>) -> Self {
        self.base_urls.insert(provider, url.into());
        self
    }

    /// API key for a provider, if configured.
    pub fn api_key(&self, provider: Provider) -> Option<&SecretString> {
        self.api_keys.get(&provider)
    }

    /// Base URL for a provider (override or provider default).
    pub fn base_url(&self, provider: Provider) -> &str {
        self.base_urls
            .get(&provider)
            .map(String::as_str)
            .unwrap_or_else(|| provider.default_base_url())
    }

    /// Providers that have a key configured.
    pub fn configured(&self) -> impl Iterator<Item = Provider> + '_ {
        Provider::ALL
            .into_iter()
            .filter(|p| self.api_keys.contains_key(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_redacted_in_debug() {
        let creds = ProviderCredentials::new().with_api_key(Provider::OpenAI, "sk-very-secret");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_base_url_falls_back_to_provider_default() {
        let creds = ProviderCredentials::new()
            .with_base_url(Provider::OpenRouter, "http://localhost:8080/v1");

        assert_eq!(creds.base_url(Provider::OpenRouter), "http://localhost:8080/v1");
        assert_eq!(creds.base_url(Provider::Perplexity), "https://api.perplexity.ai");
    }

    #[test]
    fn test_configured_lists_providers_with_keys() {
        let creds = ProviderCredentials::new()
            .with_api_key(Provider::Perplexity, "pplx")
            .with_api_key(Provider::OpenAI, "sk");
        let configured: Vec<_> = creds.configured().collect();
        assert_eq!(configured, vec![Provider::OpenAI, Provider::Perplexity]);
    }
}
