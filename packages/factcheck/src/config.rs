//! Run configuration.
//!
//! Built once by the binary (from environment variables and an optional
//! `.env` file) and passed by reference into every component. Library code
//! never reads the environment itself.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use openai_client::Provider;

use crate::credentials::ProviderCredentials;
use crate::error::ConfigError;
use crate::pipeline::generator::StageOptions;
use crate::pipeline::parse::ParsePolicy;

/// Report artifact written by `analyze` and read by `check`.
pub const REPORTS_FILE: &str = "entity_extraction_responses.json";

/// Artifact written by `check`.
pub const FACT_CHECK_FILE: &str = "factuality_check_results.json";

/// System turn sent ahead of every verification prompt unless overridden.
pub const DEFAULT_VERIFY_SYSTEM_PROMPT: &str = "You are an artificial intelligence assistant and you need to help fact check tweets and other information \
the user may share with you. At all times make sure to be helpful, concise, and do NOT act overconfident. \
Cite everything you do, search for relevant and reliable sources (such as official news sources from reliable \
outlets such as the NYT, BBC, WSJ, AP News, etc...) and if the answers are not clear say you don't know. Back up every single claim.";

/// Logging settings.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Emit events at `level` to stderr and a log file.
    pub enabled: bool,

    /// Minimum level when enabled (trace, debug, info, warn, error).
    pub level: String,

    /// Directory for `api_requests_<timestamp>.log` files.
    pub dir: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
            dir: PathBuf::from("logs"),
        }
    }
}

/// Full configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Stage 1 model (claim extraction).
    pub model_name: String,

    /// Stage 2 model (web-grounded verification).
    pub verify_model: String,

    /// Model for the single-stage checker.
    pub check_model: String,

    /// Output token limit per call.
    pub max_tokens: u32,

    /// Prompts per batch call.
    pub batch_size: usize,

    /// Retries per batch call on retryable transport errors.
    pub num_retries: u32,

    /// Base delay for exponential retry backoff.
    pub retry_backoff: Duration,

    /// Batches in flight at once. 1 means strictly sequential dispatch.
    pub max_concurrent_batches: usize,

    /// What to do with unparseable model output.
    pub parse_policy: ParsePolicy,

    pub prompt_dir: PathBuf,
    pub output_dir: PathBuf,
    pub data_dir: PathBuf,

    /// Dataset file name inside `data_dir`.
    pub dataset_file: String,

    /// Verification template name inside `prompt_dir`.
    pub verify_template: String,

    /// System turn for verification prompts; `None` sends the bare prompt.
    pub verify_system_prompt: Option<String>,

    pub logging: LoggingConfig,

    pub credentials: ProviderCredentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_name: "gpt-4-turbo".to_string(),
            verify_model: "perplexity/sonar-pro".to_string(),
            check_model: "perplexity/sonar".to_string(),
            max_tokens: 4096,
            batch_size: 20,
            num_retries: 4,
            retry_backoff: Duration::from_millis(500),
            max_concurrent_batches: 1,
            parse_policy: ParsePolicy::Strict,
            prompt_dir: PathBuf::from("prompts"),
            output_dir: PathBuf::from("output"),
            data_dir: PathBuf::from("data"),
            dataset_file: "tweets_v2.json".to_string(),
            verify_template: "claim_fact_check.txt".to_string(),
            verify_system_prompt: Some(DEFAULT_VERIFY_SYSTEM_PROMPT.to_string()),
            logging: LoggingConfig::default(),
            credentials: ProviderCredentials::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Reads a `.env` file first if one is present. Every key is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let mut credentials = ProviderCredentials::new();
        for provider in Provider::ALL {
            if let Some(key) = get(provider.api_key_var()) {
                credentials = credentials.with_api_key(provider, key);
            }
            if let Some(url) = get(provider.base_url_var()) {
                credentials = credentials.with_base_url(provider, url);
            }
        }

        // An explicitly empty VERIFY_SYSTEM_PROMPT disables the system turn.
        let verify_system_prompt = match lookup("VERIFY_SYSTEM_PROMPT") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v),
            None => defaults.verify_system_prompt,
        };

        let batch_size: usize = parse_or("BATCH_SIZE", get("BATCH_SIZE"), defaults.batch_size)?;
        if batch_size == 0 {
            return Err(invalid("BATCH_SIZE", "0", "must be at least 1"));
        }
        let max_concurrent_batches: usize = parse_or(
            "MAX_CONCURRENT_BATCHES",
            get("MAX_CONCURRENT_BATCHES"),
            defaults.max_concurrent_batches,
        )?;
        if max_concurrent_batches == 0 {
            return Err(invalid("MAX_CONCURRENT_BATCHES", "0", "must be at least 1"));
        }

        Ok(Self {
            model_name: get("MODEL_NAME").unwrap_or(defaults.model_name),
            verify_model: get("VERIFY_MODEL").unwrap_or(defaults.verify_model),
            check_model: get("CHECK_MODEL").unwrap_or(defaults.check_model),
            max_tokens: parse_or("MAX_TOKENS", get("MAX_TOKENS"), defaults.max_tokens)?,
            batch_size,
            num_retries: parse_or("NUM_RETRIES", get("NUM_RETRIES"), defaults.num_retries)?,
            retry_backoff: Duration::from_millis(parse_or(
                "RETRY_BACKOFF_MS",
                get("RETRY_BACKOFF_MS"),
                defaults.retry_backoff.as_millis() as u64,
            )?),
            max_concurrent_batches,
            parse_policy: parse_or("PARSE_POLICY", get("PARSE_POLICY"), defaults.parse_policy)?,
            prompt_dir: get("PROMPT_DIR").map(PathBuf::from).unwrap_or(defaults.prompt_dir),
            output_dir: get("OUTPUT_DIR").map(PathBuf::from).unwrap_or(defaults.output_dir),
            data_dir: get("DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            dataset_file: get("DATASET_FILE").unwrap_or(defaults.dataset_file),
            verify_template: get("VERIFY_TEMPLATE").unwrap_or(defaults.verify_template),
            verify_system_prompt,
            logging: LoggingConfig {
                enabled: get("ENABLE_LOGGING")
                    .map(|v| is_truthy(&v))
                    .unwrap_or(defaults.logging.enabled),
                level: get("LOG_LEVEL")
                    .map(|v| v.to_lowercase())
                    .unwrap_or(defaults.logging.level),
                dir: get("LOG_DIR").map(PathBuf::from).unwrap_or(defaults.logging.dir),
            },
            credentials,
        })
    }

    /// Path of the input dataset.
    pub fn dataset_path(&self) -> PathBuf {
        self.data_dir.join(&self.dataset_file)
    }

    /// Path of an artifact inside `output_dir`.
    pub fn output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Generation options for stage 1.
    pub fn extraction_stage(&self) -> StageOptions {
        self.stage_for(&self.model_name)
    }

    /// Generation options for stage 2.
    pub fn verification_stage(&self) -> StageOptions {
        self.stage_for(&self.verify_model)
    }

    /// Generation options for the single-stage checker.
    pub fn check_stage(&self) -> StageOptions {
        self.stage_for(&self.check_model)
    }

    fn stage_for(&self, model: &str) -> StageOptions {
        StageOptions {
            model: model.to_string(),
            max_output_tokens: self.max_tokens,
            batch_size: self.batch_size,
            retry_budget: self.num_retries,
        }
    }

    /// Set the stage 1 model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = model.into();
        self
    }

    /// Set the stage 2 model.
    pub fn with_verify_model(mut self, model: impl Into<String>) -> Self {
        self.verify_model = model.into();
        self
    }

    /// Set the batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set the parse policy.
    pub fn with_parse_policy(mut self, policy: ParsePolicy) -> Self {
        self.parse_policy = policy;
        self
    }

    /// Set the retry budget and backoff base.
    pub fn with_retries(mut self, num_retries: u32, backoff: Duration) -> Self {
        self.num_retries = num_retries;
        self.retry_backoff = backoff;
        self
    }

    /// Set the verification system prompt.
    pub fn with_verify_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.verify_system_prompt = prompt;
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_lowercase().as_str(),
        "true" | "1" | "yes" | "y"
    )
}

fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|e: T::Err| invalid(key, &value, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.model_name, "gpt-4-turbo");
        assert_eq!(config.verify_model, "perplexity/sonar-pro");
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.batch_size, 20);
        assert_eq!(config.num_retries, 4);
        assert_eq!(config.max_concurrent_batches, 1);
        assert_eq!(config.parse_policy, ParsePolicy::Strict);
        assert!(!config.logging.enabled);
        assert_eq!(config.dataset_path(), PathBuf::from("data/tweets_v2.json"));
        assert!(config.verify_system_prompt.is_some());
        assert_eq!(config.credentials.configured().count(), 0);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("MODEL_NAME", "openai/gpt-4o"),
            ("MAX_TOKENS", "512"),
            ("BATCH_SIZE", "7"),
            ("NUM_RETRIES", "2"),
            ("PARSE_POLICY", "lenient"),
            ("ENABLE_LOGGING", "YES"),
            ("LOG_LEVEL", "DEBUG"),
            ("DATA_DIR", "/tmp/data"),
            ("OUTPUT_DIR", "/tmp/out"),
            ("PERPLEXITY_API_KEY", "pplx-123"),
            ("VERIFY_SYSTEM_PROMPT", ""),
        ]))
        .unwrap();

        assert_eq!(config.model_name, "openai/gpt-4o");
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.batch_size, 7);
        assert_eq!(config.num_retries, 2);
        assert_eq!(config.parse_policy, ParsePolicy::Lenient);
        assert!(config.logging.enabled);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.dataset_path(), PathBuf::from("/tmp/data/tweets_v2.json"));
        assert_eq!(
            config.output_path(REPORTS_FILE),
            PathBuf::from("/tmp/out/entity_extraction_responses.json")
        );
        assert!(config.verify_system_prompt.is_none());
        assert_eq!(
            config
                .credentials
                .api_key(Provider::Perplexity)
                .map(|k| k.expose()),
            Some("pplx-123")
        );
    }

    #[test]
    fn test_invalid_numbers_are_errors() {
        let err = Config::from_lookup(lookup(&[("MAX_TOKENS", "lots")])).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));

        assert!(Config::from_lookup(lookup(&[("BATCH_SIZE", "0")])).is_err());
        assert!(Config::from_lookup(lookup(&[("PARSE_POLICY", "sloppy")])).is_err());
    }

    #[test]
    fn test_stage_options_follow_config() {
        let config = Config::default().with_batch_size(3).with_verify_model("perplexity/sonar");
        let stage = config.verification_stage();
        assert_eq!(stage.model, "perplexity/sonar");
        assert_eq!(stage.batch_size, 3);
        assert_eq!(stage.retry_budget, 4);
        assert_eq!(stage.max_output_tokens, 4096);
    }
}
