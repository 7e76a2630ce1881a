//! # Factcheck
//!
//! Batched claim extraction and web-grounded verification for scraped
//! social media posts.
//!
//! ## Pipeline
//!
//! 1. **Extract** (fan-out): one prompt per post; each answer becomes zero or
//!    more claims, and the per-post count is recorded.
//! 2. **Verify** (fan-in): all claims are flattened into one sequence,
//!    verified in a single batched request against a search-grounded model,
//!    and cut back into per-post blocks using the recorded counts.
//! 3. **Assemble**: one report per post, in dataset order.
//!
//! Every model call goes through the [`BatchedGenerator`], which keeps
//! outputs aligned with prompts and retries transient provider failures.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use factcheck::{Config, Pipeline, ProviderClients, TemplateStore, load_dataset};
//!
//! let config = Config::from_env()?;
//! let client = ProviderClients::from_credentials(&config.credentials);
//! let templates = TemplateStore::new(&config.prompt_dir);
//!
//! let dataset = load_dataset(&config.dataset_path())?;
//! let reports = Pipeline::new(client, &config)
//!     .run(
//!         &dataset.tweets,
//!         &templates.load("claim_extraction.txt")?,
//!         &templates.load(&config.verify_template)?,
//!     )
//!     .await?;
//! ```
//!
//! ## Modules
//!
//! - [`pipeline`] - Generator, extraction, verification and assembly
//! - [`check`] - Single-stage line-format fact checker
//! - [`traits`] - The [`ModelClient`] seam
//! - [`providers`] - Provider-routed [`ModelClient`] over OpenAI-compatible APIs
//! - [`testing`] - Mock model client for tests

pub mod artifacts;
pub mod check;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod providers;
pub mod testing;
pub mod traits;
pub mod types;

pub use artifacts::{load_claim_lists, load_dataset, write_json, write_reports};
pub use check::{check_claims, parse_fact_check, FactCheck};
pub use config::{Config, LoggingConfig};
pub use credentials::{ProviderCredentials, SecretString};
pub use error::{
    AlignmentError, ConfigError, GenerationError, PipelineError, Result, Stage, TemplateError,
};
pub use pipeline::{
    assemble, BatchedGenerator, Generation, GenerationRequest, ParsePolicy, Pipeline,
    PromptTemplate, StageOptions, TemplateStore,
};
pub use providers::ProviderClients;
pub use traits::ModelClient;
pub use types::{
    Claim, ExtractedClaims, Prompt, Report, ReportEntry, ReportRecord, Tweet, Tweets, TruthScore,
    Verification,
};

// Re-export testing utilities
pub use testing::MockModelClient;
