//! Typed errors for the fact-checking pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`); the binary wraps
//! these with context at the edges.

use std::fmt;
use std::path::PathBuf;

use openai_client::OpenAIError;
use thiserror::Error;

/// Pipeline stage, used to label errors and log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Stage 1: claim extraction, one prompt per source item.
    Extraction,
    /// Stage 2: claim verification, one prompt per extracted claim.
    Verification,
    /// Standalone single-stage fact check.
    SingleCheck,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Extraction => "extraction",
            Stage::Verification => "verification",
            Stage::SingleCheck => "single-check",
        })
    }
}

/// Errors raised by the batched generator.
///
/// Any of these means the whole request produced no usable output.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// A batch call failed terminally or exhausted its retry budget
    #[error("batch {batch} failed after {attempts} attempt(s): {source}")]
    BatchFailed {
        batch: usize,
        attempts: u32,
        #[source]
        source: OpenAIError,
    },

    /// The model client returned a different number of outputs than prompts
    #[error("batch {batch} returned {actual} outputs for {expected} prompts")]
    BatchLength {
        batch: usize,
        expected: usize,
        actual: usize,
    },

    /// Request parameters are unusable
    #[error("invalid generation request: {0}")]
    InvalidRequest(String),
}

/// Length mismatches across the fan-out / fan-in correspondence.
///
/// Always fatal: a mismatch means claims would be attributed to the
/// wrong source item.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignmentError {
    /// A stage produced a different number of outputs than inputs
    #[error("{stage} produced {actual} outputs for {expected} inputs")]
    OutputCount {
        stage: Stage,
        expected: usize,
        actual: usize,
    },

    /// Fan-out counts do not add up to the flat result length
    #[error("fan-out counts sum to {expected} but {actual} results were produced")]
    FanoutSum { expected: usize, actual: usize },

    /// Report assembly inputs disagree on the number of source items
    #[error("cannot assemble reports: {what} has {actual} entries, expected {expected}")]
    ItemCount {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// One source item's claims and verifications disagree
    #[error("source item {index} has {claims} claims but {verifications} verifications")]
    ClaimCount {
        index: usize,
        claims: usize,
        verifications: usize,
    },
}

/// Prompt template lookup failures.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template file does not exist
    #[error("prompt template '{name}' not found at {}", path.display())]
    NotFound { name: String, path: PathBuf },

    /// Template file exists but could not be read
    #[error("failed to read prompt template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A key holds a value of the wrong shape
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A generation request failed as a whole
    #[error("{stage} generation failed: {source}")]
    Generation {
        stage: Stage,
        #[source]
        source: GenerationError,
    },

    /// A model output could not be parsed under the strict policy
    #[error("{stage} output {index} could not be parsed: {reason}")]
    Parse {
        stage: Stage,
        index: usize,
        reason: String,
    },

    /// Fan-out / fan-in correspondence broken
    #[error("alignment error: {0}")]
    Alignment(#[from] AlignmentError),

    /// Prompt template missing or unreadable
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Input document could not be loaded
    #[error("failed to load {}: {reason}", path.display())]
    Input { path: PathBuf, reason: String },

    /// Output artifact could not be written
    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Attach a stage to a generator failure.
    pub fn generation(stage: Stage) -> impl FnOnce(GenerationError) -> Self {
        move |source| PipelineError::Generation { stage, source }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
