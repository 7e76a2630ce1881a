//! The two-stage fact-checking pipeline.
//!
//! The pipeline orchestrates:
//! - Claim extraction, one prompt per post (fan-out)
//! - Claim verification over the flattened claim sequence (fan-in)
//! - Report assembly per post
//!
//! Every model call goes through the [`BatchedGenerator`].

pub mod align;
pub mod assemble;
pub mod extract;
pub mod generator;
pub mod parse;
pub mod templates;

pub use align::{flatten, repartition, FlatClaim, VerificationAligner};
pub use assemble::assemble;
pub use extract::ClaimExtractor;
pub use generator::{BatchedGenerator, Generation, GenerationRequest, StageOptions};
pub use parse::{parse_claim_list, parse_verification, ParseError, ParsePolicy};
pub use templates::{PromptTemplate, TemplateStore};

use std::path::Path;

use tracing::info;

use crate::artifacts::write_reports;
use crate::config::Config;
use crate::error::Result;
use crate::traits::model::ModelClient;
use crate::types::{Report, Tweet};

/// Runs extraction, verification and assembly over a dataset.
pub struct Pipeline<'a, C> {
    generator: BatchedGenerator<C>,
    config: &'a Config,
}

impl<'a, C: ModelClient> Pipeline<'a, C> {
    /// Create a pipeline using the config's dispatch and retry settings.
    pub fn new(client: C, config: &'a Config) -> Self {
        let generator = BatchedGenerator::new(client)
            .with_max_concurrent_batches(config.max_concurrent_batches)
            .with_retry_backoff(config.retry_backoff);
        Self { generator, config }
    }

    pub fn generator(&self) -> &BatchedGenerator<C> {
        &self.generator
    }

    /// Run both stages and assemble one report per post, in dataset order.
    ///
    /// Any failure aborts the whole run; partial reports are never returned.
    pub async fn run(
        &self,
        items: &[Tweet],
        extraction_template: &PromptTemplate,
        verification_template: &PromptTemplate,
    ) -> Result<Vec<Report>> {
        info!(
            posts = items.len(),
            model = %self.config.model_name,
            verify_model = %self.config.verify_model,
            "Starting fact-check run"
        );

        let extractor = ClaimExtractor::new(
            &self.generator,
            self.config.extraction_stage(),
            self.config.parse_policy,
        );
        let extracted = extractor.extract(items, extraction_template).await?;

        let aligner = VerificationAligner::new(
            &self.generator,
            self.config.verification_stage(),
            self.config.parse_policy,
        )
        .with_system_prompt(self.config.verify_system_prompt.clone());
        let blocks = aligner
            .verify_extracted(items, &extracted, verification_template)
            .await?;

        let reports = assemble(items, extracted.claim_lists(), blocks)?;
        info!(
            posts = reports.len(),
            claims = extracted.total_claims(),
            "Fact-check run complete"
        );
        Ok(reports)
    }

    /// Run both stages and write the reports to `output_path`.
    ///
    /// Nothing is written unless the run succeeds.
    pub async fn run_to_file(
        &self,
        items: &[Tweet],
        extraction_template: &PromptTemplate,
        verification_template: &PromptTemplate,
        output_path: &Path,
    ) -> Result<Vec<Report>> {
        let reports = self
            .run(items, extraction_template, verification_template)
            .await?;
        write_reports(output_path, &reports)?;
        Ok(reports)
    }
}
