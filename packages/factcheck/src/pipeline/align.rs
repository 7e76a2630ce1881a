//! Stage 2: claim verification (fan-in).
//!
//! Claims from every source item are flattened into one sequence, verified
//! in a single batched request, and cut back into per-item blocks using the
//! fan-out counts recorded at extraction time.

use openai_client::Message;
use tracing::info;

use super::generator::{BatchedGenerator, GenerationRequest, StageOptions};
use super::parse::{parse_verification, ParsePolicy};
use super::templates::PromptTemplate;
use crate::error::{AlignmentError, PipelineError, Result, Stage};
use crate::traits::model::ModelClient;
use crate::types::{Claim, ExtractedClaims, Prompt, Tweet, Verification};

/// A claim paired with the source item it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlatClaim<'a> {
    pub tweet: &'a Tweet,
    pub claim: &'a Claim,
}

/// Flatten per-item claim lists: source order, then parse order.
pub fn flatten<'a>(items: &'a [Tweet], claim_lists: &'a [Vec<Claim>]) -> Vec<FlatClaim<'a>> {
    items
        .iter()
        .zip(claim_lists)
        .flat_map(|(tweet, claims)| claims.iter().map(move |claim| FlatClaim { tweet, claim }))
        .collect()
}

/// Split `flat` into contiguous blocks of `counts[i]` elements each.
///
/// Fails unless the counts add up to `flat.len()` exactly.
pub fn repartition<T>(
    flat: Vec<T>,
    counts: &[usize],
) -> std::result::Result<Vec<Vec<T>>, AlignmentError> {
    let expected: usize = counts.iter().sum();
    if expected != flat.len() {
        return Err(AlignmentError::FanoutSum {
            expected,
            actual: flat.len(),
        });
    }

    let mut rest = flat.into_iter();
    Ok(counts
        .iter()
        .map(|&count| rest.by_ref().take(count).collect())
        .collect())
}

/// Verifies extracted claims and realigns the verdicts per source item.
pub struct VerificationAligner<'a, C> {
    generator: &'a BatchedGenerator<C>,
    stage: StageOptions,
    policy: ParsePolicy,
    system_prompt: Option<String>,
}

impl<'a, C: ModelClient> VerificationAligner<'a, C> {
    pub fn new(
        generator: &'a BatchedGenerator<C>,
        stage: StageOptions,
        policy: ParsePolicy,
    ) -> Self {
        Self {
            generator,
            stage,
            policy,
            system_prompt: None,
        }
    }

    /// Precede every verification prompt with this system turn.
    pub fn with_system_prompt(mut self, prompt: Option<String>) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Render one prompt per flattened claim.
    pub fn prompts(&self, flat: &[FlatClaim<'_>], template: &PromptTemplate) -> Vec<Prompt> {
        flat.iter()
            .map(|pair| {
                let body = template.render(&[
                    ("text", pair.tweet.text()),
                    ("tweet", pair.tweet.text()),
                    ("claim", pair.claim.text.as_str()),
                ]);
                match &self.system_prompt {
                    Some(system) => {
                        Prompt::Turns(vec![Message::system(system.clone()), Message::user(body)])
                    }
                    None => Prompt::Text(body),
                }
            })
            .collect()
    }

    /// Verify a flat claim sequence. Output has one verdict per claim, in order.
    pub async fn verify(
        &self,
        flat: &[FlatClaim<'_>],
        template: &PromptTemplate,
    ) -> Result<Vec<Verification>> {
        let request = GenerationRequest::for_stage(self.prompts(flat, template), &self.stage)
            .full_responses();
        let outputs = self
            .generator
            .generate(&request)
            .await
            .map_err(PipelineError::generation(Stage::Verification))?;

        if outputs.len() != flat.len() {
            return Err(AlignmentError::OutputCount {
                stage: Stage::Verification,
                expected: flat.len(),
                actual: outputs.len(),
            }
            .into());
        }

        let mut verifications = Vec::with_capacity(flat.len());
        for (index, (pair, output)) in flat.iter().zip(&outputs).enumerate() {
            let parsed = parse_verification(&pair.claim.text, output);
            let verification = self
                .policy
                .apply(Stage::Verification, index, parsed)?
                .unwrap_or_else(|| Verification::unresolved(pair.claim.text.clone()));
            verifications.push(verification);
        }
        Ok(verifications)
    }

    /// Verify every extracted claim and return one verdict block per source
    /// item, sized by the recorded fan-out counts.
    pub async fn verify_extracted(
        &self,
        items: &[Tweet],
        extracted: &ExtractedClaims,
        template: &PromptTemplate,
    ) -> Result<Vec<Vec<Verification>>> {
        if extracted.len() != items.len() {
            return Err(AlignmentError::ItemCount {
                what: "claim lists",
                expected: items.len(),
                actual: extracted.len(),
            }
            .into());
        }

        let flat = flatten(items, extracted.claim_lists());
        info!(claims = flat.len(), "Verifying claims");
        let verifications = self.verify(&flat, template).await?;
        Ok(repartition(verifications, extracted.fanout_counts())?)
    }
}
