//! Single-stage fact checker.
//!
//! Takes claim lists produced by an earlier extraction run and asks a
//! search-grounded model to score each claim in a fixed line format:
//!
//! ```text
//! Claim: ...
//! Confidence Score: 1|2|3
//! Explanation: ...
//! Sources:
//! - ...
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AlignmentError, PipelineError, Result, Stage};
use crate::pipeline::{BatchedGenerator, GenerationRequest, PromptTemplate, StageOptions};
use crate::traits::model::ModelClient;
use crate::types::Prompt;

/// Prompt sent once per claim.
pub const FACT_CHECK_PROMPT: &str = r#"Evaluate the factuality of the following claim. Provide your response in this exact format:

Claim: [repeat the claim here]
Confidence Score: [1, 2, or 3]
Explanation: [brief explanation of your evaluation]
Sources:
- Full citation 1 (include author/organization, title, and URL if available)
- Full citation 2
(if no sources, just put 'None')

Important: Always provide complete source citations, not just reference numbers.
Claim to evaluate: '{claim}'"#;

const SCORE_MARKER: &str = "Confidence Score:";
const EXPLANATION_MARKER: &str = "Explanation:";
const SOURCES_MARKER: &str = "Sources:";

/// Result for one claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactCheck {
    pub claim: String,
    /// 1 (not confident) to 3 (highly confident).
    pub confidence_score: u8,
    pub sources: Vec<String>,
    pub explanation: String,
}

/// Parse a line-format answer. Missing or malformed sections fall back to
/// score 1, no sources and an empty explanation.
pub fn parse_fact_check(claim: &str, content: &str) -> FactCheck {
    FactCheck {
        claim: claim.to_string(),
        confidence_score: parse_score(content),
        sources: parse_sources(content),
        explanation: parse_explanation(content),
    }
}

fn parse_score(content: &str) -> u8 {
    content
        .split_once(SCORE_MARKER)
        .and_then(|(_, rest)| rest.lines().next())
        .and_then(|line| line.trim().chars().next())
        .and_then(|c| c.to_digit(10))
        .map(|d| d.clamp(1, 3) as u8)
        .unwrap_or(1)
}

fn parse_explanation(content: &str) -> String {
    content
        .split_once(EXPLANATION_MARKER)
        .map(|(_, rest)| {
            rest.split(SOURCES_MARKER)
                .next()
                .unwrap_or_default()
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

fn parse_sources(content: &str) -> Vec<String> {
    let Some((_, section)) = content.split_once(SOURCES_MARKER) else {
        return Vec::new();
    };
    let section = section.trim();
    if section.eq_ignore_ascii_case("none") {
        return Vec::new();
    }

    section
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('['))
        .map(|line| line.trim_start_matches('-').trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Score every claim in `claim_lists`, skipping empty lists.
///
/// All claims go through one batched request; results keep input order.
pub async fn check_claims<C: ModelClient>(
    generator: &BatchedGenerator<C>,
    stage: &StageOptions,
    claim_lists: &[Vec<String>],
) -> Result<Vec<FactCheck>> {
    let claims: Vec<&str> = claim_lists
        .iter()
        .filter(|list| !list.is_empty())
        .flatten()
        .map(String::as_str)
        .collect();

    let template = PromptTemplate::new("fact_check", FACT_CHECK_PROMPT);
    let prompts: Vec<Prompt> = claims
        .iter()
        .map(|claim| Prompt::Text(template.render(&[("claim", *claim)])))
        .collect();

    info!(claims = claims.len(), model = %stage.model, "Checking claims");
    let outputs = generator
        .generate(&GenerationRequest::for_stage(prompts, stage))
        .await
        .map_err(PipelineError::generation(Stage::SingleCheck))?;

    if outputs.len() != claims.len() {
        return Err(AlignmentError::OutputCount {
            stage: Stage::SingleCheck,
            expected: claims.len(),
            actual: outputs.len(),
        }
        .into());
    }

    Ok(claims
        .iter()
        .zip(&outputs)
        .map(|(claim, output)| parse_fact_check(claim, output.text().unwrap_or_default()))
        .collect())
}
