//! Stage 1: claim extraction (fan-out).
//!
//! One prompt per source item, one batched request for all of them. Each
//! output becomes zero or more claims; the per-item count is recorded as
//! the item's fan-out.

use tracing::{info, warn};

use super::generator::{BatchedGenerator, GenerationRequest, StageOptions};
use super::parse::{parse_claim_list, ParsePolicy};
use super::templates::PromptTemplate;
use crate::error::{AlignmentError, PipelineError, Result, Stage};
use crate::traits::model::ModelClient;
use crate::types::{ExtractedClaims, Prompt, Tweet};

/// Extracts checkable claims from source items.
pub struct ClaimExtractor<'a, C> {
    generator: &'a BatchedGenerator<C>,
    stage: StageOptions,
    policy: ParsePolicy,
}

impl<'a, C: ModelClient> ClaimExtractor<'a, C> {
    pub fn new(
        generator: &'a BatchedGenerator<C>,
        stage: StageOptions,
        policy: ParsePolicy,
    ) -> Self {
        Self {
            generator,
            stage,
            policy,
        }
    }

    /// Render one extraction prompt per item, with `{text}` bound to the
    /// item's text.
    pub fn prompts(items: &[Tweet], template: &PromptTemplate) -> Vec<Prompt> {
        items
            .iter()
            .map(|item| Prompt::Text(template.render(&[("text", item.text())])))
            .collect()
    }

    /// Extract claims for every item, in source order.
    pub async fn extract(
        &self,
        items: &[Tweet],
        template: &PromptTemplate,
    ) -> Result<ExtractedClaims> {
        let request = GenerationRequest::for_stage(Self::prompts(items, template), &self.stage);
        let outputs = self
            .generator
            .generate(&request)
            .await
            .map_err(PipelineError::generation(Stage::Extraction))?;

        if outputs.len() != items.len() {
            return Err(AlignmentError::OutputCount {
                stage: Stage::Extraction,
                expected: items.len(),
                actual: outputs.len(),
            }
            .into());
        }

        let mut extracted = ExtractedClaims::new();
        for (index, output) in outputs.iter().enumerate() {
            let parsed = parse_claim_list(output.text().unwrap_or_default());
            match self.policy.apply(Stage::Extraction, index, parsed)? {
                Some(texts) => {
                    extracted.push(texts);
                }
                None => extracted.push_unparsed(),
            }
        }

        if !extracted.unparsed_items().is_empty() {
            warn!(
                unparsed = extracted.unparsed_items().len(),
                "Some extraction outputs were recorded as zero claims"
            );
        }
        info!(
            items = extracted.len(),
            claims = extracted.total_claims(),
            "Claim extraction complete"
        );
        Ok(extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockModelClient;
    use std::time::Duration;

    fn stage() -> StageOptions {
        StageOptions {
            model: "gpt-4-turbo".into(),
            max_output_tokens: 4096,
            batch_size: 2,
            retry_budget: 0,
        }
    }

    fn template() -> PromptTemplate {
        PromptTemplate::new("extract", "TWEET: {text}")
    }

    fn client() -> MockModelClient {
        MockModelClient::with_text(|prompt| match prompt {
            "TWEET: none" => "[]".into(),
            "TWEET: two" => r#"[{"claim": "two-a"}, {"claim": "two-b"}]"#.into(),
            "TWEET: one" => r#"```json
[{"claim": "one-a"}]
```"#
                .into(),
            _ => "I cannot help with that.".into(),
        })
    }

    #[tokio::test]
    async fn test_extract_records_fanout_in_source_order() {
        let gen = BatchedGenerator::new(client()).with_retry_backoff(Duration::ZERO);
        let extractor = ClaimExtractor::new(&gen, stage(), ParsePolicy::Strict);
        let items = vec![Tweet::new("none"), Tweet::new("two"), Tweet::new("one")];

        let extracted = extractor.extract(&items, &template()).await.unwrap();

        assert_eq!(extracted.fanout_counts(), &[0, 2, 1]);
        let lists = extracted.claim_lists();
        assert_eq!(lists[1][0].text, "two-a");
        assert_eq!(lists[1][1].source_item_index, 1);
        assert_eq!(lists[2][0].text, "one-a");
        assert_eq!(gen.client().batch_sizes(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_strict_policy_aborts_on_garbage() {
        let gen = BatchedGenerator::new(client());
        let extractor = ClaimExtractor::new(&gen, stage(), ParsePolicy::Strict);
        let items = vec![Tweet::new("two"), Tweet::new("??")];

        let err = extractor.extract(&items, &template()).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Parse {
                stage: Stage::Extraction,
                index: 1,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_lenient_policy_records_zero_claims() {
        let gen = BatchedGenerator::new(client());
        let extractor = ClaimExtractor::new(&gen, stage(), ParsePolicy::Lenient);
        let items = vec![Tweet::new("??"), Tweet::new("one")];

        let extracted = extractor.extract(&items, &template()).await.unwrap();
        assert_eq!(extracted.fanout_counts(), &[0, 1]);
        assert_eq!(extracted.unparsed_items(), &[0]);
    }

    #[tokio::test]
    async fn test_no_items_no_calls() {
        let gen = BatchedGenerator::new(client());
        let extractor = ClaimExtractor::new(&gen, stage(), ParsePolicy::Strict);

        let extracted = extractor.extract(&[], &template()).await.unwrap();
        assert!(extracted.is_empty());
        assert!(gen.client().calls().is_empty());
    }
}
