//! Model output parsing.
//!
//! Stage 1 outputs are JSON claim lists; stage 2 outputs are JSON verdicts.
//! Both tolerate markdown code fences and prose around the JSON body. What
//! happens when parsing still fails is decided by [`ParsePolicy`].

use std::fmt;
use std::str::FromStr;

use openai_client::{strip_code_blocks, truncate_to_char_boundary};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::generator::Generation;
use crate::error::{PipelineError, Stage};
use crate::types::{TruthScore, Verification};

/// Bytes of the offending output quoted in parse errors.
const PREVIEW_BYTES: usize = 120;

/// Field names accepted for the verdict.
const TRUTH_FIELDS: [&str; 3] = ["truth_value", "truthworthiness", "truth_score"];

/// A model output that does not have the expected shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason} (output: {preview:?})")]
pub struct ParseError {
    pub reason: String,
    pub preview: String,
}

impl ParseError {
    fn new(reason: impl Into<String>, output: &str) -> Self {
        Self {
            reason: reason.into(),
            preview: truncate_to_char_boundary(output, PREVIEW_BYTES).to_string(),
        }
    }
}

/// What to do with an output that cannot be parsed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsePolicy {
    /// Abort the run, naming the stage and item index.
    #[default]
    Strict,
    /// Substitute the empty value and log a warning.
    Lenient,
}

impl ParsePolicy {
    /// Apply the policy to one parse result.
    ///
    /// Returns `Ok(None)` when a lenient policy skipped the output; the
    /// caller substitutes its empty value.
    pub fn apply<T>(
        self,
        stage: Stage,
        index: usize,
        result: Result<T, ParseError>,
    ) -> crate::error::Result<Option<T>> {
        match (result, self) {
            (Ok(value), _) => Ok(Some(value)),
            (Err(err), ParsePolicy::Strict) => Err(PipelineError::Parse {
                stage,
                index,
                reason: err.to_string(),
            }),
            (Err(err), ParsePolicy::Lenient) => {
                warn!(
                    %stage,
                    index,
                    error = %err,
                    "Unparseable model output, substituting empty value"
                );
                Ok(None)
            }
        }
    }
}

impl FromStr for ParsePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(ParsePolicy::Strict),
            "lenient" => Ok(ParsePolicy::Lenient),
            other => Err(format!("expected 'strict' or 'lenient', got '{other}'")),
        }
    }
}

impl fmt::Display for ParsePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParsePolicy::Strict => "strict",
            ParsePolicy::Lenient => "lenient",
        })
    }
}

/// Parse a stage 1 output into claim texts, in output order.
///
/// Accepts `[{"claim": ...}, ...]`, `["...", ...]` and
/// `{"claims": [...]}`. An empty array is a valid "no claims" answer.
/// Blank claim strings are dropped, so the returned length is the number of
/// claims that go on to verification.
pub fn parse_claim_list(output: &str) -> Result<Vec<String>, ParseError> {
    let value = parse_json(output, '[', ']')?;
    let items = match &value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("claims") {
            Some(Value::Array(items)) => items,
            _ => return Err(ParseError::new("object has no 'claims' array", output)),
        },
        _ => return Err(ParseError::new("expected a JSON array of claims", output)),
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(text) => Ok(text.trim().to_string()),
            Value::Object(map) => match map.get("claim") {
                Some(Value::String(text)) => Ok(text.trim().to_string()),
                _ => Err(ParseError::new(
                    format!("claim {i} has no string 'claim' field"),
                    output,
                )),
            },
            _ => Err(ParseError::new(
                format!("claim {i} is neither a string nor an object"),
                output,
            )),
        })
        .filter(|text| !matches!(text, Ok(t) if t.is_empty()))
        .collect()
}

/// Parse a stage 2 output into a verdict for `claim_text`.
///
/// Citations come from the provider's response metadata when present,
/// otherwise from a `citations` array in the content body. At most
/// [`MAX_CITATIONS`](crate::types::MAX_CITATIONS) are kept.
pub fn parse_verification(
    claim_text: &str,
    output: &Generation,
) -> Result<Verification, ParseError> {
    let text = output
        .text()
        .ok_or_else(|| ParseError::new("response has no content", ""))?;
    let value = parse_json(text, '{', '}')?;
    let map = value
        .as_object()
        .ok_or_else(|| ParseError::new("expected a JSON object", text))?;

    let truth = TRUTH_FIELDS
        .iter()
        .find_map(|field| map.get(*field))
        .ok_or_else(|| ParseError::new("missing 'truth_value'", text))?;
    let score = truth_score(truth).ok_or_else(|| {
        ParseError::new(format!("unrecognized truth value {truth}"), text)
    })?;

    let explanation = map
        .get("explanation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim();

    let citations: Vec<String> = if output.citations().is_empty() {
        map.get("citations")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    } else {
        output.citations().to_vec()
    };

    Ok(Verification::new(claim_text, score, explanation, citations))
}

fn truth_score(value: &Value) -> Option<TruthScore> {
    match value {
        Value::Number(n) => n.as_i64().and_then(TruthScore::from_numeric),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Parse JSON from a model output, falling back to the outermost
/// `open`..`close` span when the body is wrapped in prose.
fn parse_json(output: &str, open: char, close: char) -> Result<Value, ParseError> {
    let body = strip_code_blocks(output);
    if body.is_empty() {
        return Err(ParseError::new("empty output", output));
    }
    if let Ok(value) = serde_json::from_str(body) {
        return Ok(value);
    }

    match (body.find(open), body.rfind(close)) {
        (Some(start), Some(end)) if start < end => serde_json::from_str(&body[start..=end])
            .map_err(|e| ParseError::new(format!("invalid JSON: {e}"), output)),
        _ => Err(ParseError::new("no JSON found", output)),
    }
}
