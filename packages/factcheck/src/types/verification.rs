//! Stage 2 verdicts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Citations kept per claim; any beyond this are dropped.
pub const MAX_CITATIONS: usize = 3;

/// How likely a claim is to be true.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruthScore {
    Low,
    Medium,
    High,
}

impl TruthScore {
    /// Map the 1..=3 numeric scale.
    pub fn from_numeric(value: i64) -> Option<Self> {
        match value {
            1 => Some(TruthScore::Low),
            2 => Some(TruthScore::Medium),
            3 => Some(TruthScore::High),
            _ => None,
        }
    }
}

impl FromStr for TruthScore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "low" => Ok(TruthScore::Low),
            "medium" => Ok(TruthScore::Medium),
            "high" => Ok(TruthScore::High),
            other => other
                .parse::<i64>()
                .ok()
                .and_then(TruthScore::from_numeric)
                .ok_or_else(|| format!("unrecognized truth score '{}'", s.trim())),
        }
    }
}

impl fmt::Display for TruthScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TruthScore::Low => "low",
            TruthScore::Medium => "medium",
            TruthScore::High => "high",
        })
    }
}

/// Verdict for one claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub claim_text: String,

    /// `None` when the verdict could not be parsed and the lenient policy
    /// substituted an empty one.
    pub truth_score: Option<TruthScore>,

    pub explanation: String,

    /// At most [`MAX_CITATIONS`] entries.
    pub citations: Vec<String>,
}

impl Verification {
    /// Build a verdict, keeping only the first [`MAX_CITATIONS`] citations.
    pub fn new(
        claim_text: impl Into<String>,
        truth_score: TruthScore,
        explanation: impl Into<String>,
        citations: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            claim_text: claim_text.into(),
            truth_score: Some(truth_score),
            explanation: explanation.into(),
            citations: citations.into_iter().take(MAX_CITATIONS).collect(),
        }
    }

    /// Empty verdict for output that could not be parsed.
    pub fn unresolved(claim_text: impl Into<String>) -> Self {
        Self {
            claim_text: claim_text.into(),
            truth_score: None,
            explanation: String::new(),
            citations: Vec::new(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.truth_score.is_some()
    }
}
