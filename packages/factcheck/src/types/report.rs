//! Final per-post reports and their output artifact shape.

use serde::{Deserialize, Serialize};

use super::claim::Claim;
use super::source::Tweet;
use super::verification::{TruthScore, Verification};

/// One claim and its verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub claim: Claim,
    pub verification: Verification,
}

/// Everything found for one source item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub source_item: Tweet,
    pub claims: Vec<ReportEntry>,
}

/// Serialized form of a [`Report`] in the output artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub tweet: String,
    pub claims: Vec<ClaimRecord>,
}

/// Serialized form of a [`ReportEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub claim: String,
    pub truthworthiness: Option<TruthScore>,
    pub explanation: String,
    pub citations: Vec<String>,
}

impl From<&ReportEntry> for ClaimRecord {
    fn from(entry: &ReportEntry) -> Self {
        Self {
            claim: entry.claim.text.clone(),
            truthworthiness: entry.verification.truth_score,
            explanation: entry.verification.explanation.clone(),
            citations: entry.verification.citations.clone(),
        }
    }
}

impl From<&Report> for ReportRecord {
    fn from(report: &Report) -> Self {
        Self {
            tweet: report.source_item.tweet.clone(),
            claims: report.claims.iter().map(ClaimRecord::from).collect(),
        }
    }
}
