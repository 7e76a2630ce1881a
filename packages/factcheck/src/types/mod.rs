//! Data types flowing through the pipeline.

pub mod claim;
pub mod prompt;
pub mod report;
pub mod source;
pub mod verification;

pub use claim::{Claim, ExtractedClaims};
pub use prompt::Prompt;
pub use report::{ClaimRecord, Report, ReportEntry, ReportRecord};
pub use source::{Tweet, Tweets};
pub use verification::{TruthScore, Verification, MAX_CITATIONS};
