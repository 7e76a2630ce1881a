//! Input documents and output artifacts on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::types::{Report, ReportRecord, Tweets};

/// Load a scraped dataset. Unknown fields are ignored.
pub fn load_dataset(path: &Path) -> Result<Tweets> {
    let dataset: Tweets = read_json(path)?;
    info!(path = %path.display(), posts = dataset.tweets.len(), "Loaded dataset");
    Ok(dataset)
}

/// One claim in a claim-list document: a bare string or a `{"claim": ...}`
/// record.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ClaimEntry {
    Text(String),
    Record { claim: String },
}

impl ClaimEntry {
    fn into_text(self) -> String {
        match self {
            ClaimEntry::Text(text) | ClaimEntry::Record { claim: text } => text,
        }
    }
}

/// Claims of one post in a report artifact. Verdict fields are ignored.
#[derive(Debug, Clone, Deserialize)]
struct ReportClaims {
    claims: Vec<ClaimEntry>,
}

/// A claim-list document: nested arrays, or a report artifact as written by
/// [`write_reports`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ClaimListDocument {
    Lists(Vec<Vec<ClaimEntry>>),
    Reports(Vec<ReportClaims>),
}

/// Load claim lists, one list per post.
pub fn load_claim_lists(path: &Path) -> Result<Vec<Vec<String>>> {
    let lists: Vec<Vec<ClaimEntry>> = match read_json(path)? {
        ClaimListDocument::Lists(lists) => lists,
        ClaimListDocument::Reports(reports) => reports.into_iter().map(|r| r.claims).collect(),
    };
    info!(path = %path.display(), posts = lists.len(), "Loaded claim lists");
    Ok(lists
        .into_iter()
        .map(|list| list.into_iter().map(ClaimEntry::into_text).collect())
        .collect())
}

/// Write reports in their artifact shape.
pub fn write_reports(path: &Path, reports: &[Report]) -> Result<()> {
    let records: Vec<ReportRecord> = reports.iter().map(ReportRecord::from).collect();
    write_json(path, &records)
}

/// Write pretty JSON to `path`.
///
/// The document goes to a temporary sibling first and is renamed into place,
/// so a failed run never leaves a truncated artifact behind.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let output_err = |source: std::io::Error| PipelineError::Output {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(output_err)?;
    }

    let body = serde_json::to_string_pretty(value)
        .map_err(|e| output_err(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    let tmp = temp_sibling(path);
    fs::write(&tmp, body).map_err(output_err)?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(output_err(err));
    }

    info!(path = %path.display(), "Wrote artifact");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let input_err = |reason: String| PipelineError::Input {
        path: path.to_path_buf(),
        reason,
    };
    let raw = fs::read_to_string(path).map_err(|e| input_err(e.to_string()))?;
    serde_json::from_str(&raw).map_err(|e| input_err(e.to_string()))
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
