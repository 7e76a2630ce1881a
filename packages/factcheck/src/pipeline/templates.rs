//! Prompt templates loaded from the prompt directory.
//!
//! Templates use `{name}` placeholders. Rendering is a single pass, so
//! substituted values are never re-expanded, and placeholders missing from
//! the context (including literal JSON braces) are left as written.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

use crate::error::TemplateError;

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"\{([a-z_][a-z0-9_]*)\}").unwrap();
}

/// A named prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: String,
    source: String,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Substitute `{key}` placeholders from `context`.
    pub fn render(&self, context: &[(&str, &str)]) -> String {
        PLACEHOLDER_REGEX
            .replace_all(&self.source, |caps: &Captures<'_>| {
                let key = &caps[1];
                context
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, value)| (*value).to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

/// Looks up templates by file name in a directory.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    dir: PathBuf,
}

impl TemplateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load a template. A missing file is an error, never an empty prompt.
    pub fn load(&self, name: &str) -> Result<PromptTemplate, TemplateError> {
        let path = self.dir.join(name);
        if !path.is_file() {
            return Err(TemplateError::NotFound {
                name: name.to_string(),
                path,
            });
        }

        let source = std::fs::read_to_string(&path)
            .map_err(|source| TemplateError::Read { path: path.clone(), source })?;
        debug!(template = name, path = %path.display(), "Loaded prompt template");
        Ok(PromptTemplate::new(name, source))
    }
}
