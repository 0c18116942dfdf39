//! Prompt templates
//!
//! Each phase has a markdown system prompt named after it, e.g.
//! `src/prompts/implement.md`.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
#[error("Prompt file not found: {}", .0.display())]
pub struct PromptNotFound(pub PathBuf);

/// Store for prompt templates
pub struct PromptStore {
    dir: PathBuf,
}

impl PromptStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the template for a phase
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.md", name))
    }

    /// Loads the template for a phase
    pub fn load(&self, name: &str) -> Result<String, PromptNotFound> {
        let path = self.path(name);
        fs::read_to_string(&path).map_err(|_| PromptNotFound(path))
    }

    /// Loads a template used as a preamble: trailing whitespace trimmed,
    /// followed by one blank line
    pub fn preamble(&self, name: &str) -> Result<String, PromptNotFound> {
        let prompt = self.load(name)?;
        Ok(format!("{}\n\n", prompt.trim_end()))
    }
}
