//! Spec folder storage
//!
//! Each planned task lives in its own folder under the specs directory and
//! holds a `spec.json` written by the planning agent.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};

use crate::domain::{SpecDocument, SpecError};

/// File name of the spec inside a spec folder
pub const SPEC_FILE_NAME: &str = "spec.json";

const SLUG_MAX_CHARS: usize = 40;

/// A spec folder on disk
#[derive(Debug, Clone)]
pub struct SpecFolder {
    pub name: String,
    pub path: PathBuf,
    pub modified: DateTime<Local>,
}

impl SpecFolder {
    /// Path to this folder's spec file
    pub fn spec_file(&self) -> PathBuf {
        self.path.join(SPEC_FILE_NAME)
    }
}

/// Store for spec folders
pub struct SpecStore {
    dir: PathBuf,
}

impl SpecStore {
    /// Creates a store rooted at the given specs directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the specs directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lists spec folders, most recently modified first
    ///
    /// A missing specs directory yields an empty list.
    pub fn list(&self) -> Result<Vec<SpecFolder>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(Vec::new()),
        };

        let mut folders = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let modified = fs::metadata(&path)
                .and_then(|m| m.modified())
                .with_context(|| format!("Failed to stat spec folder: {}", path.display()))?;

            folders.push(SpecFolder {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                modified: DateTime::<Local>::from(modified),
            });
        }

        folders.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
        Ok(folders)
    }

    /// Looks up a spec folder by name
    pub fn get(&self, name: &str) -> Option<SpecFolder> {
        let path = self.dir.join(name);
        if !path.is_dir() {
            return None;
        }

        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);

        Some(SpecFolder {
            name: name.to_string(),
            path,
            modified: DateTime::<Local>::from(modified),
        })
    }

    /// Creates (or reuses) a spec folder and returns its path
    pub fn create(&self, name: &str) -> Result<PathBuf> {
        let path = self.dir.join(name);
        fs::create_dir_all(&path)
            .with_context(|| format!("Failed to create spec folder: {}", path.display()))?;
        Ok(path)
    }

    /// Reads and parses the spec file of a folder
    pub fn load(&self, folder: &SpecFolder) -> Result<SpecDocument> {
        let spec_file = folder.spec_file();
        let raw = fs::read_to_string(&spec_file)
            .with_context(|| format!("spec.json not found at {}", spec_file.display()))?;

        Ok(SpecDocument::parse(&raw)?)
    }
}

/// Outcome of checking a freshly written spec file
#[derive(Debug)]
pub enum SpecCheck {
    Valid,
    Missing,
    Invalid(SpecError),
}

/// Checks that the spec file exists and is valid JSON
pub fn check_spec_file(path: &Path) -> SpecCheck {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(_) => return SpecCheck::Missing,
    };

    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(_) => SpecCheck::Valid,
        Err(e) => SpecCheck::Invalid(SpecError::InvalidJson(e.to_string())),
    }
}

/// Rejects names that would not be a single folder inside the specs dir
pub fn validate_spec_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("Spec folder name must not be empty");
    }
    if name == "." || name == ".." || name.chars().any(std::path::is_separator) {
        bail!("Invalid spec folder name: {}", name);
    }
    Ok(())
}

/// Default spec folder name for a task description
///
/// Lowercases the task, joins whitespace runs with `-` and keeps at most 40
/// characters.
pub fn slugify(task: &str) -> String {
    task.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .chars()
        .take(SLUG_MAX_CHARS)
        .collect()
}
