//! Project management
//!
//! A project is the directory eightx works in: it holds the optional
//! `.eightx/config.toml`, the spec folders and the prompt templates.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use super::config::{Config, CONFIG_DIR_NAME};
use super::{PromptStore, SpecStore};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project path does not exist: {0}")]
    MissingRoot(PathBuf),

    #[error("Could not determine the current directory")]
    NoCurrentDir,
}

/// An eightx project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens the project rooted at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.is_dir() {
            return Err(ProjectError::MissingRoot(root).into());
        }

        let config = Config::load(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project for the current directory
    ///
    /// The nearest ancestor with a `.eightx/` directory wins; without one
    /// the current directory is the root.
    pub fn open_current() -> Result<Self> {
        let cwd = std::env::current_dir().map_err(|_| ProjectError::NoCurrentDir)?;
        let root = Self::find_root(&cwd).unwrap_or(cwd);

        Self::open(root)
    }

    /// Finds the nearest ancestor containing `.eightx/`
    pub fn find_root(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(CONFIG_DIR_NAME).is_dir() {
                return Some(current);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Initializes a project at the given path
    ///
    /// Creates `.eightx/config.toml` with commented defaults and the specs
    /// directory. Existing files are left untouched.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config_dir = root.join(CONFIG_DIR_NAME);

        fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;

        let config_path = Config::project_config_path(&root);
        if !config_path.exists() {
            fs::write(&config_path, Config::template())
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let project = Self::open(root)?;

        let specs_dir = project.specs().dir().to_path_buf();
        fs::create_dir_all(&specs_dir).with_context(|| {
            format!("Failed to create specs directory: {}", specs_dir.display())
        })?;

        Ok(project)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the `.eightx` directory path
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(CONFIG_DIR_NAME)
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the spec folder store
    pub fn specs(&self) -> SpecStore {
        SpecStore::new(self.root.join(&self.config.specs_dir))
    }

    /// Returns the prompt template store
    pub fn prompts(&self) -> PromptStore {
        PromptStore::new(self.root.join(&self.config.prompts_dir))
    }

    /// Returns a path relative to the project root when possible
    pub fn relative_path<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.config_dir().is_dir());
        assert!(project.config_dir().join("config.toml").is_file());
        assert!(dir.path().join("specs").is_dir());
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        fs::write(
            Config::project_config_path(dir.path()),
            "implement_command = \"custom\"\n",
        )
        .unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert_eq!(project.config().implement_command, "custom");
    }

    #[test]
    fn open_missing_root_fails() {
        let dir = TempDir::new().unwrap();
        let result = Project::open(dir.path().join("missing"));

        assert!(result.is_err());
    }

    #[test]
    fn find_root_walks_up() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".eightx")).unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(Project::find_root(&nested), Some(dir.path().to_path_buf()));
    }

    #[test]
    fn stores_follow_config() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".eightx")).unwrap();
        fs::write(
            Config::project_config_path(dir.path()),
            "specs_dir = \"plans\"\nprompts_dir = \"prompts\"\n",
        )
        .unwrap();

        let project = Project::open(dir.path()).unwrap();

        assert_eq!(project.specs().dir(), dir.path().join("plans"));
        assert_eq!(project.prompts().dir(), dir.path().join("prompts"));
    }

    #[test]
    fn relative_path() {
        let dir = TempDir::new().unwrap();
        let project = Project::open(dir.path()).unwrap();

        let abs_path = dir.path().join("specs").join("auth");
        assert_eq!(project.relative_path(&abs_path), Path::new("specs/auth"));
    }
}
