//! Configuration handling for eightx
//!
//! Configuration is layered: built-in defaults, then the global file
//! `~/.eightx/config.toml`, then the project file `.eightx/config.toml`.
//! Each layer only overrides the keys it sets.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Agent command used for every phase unless configured otherwise
pub const DEFAULT_COMMAND: &str = "opencode run";

/// Name of the per-user and per-project config directory
pub const CONFIG_DIR_NAME: &str = ".eightx";

const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

/// Planning modes, each with its own prompt and agent command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    Plan,
    QuickPlan,
    DeepPlan,
}

impl PlanMode {
    /// Prompt file stem and display name
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanMode::Plan => "plan",
            PlanMode::QuickPlan => "quick-plan",
            PlanMode::DeepPlan => "deep-plan",
        }
    }
}

/// Effective configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Agent command for `plan`
    pub plan_command: String,

    /// Agent command for `quick-plan`
    pub quick_plan_command: String,

    /// Agent command for `deep-plan`
    pub deep_plan_command: String,

    /// Agent command run once per step by `implement`
    pub implement_command: String,

    /// Agent command for `review`
    pub review_command: String,

    /// Directory holding spec folders, relative to the project root
    pub specs_dir: PathBuf,

    /// Directory holding prompt templates, relative to the project root
    pub prompts_dir: PathBuf,

    /// Show the sticky progress footer during `implement`
    pub progress_footer: bool,

    /// Attempts at getting a parseable spec file out of the planner
    pub fix_attempts: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plan_command: DEFAULT_COMMAND.to_string(),
            quick_plan_command: DEFAULT_COMMAND.to_string(),
            deep_plan_command: DEFAULT_COMMAND.to_string(),
            implement_command: DEFAULT_COMMAND.to_string(),
            review_command: DEFAULT_COMMAND.to_string(),
            specs_dir: PathBuf::from("specs"),
            prompts_dir: PathBuf::from("src/prompts"),
            progress_footer: true,
            fix_attempts: 3,
        }
    }
}

/// One config file; unset keys fall through to the layer below
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub plan_command: Option<String>,
    pub quick_plan_command: Option<String>,
    pub deep_plan_command: Option<String>,
    pub implement_command: Option<String>,
    pub review_command: Option<String>,
    pub specs_dir: Option<PathBuf>,
    pub prompts_dir: Option<PathBuf>,
    pub progress_footer: Option<bool>,
    pub fix_attempts: Option<u32>,
}

impl ConfigLayer {
    /// Reads a layer from disk; a missing file is an empty layer
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ConfigError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
            .context("Failed to load configuration")
    }
}

impl Config {
    /// Loads the global and project layers on top of the defaults
    pub fn load(project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            config.apply(ConfigLayer::read(&global_path)?)?;
        }

        config.apply(ConfigLayer::read(&Self::project_config_path(project_root))?)?;

        Ok(config)
    }

    /// Returns the global config directory (`~/.eightx`)
    pub fn global_config_dir() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.home_dir().join(CONFIG_DIR_NAME))
    }

    /// Returns the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
    }

    /// Returns the project config file path for a root
    pub fn project_config_path(project_root: &Path) -> PathBuf {
        project_root.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME)
    }

    /// Overrides every key the layer sets
    pub fn apply(&mut self, layer: ConfigLayer) -> Result<(), ConfigError> {
        let commands = [
            (layer.plan_command, &mut self.plan_command, "plan_command"),
            (layer.quick_plan_command, &mut self.quick_plan_command, "quick_plan_command"),
            (layer.deep_plan_command, &mut self.deep_plan_command, "deep_plan_command"),
            (layer.implement_command, &mut self.implement_command, "implement_command"),
            (layer.review_command, &mut self.review_command, "review_command"),
        ];

        for (value, slot, key) in commands {
            if let Some(command) = value {
                if command.trim().is_empty() {
                    return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
                }
                *slot = command;
            }
        }

        if let Some(dir) = layer.specs_dir {
            self.specs_dir = dir;
        }
        if let Some(dir) = layer.prompts_dir {
            self.prompts_dir = dir;
        }
        if let Some(enabled) = layer.progress_footer {
            self.progress_footer = enabled;
        }
        if let Some(attempts) = layer.fix_attempts {
            if attempts == 0 {
                return Err(ConfigError::Invalid("fix_attempts must be at least 1".to_string()));
            }
            self.fix_attempts = attempts;
        }

        Ok(())
    }

    /// Agent command for a planning mode
    pub fn plan_command_for(&self, mode: PlanMode) -> &str {
        match mode {
            PlanMode::Plan => &self.plan_command,
            PlanMode::QuickPlan => &self.quick_plan_command,
            PlanMode::DeepPlan => &self.deep_plan_command,
        }
    }

    /// Commented template written by `eightx init`
    pub fn template() -> String {
        let defaults = Self::default();
        format!(
            r#"# eightx configuration
# Keys left commented out fall back to ~/.eightx/config.toml, then to the defaults.

# Agent commands; the prompt is appended as a single shell-quoted argument
# plan_command = "{cmd}"
# quick_plan_command = "{cmd}"
# deep_plan_command = "{cmd}"
# implement_command = "{cmd}"
# review_command = "{cmd}"

# Where spec folders and prompt templates live, relative to the project root
# specs_dir = "{specs}"
# prompts_dir = "{prompts}"

# Sticky step-progress footer during `eightx implement`
# progress_footer = true

# Attempts at getting valid JSON out of the planner
# fix_attempts = {attempts}
"#,
            cmd = DEFAULT_COMMAND,
            specs = defaults.specs_dir.display(),
            prompts = defaults.prompts_dir.display(),
            attempts = defaults.fix_attempts,
        )
    }
}
