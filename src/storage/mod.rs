//! # Storage Layer
//!
//! Everything eightx reads from or writes to disk.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Specs | JSON | `specs/{name}/spec.json` |
//! | Prompts | Markdown | `src/prompts/{phase}.md` |
//! | Config | TOML | `.eightx/config.toml`, `~/.eightx/config.toml` |
//!
//! ## Project Structure
//!
//! ```text
//! project/
//! ├── .eightx/
//! │   └── config.toml       # Project configuration (optional)
//! ├── specs/
//! │   └── add-user-auth/
//! │       └── spec.json     # Written by the planning agent
//! └── src/prompts/
//!     ├── plan.md
//!     ├── implement.md
//!     └── review.md
//! ```
//!
//! ## Key Types
//!
//! - [`Project`] - Entry point: root directory plus effective [`Config`]
//! - [`SpecStore`] - Lists, creates and loads spec folders
//! - [`PromptStore`] - Loads phase prompt templates

mod config;
mod project;
mod prompts;
mod specs;

pub use config::{Config, ConfigError, ConfigLayer, PlanMode, DEFAULT_COMMAND};
pub use project::{Project, ProjectError};
pub use prompts::{PromptNotFound, PromptStore};
pub use specs::{
    check_spec_file, slugify, validate_spec_name, SpecCheck, SpecFolder, SpecStore, SPEC_FILE_NAME,
};
