//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Phase | Command | Agent command key |
//! |-------|---------|-------------------|
//! | Setup | `init` | - |
//! | Plan | `plan`, `quick-plan`, `deep-plan` | `plan_command`, `quick_plan_command`, `deep_plan_command` |
//! | Build | `implement` | `implement_command` |
//! | Check | `review` | `review_command` |
//! | Browse | `specs` | - |
//!
//! ## Output Formats
//!
//! All commands support `--format`:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON for eightx's own messages
//!
//! Agent output is always relayed as-is.
//!
//! ## Exit Codes
//!
//! `0` on success, the agent's own code when a step or review fails, `1` for
//! everything else (usage errors, missing files, invalid specs).
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod implement;
mod output;
mod plan;
mod prompt;
mod review;
mod specs;

pub use app::{run, Cli, Commands, PlanArgs};
pub use implement::run_with_footer;
pub use output::{Output, OutputFormat};
