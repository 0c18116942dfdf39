//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{implement, plan, review, specs};
use crate::storage::{PlanMode, Project};

#[derive(Parser)]
#[command(name = "eightx")]
#[command(author, version, about = "Plan, implement and review coding tasks with an agent CLI")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create .eightx/config.toml and the specs directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Plan a task into a new spec
    Plan(PlanArgs),

    /// Plan a task with the quick planner
    QuickPlan(PlanArgs),

    /// Plan a task with the deep planner
    DeepPlan(PlanArgs),

    /// Run every step of a spec through the agent
    Implement {
        /// Spec folder name (asked interactively when omitted)
        #[arg(long, short)]
        spec: Option<String>,

        /// Plain step headers instead of the sticky progress footer
        #[arg(long)]
        no_footer: bool,
    },

    /// Review the work against a spec's acceptance criteria
    Review {
        /// Spec folder name (asked interactively when omitted)
        #[arg(long, short)]
        spec: Option<String>,
    },

    /// List spec folders, newest first
    Specs,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Task description
    #[arg(required = true, num_args = 1..)]
    pub task: Vec<String>,

    /// Spec folder name (asked interactively when omitted)
    #[arg(long, short)]
    pub name: Option<String>,
}

/// Main entry point for the CLI; returns the process exit code
pub fn run() -> Result<i32> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return Ok(if e.use_stderr() { 1 } else { 0 });
        }
    };
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("eightx starting");

    let code = match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path.display()));
            let project = Project::init(path)?;
            output.verbose_ctx(
                "init",
                &format!("Config directory: {}", project.config_dir().display()),
            );
            output.success(&format!("Initialized eightx project at {}", project.root().display()));
            0
        }

        Commands::Plan(args) => plan::run(&output, PlanMode::Plan, &args.task, args.name)?,
        Commands::QuickPlan(args) => plan::run(&output, PlanMode::QuickPlan, &args.task, args.name)?,
        Commands::DeepPlan(args) => plan::run(&output, PlanMode::DeepPlan, &args.task, args.name)?,

        Commands::Implement { spec, no_footer } => {
            implement::run(&output, spec.as_deref(), no_footer)?
        }
        Commands::Review { spec } => review::run(&output, spec.as_deref())?,

        Commands::Specs => {
            specs::list(&output)?;
            0
        }
    };

    output.verbose_ctx("exit", &format!("Exit code {}", code));
    Ok(code)
}
