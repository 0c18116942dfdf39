//! `plan`, `quick-plan` and `deep-plan`
//!
//! The planning agent is asked to write `spec.json` into a fresh spec
//! folder. Afterwards the file is checked; while it doesn't parse, the same
//! agent is asked to repair it, up to `fix_attempts` times in total.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Instant;

use anyhow::{anyhow, bail, Result};

use super::output::Output;
use super::prompt::ask;
use crate::domain::format_duration;
use crate::runner::run_agent;
use crate::storage::{
    check_spec_file, slugify, validate_spec_name, PlanMode, Project, SpecCheck, SPEC_FILE_NAME,
};

pub fn run(output: &Output, mode: PlanMode, task: &[String], name: Option<String>) -> Result<i32> {
    let task = task.join(" ").trim().to_string();
    if task.is_empty() {
        bail!("Usage: eightx {} <task description>", mode.as_str());
    }

    let project = Project::open_current()?;
    let config = project.config();
    let command = config.plan_command_for(mode);
    output.verbose_ctx(mode.as_str(), &format!("Using command: {}", command));

    let store = project.specs();
    let specs_dir = project.relative_path(store.dir()).to_path_buf();
    let name = match name {
        Some(name) => name,
        None => {
            let stdin = io::stdin();
            ask_spec_name(&task, &specs_dir, &mut stdin.lock(), &mut io::stdout())?
        }
    };
    validate_spec_name(&name)?;

    let system_prompt = project.prompts().load(mode.as_str())?;
    let spec_dir = store.create(&name)?;
    let output_path = project.relative_path(&spec_dir).join(SPEC_FILE_NAME);

    output.info(&format!("\nPlanning ({})...", mode.as_str()));
    output.info(&format!("Output: {}\n", output_path.display()));

    let started = Instant::now();
    let prompt = format!("{}\n\n{}", system_prompt, task_message(&task, &output_path));
    let code = run_agent(command, &prompt)?;
    output.verbose_ctx(mode.as_str(), &format!("Planner exited with code {}", code));

    let spec_file = spec_dir.join(SPEC_FILE_NAME);
    validate_spec(output, command, &spec_file, &output_path, config.fix_attempts)?;

    output.info("");
    output.success(&format!(
        "{} completed in {}",
        mode.as_str(),
        format_duration(started.elapsed())
    ));
    Ok(0)
}

/// Asks for the spec folder name, defaulting to a slug of the task
pub fn ask_spec_name<R: BufRead, W: Write>(
    task: &str,
    specs_dir: &Path,
    input: &mut R,
    out: &mut W,
) -> io::Result<String> {
    let slug = slugify(task);
    let question = format!("\nSpec folder name [{}]: ", specs_dir.join(&slug).display());
    let answer = ask(input, out, &question)?;

    Ok(if answer.is_empty() { slug } else { answer })
}

/// User message handed to the planner after its system prompt
pub fn task_message(task: &str, output_path: &Path) -> String {
    format!(
        "Task: {}\n\nExplore the codebase, then produce the plan.\nSave the JSON output to: {}",
        task,
        output_path.display()
    )
}

/// Prompt asking the planner to repair a spec file that doesn't parse
pub fn fix_message(output_path: &Path, error: &str) -> String {
    format!(
        "The file at {path} contains invalid JSON.\nError: {error}\n\n\
         Read the file, fix ONLY the JSON syntax error, and save it back to {path}. \
         Do not change the content, only fix the formatting to make it valid JSON.",
        path = output_path.display(),
        error = error,
    )
}

/// Checks the spec file, running the fix prompt between failed attempts
fn validate_spec(
    output: &Output,
    command: &str,
    spec_file: &Path,
    shown_path: &Path,
    attempts: u32,
) -> Result<()> {
    for attempt in 1..=attempts {
        let error = match check_spec_file(spec_file) {
            SpecCheck::Valid => {
                output.info("spec.json is valid.");
                return Ok(());
            }
            SpecCheck::Missing => {
                return Err(anyhow!("spec.json was not created at {}", shown_path.display()));
            }
            SpecCheck::Invalid(error) => error,
        };

        output.info(&format!("\n{} (attempt {}/{})", error, attempt, attempts));
        if attempt == attempts {
            break;
        }

        output.info("Attempting auto-fix...\n");
        let code = run_agent(command, &fix_message(shown_path, &error.to_string()))?;
        output.verbose_ctx("plan", &format!("Fix attempt {} exited with code {}", attempt, code));
    }

    bail!(
        "spec.json is still invalid after {} attempt(s); fix the JSON manually",
        attempts
    )
}
