//! # Agent command runner
//!
//! The agent is whatever command the config names (`opencode run`,
//! `claude -p`, a script...). It is invoked through the shell as
//! `COMMAND '<prompt>'`, with the prompt passed as one quoted argument.
//! Success or failure is carried by the exit code alone.
//!
//! Two flavours exist:
//! - [`run_agent`] blocks with the agent attached to our stdio
//! - [`AgentProcess::spawn`] pipes the agent's output into an [`Event`]
//!   channel so the caller can interleave it with footer redraws;
//!   [`run_agent_streaming`] wraps it with plain callbacks

mod process;

use std::io;
use std::process::{Command, ExitStatus};
use std::sync::mpsc;

use thiserror::Error;

use crate::event::Event;

pub use process::AgentProcess;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to run command: {0}")]
    Launch(io::Error),

    #[error("Prompt cannot be passed through the shell: {0}")]
    Quote(String),

    #[error("Agent output ended without an exit status")]
    Disconnected,
}

/// Builds `sh -c "<command> <quoted prompt>"`
pub fn shell_command(command: &str, prompt: &str) -> Result<Command, RunnerError> {
    let quoted = shlex::try_quote(prompt).map_err(|e| RunnerError::Quote(e.to_string()))?;

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(format!("{} {}", command, quoted));
    Ok(cmd)
}

/// Exit code of a finished agent; death by signal counts as 1
pub fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

/// Runs the agent to completion with inherited stdio
pub fn run_agent(command: &str, prompt: &str) -> Result<i32, RunnerError> {
    let status = shell_command(command, prompt)?
        .status()
        .map_err(RunnerError::Launch)?;

    Ok(exit_code(status))
}

/// Runs the agent to completion, handing output chunks to callbacks as
/// they arrive
pub fn run_agent_streaming(
    command: &str,
    prompt: &str,
    mut on_stdout: impl FnMut(&str),
    mut on_stderr: impl FnMut(&str),
) -> Result<i32, RunnerError> {
    let (tx, rx) = mpsc::channel();
    let process = AgentProcess::spawn(command, prompt, tx)?;

    for event in rx {
        match event {
            Event::Stdout(text) => on_stdout(&text),
            Event::Stderr(text) => on_stderr(&text),
            Event::Exited(code) => {
                process.join();
                return Ok(code);
            }
            _ => {}
        }
    }

    Err(RunnerError::Disconnected)
}
