//! `implement`: run every step of a spec through the agent
//!
//! Steps run strictly one after another and the first failing step stops the
//! run. On a terminal the run is shown with the sticky progress footer;
//! otherwise each step just gets a header line.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::tty::IsTty;

use super::output::Output;
use super::prompt::select_spec;
use crate::domain::{Step, StepState};
use crate::event::{Event, Ticker};
use crate::footer::{render_step_progress, StickyFooter, Terminal};
use crate::runner::{run_agent, AgentProcess, RunnerError};
use crate::storage::Project;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub fn run(output: &Output, spec: Option<&str>, no_footer: bool) -> Result<i32> {
    let project = Project::open_current()?;
    let config = project.config();
    let store = project.specs();

    let folder = select_spec(&store, spec)?;
    output.info(&format!("\nSelected: {}", folder.name));

    let preamble = project.prompts().preamble("implement")?;
    let steps = store.load(&folder)?.steps()?;
    output.info(&format!("Found {} step(s).", steps.len()));

    let command = config.implement_command.as_str();
    let use_footer = config.progress_footer && !no_footer && io::stdout().is_tty();
    output.verbose_ctx(
        "implement",
        &format!("Using command: {} (footer: {})", command, use_footer),
    );

    if steps.is_empty() {
        return Ok(0);
    }

    if use_footer {
        let (tx, rx) = mpsc::channel();
        let mut footer = StickyFooter::stdio(tx.clone());
        run_with_footer(&mut footer, &tx, &rx, command, &steps, &preamble)
    } else {
        run_plain(command, &steps, &preamble)
    }
}

/// Runs the steps with the agent attached to our stdio
fn run_plain(command: &str, steps: &[Step], preamble: &str) -> Result<i32> {
    for (index, step) in steps.iter().enumerate() {
        println!("\n{}: {}", step.label(index, steps.len()), step.title());

        let code = run_agent(command, &step.prompt(preamble))?;
        if code != 0 {
            println!("Step failed with exit code {}. Stopping.", code);
            return Ok(code);
        }
    }

    Ok(0)
}

/// Runs the steps under a sticky progress footer
///
/// Agent output, ticks, resizes and signals all arrive on `rx`; this is the
/// only place the footer is touched while steps run. Returns the exit code of
/// the first failing step, or 0.
pub fn run_with_footer<T: Terminal>(
    footer: &mut StickyFooter<T>,
    tx: &Sender<Event>,
    rx: &Receiver<Event>,
    command: &str,
    steps: &[Step],
    preamble: &str,
) -> Result<i32> {
    let mut states: Vec<StepState> = steps.iter().map(Step::state).collect();
    let line_count = u16::try_from(states.len() + 1).unwrap_or(u16::MAX);

    footer.start(line_count)?;
    redraw(footer, &states);

    for (index, step) in steps.iter().enumerate() {
        footer.write_output(&format!("\n{}: {}\n", step.label(index, steps.len()), step.title()));

        states[index].start();
        redraw(footer, &states);

        let started = Instant::now();
        let process = AgentProcess::spawn(command, &step.prompt(preamble), tx.clone())?;
        let mut ticker = Ticker::start(TICK_INTERVAL, tx.clone());

        let code = loop {
            let event = rx.recv().map_err(|_| RunnerError::Disconnected)?;
            match event {
                Event::Stdout(text) => footer.write_output(&text),
                Event::Stderr(text) => footer.write_error(&text),
                Event::Tick => {
                    states[index].tick(started.elapsed());
                    redraw(footer, &states);
                }
                Event::Resize => {
                    footer.handle_resize();
                    redraw(footer, &states);
                }
                Event::Signal(signal) => return Ok(footer.on_signal(signal)),
                Event::Exited(code) => break code,
            }
        };

        ticker.stop();
        process.join();

        if let Some(signal) = drain_queued(footer, rx) {
            return Ok(footer.on_signal(signal));
        }

        states[index].finish(code == 0, started.elapsed());
        redraw(footer, &states);

        if code != 0 {
            footer.cleanup();
            footer.write_output(&format!("Step failed with exit code {}. Stopping.\n", code));
            return Ok(code);
        }
    }

    footer.cleanup();
    Ok(0)
}

/// Relays events still queued once a step's agent has exited
///
/// Returns the signal that should end the run, if one came in.
fn drain_queued<T: Terminal>(footer: &mut StickyFooter<T>, rx: &Receiver<Event>) -> Option<i32> {
    for event in rx.try_iter() {
        match event {
            Event::Stdout(text) => footer.write_output(&text),
            Event::Stderr(text) => footer.write_error(&text),
            Event::Resize => footer.handle_resize(),
            Event::Signal(signal) => return Some(signal),
            Event::Tick | Event::Exited(_) => {}
        }
    }
    footer.caught_signal()
}

fn redraw<T: Terminal>(footer: &mut StickyFooter<T>, states: &[StepState]) {
    let lines = render_step_progress(states, footer.columns());
    footer.update(lines);
}
