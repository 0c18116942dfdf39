//! Step progress renderer
//!
//! Turns the step states of an `implement` run into the lines shown in the
//! footer: a separator followed by one line per step.

use crossterm::style::{style, Stylize};

use crate::domain::{StepState, StepStatus};

const ICON_DONE: &str = "✔";
const ICON_RUNNING: &str = "▸";
const ICON_PENDING: &str = "○";
const ICON_FAILED: &str = "✘";

const SEPARATOR: &str = "─";
const ELLIPSIS: char = '…';

const MIN_TITLE_WIDTH: usize = 20;
const TITLE_MARGIN: usize = 10;

/// Widest title (in characters) shown for a terminal of `columns` columns
pub fn title_width(columns: u16) -> usize {
    usize::from(columns)
        .saturating_sub(TITLE_MARGIN)
        .max(MIN_TITLE_WIDTH)
}

/// Truncates to `max` characters, replacing the last kept one with `…`
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let mut truncated: String = text.chars().take(max.saturating_sub(1)).collect();
    truncated.push(ELLIPSIS);
    truncated
}

/// Renders the footer lines for `steps` at the given terminal width
///
/// Always returns `steps.len() + 1` lines. Styling never counts towards the
/// title width.
pub fn render_step_progress(steps: &[StepState], columns: u16) -> Vec<String> {
    let mut lines = Vec::with_capacity(steps.len() + 1);
    lines.push(style(SEPARATOR.repeat(usize::from(columns))).dim().to_string());

    let max_title = title_width(columns);

    for step in steps {
        let title = truncate(&step.title, max_title);

        let (icon, title) = match step.status {
            StepStatus::Done => (style(ICON_DONE).green().to_string(), title),
            StepStatus::Running => (
                style(ICON_RUNNING).cyan().to_string(),
                style(title).bold().to_string(),
            ),
            StepStatus::Failed => (
                style(ICON_FAILED).red().to_string(),
                style(title).red().to_string(),
            ),
            StepStatus::Pending => (
                style(ICON_PENDING).dim().to_string(),
                style(title).dim().to_string(),
            ),
        };

        let prefix = match &step.stage_title {
            Some(stage) => format!("  {} {} ", icon, style(format!("[{}]", stage)).dim()),
            None => format!("  {} ", icon),
        };

        let suffix = match (&step.duration, step.status) {
            (Some(duration), status) if status != StepStatus::Pending => {
                style(format!(" ({})", duration)).dim().to_string()
            }
            _ => String::new(),
        };

        lines.push(format!("{}{}{}", prefix, title, suffix));
    }

    lines
}
