//! Step progress state
//!
//! A [`StepState`] tracks one planned step while `implement` walks through a
//! spec. The footer renders a slice of these on every tick.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Execution status of a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Not started yet
    #[default]
    Pending,
    /// The agent is currently working on it
    Running,
    /// The agent exited successfully
    Done,
    /// The agent exited with a non-zero code
    Failed,
}

/// Display state for a single step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepState {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_title: Option<String>,

    #[serde(default)]
    pub status: StepStatus,

    /// Elapsed or final duration, e.g. `1m23s`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl StepState {
    /// Creates a pending step
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            stage_title: None,
            status: StepStatus::Pending,
            duration: None,
        }
    }

    /// Sets the stage this step belongs to
    pub fn with_stage(mut self, stage_title: Option<String>) -> Self {
        self.stage_title = stage_title;
        self
    }

    /// Marks the step as running and resets its duration
    pub fn start(&mut self) {
        self.status = StepStatus::Running;
        self.duration = Some(format_duration(Duration::ZERO));
    }

    /// Refreshes the elapsed time of a running step
    pub fn tick(&mut self, elapsed: Duration) {
        if self.status == StepStatus::Running {
            self.duration = Some(format_duration(elapsed));
        }
    }

    /// Records the final outcome of the step
    pub fn finish(&mut self, success: bool, elapsed: Duration) {
        self.status = if success {
            StepStatus::Done
        } else {
            StepStatus::Failed
        };
        self.duration = Some(format_duration(elapsed));
    }
}

/// Formats a duration as `45s`, `1m23s` or `2h05m`
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h{:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m{:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
