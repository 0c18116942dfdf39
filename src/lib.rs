//! eightx - drive a coding agent through plan, implement and review
//!
//! A task is planned into a spec folder (`specs/<name>/spec.json`), its steps
//! are handed to the agent one at a time, and the result is reviewed against
//! the spec's acceptance criteria. While steps run, a sticky footer at the
//! bottom of the terminal shows their progress.

pub mod cli;
pub mod domain;
pub mod event;
pub mod footer;
pub mod runner;
pub mod storage;

pub use domain::{SpecDocument, Step, StepState, StepStatus};
pub use footer::{render_step_progress, StickyFooter};
