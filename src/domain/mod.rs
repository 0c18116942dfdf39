//! Domain models for eightx
//!
//! Contains the spec-file model and step progress state without any I/O
//! concerns.

mod spec;
mod step;

pub use spec::{Criterion, SpecDocument, SpecError, Step};
pub use step::{format_duration, StepState, StepStatus};
