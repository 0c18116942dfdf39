//! Spec file model
//!
//! A spec file (`spec.json`) holds a `plan` object with either a flat list
//! of `steps` or a list of `stages`, each stage carrying its own `steps` and
//! `acceptance_criteria`. Stage titles are copied onto the items they
//! contain so that callers can work with flat lists.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::step::StepState;

#[derive(Debug, Error)]
pub enum SpecError {
    #[error("spec.json has invalid JSON: {0}")]
    InvalidJson(String),

    #[error("spec.json is missing a plan object")]
    MissingPlan,

    #[error("spec.json plan must include steps or stages")]
    MissingSteps,

    #[error("spec.json plan must include acceptance_criteria or stages")]
    MissingCriteria,

    #[error("spec.json plan acceptance_criteria must be a list of objects")]
    CriteriaNotObjects,

    #[error("spec.json plan stages must be a list of objects")]
    StagesNotObjects,

    #[error("spec.json stage acceptance_criteria must be a list")]
    StageCriteriaNotList,

    #[error("spec.json stage acceptance_criteria must be a list of objects")]
    StageCriteriaNotObjects,

    #[error("spec.json step {index} is malformed: {reason}")]
    InvalidStep { index: usize, reason: String },

    #[error("spec.json acceptance criterion {index} is malformed: {reason}")]
    InvalidCriterion { index: usize, reason: String },
}

/// A single implementation step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_title: Option<String>,

    /// Keys the planner emitted that we don't interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Step {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    /// Builds the agent prompt for this step, prefixed by the preamble
    pub fn prompt(&self, preamble: &str) -> String {
        format!(
            "{preamble}Step Title: {}\nGoal: {}\n\nContext:\n{}\n\nInstructions:\n{}\n\nVerification:\n{}\n",
            self.title(),
            self.goal.as_deref().unwrap_or(""),
            self.context.as_deref().unwrap_or(""),
            self.instructions.as_deref().unwrap_or(""),
            self.verification.as_deref().unwrap_or(""),
        )
    }

    /// Header shown before the step runs, e.g. `Step 2/5 (Backend)`
    pub fn label(&self, index: usize, total: usize) -> String {
        match &self.stage_title {
            Some(stage) => format!("Step {}/{} ({})", index + 1, total, stage),
            None => format!("Step {}/{}", index + 1, total),
        }
    }

    /// Initial footer state for this step
    pub fn state(&self) -> StepState {
        StepState::new(self.title()).with_stage(self.stage_title.clone())
    }
}

/// A single acceptance criterion checked during review
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_title: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A parsed spec file
#[derive(Debug, Clone)]
pub struct SpecDocument {
    plan: Map<String, Value>,
}

impl SpecDocument {
    /// Parses a spec file, requiring a top-level `plan` object
    pub fn parse(raw: &str) -> Result<Self, SpecError> {
        let data: Value =
            serde_json::from_str(raw).map_err(|e| SpecError::InvalidJson(e.to_string()))?;

        match data {
            Value::Object(mut root) => match root.remove("plan") {
                Some(Value::Object(plan)) => Ok(Self { plan }),
                _ => Err(SpecError::MissingPlan),
            },
            _ => Err(SpecError::MissingPlan),
        }
    }

    /// Returns the steps in execution order
    ///
    /// Flat `steps` win over `stages`. Entries that are not objects are
    /// skipped, as are stages without a `steps` list.
    pub fn steps(&self) -> Result<Vec<Step>, SpecError> {
        if let Some(Value::Array(items)) = self.plan.get("steps") {
            return items
                .iter()
                .filter(|item| item.is_object())
                .enumerate()
                .map(|(index, item)| parse_step(index, item, None))
                .collect();
        }

        if let Some(Value::Array(stages)) = self.plan.get("stages") {
            let mut steps = Vec::new();
            for stage in stages.iter().filter_map(Value::as_object) {
                let stage_title = stage_title(stage);
                let Some(Value::Array(items)) = stage.get("steps") else {
                    continue;
                };
                for item in items.iter().filter(|item| item.is_object()) {
                    steps.push(parse_step(steps.len(), item, stage_title)?);
                }
            }
            return Ok(steps);
        }

        Err(SpecError::MissingSteps)
    }

    /// Returns the acceptance criteria, flat or collected from stages
    pub fn acceptance_criteria(&self) -> Result<Vec<Criterion>, SpecError> {
        if let Some(Value::Array(items)) = self.plan.get("acceptance_criteria") {
            return items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    if !item.is_object() {
                        return Err(SpecError::CriteriaNotObjects);
                    }
                    parse_criterion(index, item, None)
                })
                .collect();
        }

        if let Some(Value::Array(stages)) = self.plan.get("stages") {
            let mut criteria = Vec::new();
            for stage in stages {
                let stage = stage.as_object().ok_or(SpecError::StagesNotObjects)?;
                let stage_title = stage_title(stage);
                let Some(Value::Array(items)) = stage.get("acceptance_criteria") else {
                    return Err(SpecError::StageCriteriaNotList);
                };
                for item in items {
                    if !item.is_object() {
                        return Err(SpecError::StageCriteriaNotObjects);
                    }
                    criteria.push(parse_criterion(criteria.len(), item, stage_title)?);
                }
            }
            return Ok(criteria);
        }

        Err(SpecError::MissingCriteria)
    }
}

fn stage_title(stage: &Map<String, Value>) -> Option<&str> {
    stage
        .get("title")
        .and_then(Value::as_str)
        .filter(|title| !title.is_empty())
}

fn parse_step(index: usize, item: &Value, stage_title: Option<&str>) -> Result<Step, SpecError> {
    let mut step: Step = serde_json::from_value(item.clone()).map_err(|e| SpecError::InvalidStep {
        index: index + 1,
        reason: e.to_string(),
    })?;

    if step.stage_title.as_deref().map_or(true, str::is_empty) {
        if let Some(title) = stage_title {
            step.stage_title = Some(title.to_string());
        }
    }

    Ok(step)
}

fn parse_criterion(
    index: usize,
    item: &Value,
    stage_title: Option<&str>,
) -> Result<Criterion, SpecError> {
    let mut criterion: Criterion =
        serde_json::from_value(item.clone()).map_err(|e| SpecError::InvalidCriterion {
            index: index + 1,
            reason: e.to_string(),
        })?;

    if criterion.stage_title.as_deref().map_or(true, str::is_empty) {
        if let Some(title) = stage_title {
            criterion.stage_title = Some(title.to_string());
        }
    }

    Ok(criterion)
}
