//! `review`: check the work against the spec's acceptance criteria

use anyhow::{Context, Result};

use super::output::Output;
use super::prompt::select_spec;
use crate::domain::Criterion;
use crate::runner::run_agent;
use crate::storage::Project;

pub fn run(output: &Output, spec: Option<&str>) -> Result<i32> {
    let project = Project::open_current()?;
    let store = project.specs();

    let folder = select_spec(&store, spec)?;
    output.info(&format!("\nSelected: {}", folder.name));

    let preamble = project.prompts().preamble("review")?;
    let criteria = store.load(&folder)?.acceptance_criteria()?;
    output.info(&format!("Found {} acceptance criteria.", criteria.len()));

    let command = &project.config().review_command;
    output.verbose_ctx("review", &format!("Using command: {}", command));

    let code = run_agent(command, &review_prompt(&preamble, &criteria)?)?;
    if code != 0 {
        println!("Review failed with exit code {}. Stopping.", code);
    }

    Ok(code)
}

/// Preamble followed by the criteria as pretty-printed JSON
pub fn review_prompt(preamble: &str, criteria: &[Criterion]) -> Result<String> {
    let json = serde_json::to_string_pretty(criteria).context("Failed to serialize criteria")?;
    Ok(format!("{}Acceptance Criteria:\n{}", preamble, json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn prompt_carries_criteria_json() {
        let mut criterion = Criterion {
            title: Some("Login works".to_string()),
            requirement: Some("Valid credentials sign in".to_string()),
            stage_title: Some("Backend".to_string()),
            ..Criterion::default()
        };
        criterion.extra.insert("priority".to_string(), Value::from("high"));

        let prompt = review_prompt("Review it.\n\n", &[criterion]).unwrap();

        assert!(prompt.starts_with("Review it.\n\nAcceptance Criteria:\n[\n  {\n"));
        assert!(prompt.contains("    \"title\": \"Login works\""));
        assert!(prompt.contains("    \"stage_title\": \"Backend\""));
        assert!(prompt.contains("    \"priority\": \"high\""));
    }

    #[test]
    fn no_criteria_is_an_empty_list() {
        let prompt = review_prompt("", &[]).unwrap();
        assert_eq!(prompt, "Acceptance Criteria:\n[]");
    }
}
