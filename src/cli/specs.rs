//! `specs`: list spec folders

use anyhow::Result;
use chrono::{DateTime, Local};
use serde::Serialize;

use super::output::Output;
use crate::storage::{Project, SpecFolder, SpecStore};

/// One row of the listing
#[derive(Debug, Serialize)]
pub struct SpecSummary {
    pub name: String,
    pub path: String,
    pub modified: DateTime<Local>,
    /// `None` when the spec file is missing or unreadable
    pub steps: Option<usize>,
    pub criteria: Option<usize>,
}

impl SpecSummary {
    fn read(store: &SpecStore, folder: &SpecFolder, project: &Project) -> Self {
        let doc = store.load(folder).ok();

        Self {
            name: folder.name.clone(),
            path: project.relative_path(&folder.path).display().to_string(),
            modified: folder.modified,
            steps: doc.as_ref().and_then(|d| d.steps().ok()).map(|s| s.len()),
            criteria: doc
                .as_ref()
                .and_then(|d| d.acceptance_criteria().ok())
                .map(|c| c.len()),
        }
    }
}

pub fn list(output: &Output) -> Result<()> {
    let project = Project::open_current()?;
    let store = project.specs();
    output.verbose_ctx("specs", &format!("Listing {}", store.dir().display()));

    let summaries: Vec<SpecSummary> = store
        .list()?
        .iter()
        .map(|folder| SpecSummary::read(&store, folder, &project))
        .collect();

    if output.is_json() {
        output.data(&summaries);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No specs found in {}", project.relative_path(store.dir()).display());
        return Ok(());
    }

    println!("{:<40} {:<17} {:>5} {:>8}", "NAME", "MODIFIED", "STEPS", "CRITERIA");
    println!("{}", "-".repeat(73));
    for summary in &summaries {
        println!(
            "{:<40} {:<17} {:>5} {:>8}",
            summary.name,
            summary.modified.format("%Y-%m-%d %H:%M").to_string(),
            count(summary.steps),
            count(summary.criteria),
        );
    }

    Ok(())
}

fn count(n: Option<usize>) -> String {
    n.map_or_else(|| "-".to_string(), |n| n.to_string())
}
