//! Interactive questions on stdin
//!
//! Every question reads a single line; an empty answer (or EOF) takes the
//! default shown in brackets.

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Result};

use crate::storage::{validate_spec_name, SpecFolder, SpecStore};

/// Asks `question` and returns the trimmed answer
pub fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> io::Result<String> {
    write!(out, "{}", question)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Lists `folders` and asks for one; returns its index
pub fn pick_spec<R: BufRead, W: Write>(
    folders: &[SpecFolder],
    input: &mut R,
    out: &mut W,
) -> Result<usize> {
    writeln!(out, "\nExisting specs:")?;
    for (i, folder) in folders.iter().enumerate() {
        let suffix = if i == 0 { " (default)" } else { "" };
        writeln!(out, "  [{}] {}{}", i + 1, folder.name, suffix)?;
    }

    let choice = ask(input, out, "\nPick a spec [1]: ")?;
    if choice.is_empty() {
        return Ok(0);
    }

    match choice.parse::<usize>() {
        Ok(n) if (1..=folders.len()).contains(&n) => Ok(n - 1),
        _ => bail!("Invalid choice: {}", choice),
    }
}

/// Resolves the spec to work on: by name when given, otherwise interactively
pub fn select_spec(store: &SpecStore, name: Option<&str>) -> Result<SpecFolder> {
    if let Some(name) = name {
        validate_spec_name(name)?;
        return store
            .get(name)
            .ok_or_else(|| anyhow!("Spec not found: {}", store.dir().join(name).display()));
    }

    let mut folders = store.list()?;
    if folders.is_empty() {
        bail!("No specs found in {}", store.dir().display());
    }

    let stdin = io::stdin();
    let index = pick_spec(&folders, &mut stdin.lock(), &mut io::stdout())?;

    Ok(folders.swap_remove(index))
}
