//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Errors should tell users what went
//! wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Configuration file not found: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::config_not_found(path));
//! ```

use std::path::Path;

/// Generate an error for when an explicitly requested configuration file
/// does not exist.
pub fn config_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Configuration file not found: {path}\n\n\
         hint: Omit --config to run with built-in defaults\n\
         hint: Create a .modularize.yaml file in the work directory",
        path = path.display()
    )
}

/// Generate an error for a target that found nothing to extract.
pub fn nothing_to_extract(tag: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "No files were ever committed for ingest '{tag}'\n\n\
         hint: Check the spelling of the tag against src/monarch_ingest/ingests/\n\
         hint: Run 'ingest-modularize find-files {tag}' to inspect the history"
    )
}

/// Generate an error for a source tool pointed at a directory without
/// any Python files.
pub fn no_python_files(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "No Python files found under {path}\n\n\
         hint: Pass a .py file or a directory containing Koza transforms",
        path = path.display()
    )
}

/// Build a "did you mean" hint for an unknown key, if a candidate is close.
pub fn did_you_mean(input: &str, candidates: &[&str]) -> Option<String> {
    find_similar(input, candidates).map(|s| format!("Did you mean '{s}'?"))
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Two rolling rows are enough for the distance.
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0usize; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}
