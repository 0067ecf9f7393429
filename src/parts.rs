//! Part-number extraction and the CSV part list bridging the two stages.
//!
//! A part number is a run of digits, exactly one uppercase letter, and
//! another run of digits (e.g. `95462A029`), bounded by word boundaries.
//! Matches are kept in order of appearance, duplicates included — the part
//! list is a faithful transcript of the input, not a set.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use thiserror::Error;

/// Header of the part-list CSV, shared by the writer and the reader.
pub const PART_LIST_HEADER: &str = "Part Number";

/// Errors specific to reading a part list.
#[derive(Debug, Error)]
pub enum PartListError {
    #[error("part list is empty: {0}")]
    Empty(String),
    #[error("part list has unexpected header {found:?} (expected {expected:?})")]
    BadHeader { found: String, expected: String },
}

/// Compiled matcher for the digits-letter-digits identifier shape.
pub fn part_number_pattern() -> Regex {
    Regex::new(r"\b\d+[A-Z]\d+\b").expect("part number regex is valid")
}

/// Extract all part numbers from a text blob, in order, duplicates kept.
pub fn extract_part_numbers(content: &str) -> Vec<String> {
    let re = part_number_pattern();
    re.find_iter(content).map(|m| m.as_str().to_string()).collect()
}

/// Read an input text file and extract its part numbers.
///
/// A missing or unreadable input file is fatal; no partial output is
/// produced downstream.
pub fn extract_from_file(input: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read input file: {}", input.display()))?;
    Ok(extract_part_numbers(&content))
}

/// Write the part list as a single-column CSV with a `Part Number` header.
///
/// Rows are newline-terminated UTF-8. Part numbers never contain commas or
/// quotes (the pattern admits only `[0-9A-Z]`), so no field escaping is
/// needed.
pub fn write_part_list(path: &Path, parts: &[String]) -> Result<()> {
    let mut out = String::with_capacity(PART_LIST_HEADER.len() + parts.len() * 10);
    out.push_str(PART_LIST_HEADER);
    out.push('\n');
    for part in parts {
        out.push_str(part);
        out.push('\n');
    }
    std::fs::write(path, out)
        .with_context(|| format!("failed to write part list: {}", path.display()))?;
    Ok(())
}

/// Read a part list CSV back: header row skipped, first column taken,
/// blank rows ignored. Order and duplicates are preserved.
pub fn read_part_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read part list: {}", path.display()))?;

    let mut lines = content.lines();
    let header = lines
        .next()
        .ok_or_else(|| PartListError::Empty(path.display().to_string()))?
        .trim();
    if header != PART_LIST_HEADER {
        return Err(PartListError::BadHeader {
            found: header.to_string(),
            expected: PART_LIST_HEADER.to_string(),
        }
        .into());
    }

    Ok(lines
        .filter_map(|line| {
            let first = line.split(',').next().unwrap_or("").trim();
            if first.is_empty() {
                None
            } else {
                Some(first.to_string())
            }
        })
        .collect())
}
