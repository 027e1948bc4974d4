//! Label loading
//!
//! Teachable Machine exports `labels.txt` as `"<index> <name>"` lines;
//! plain one-name-per-line files work too.

use std::fs;

use super::engine::InferenceError;

pub fn load_labels_file(path: &str) -> Result<Vec<String>, InferenceError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| InferenceError::Labels(format!("{}: {}", path, e)))?;

    let labels = parse_labels(&raw);
    if labels.is_empty() {
        return Err(InferenceError::Labels(format!("{}: no labels found", path)));
    }

    Ok(labels)
}

pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(strip_index)
        .collect()
}

fn strip_index(line: &str) -> String {
    match line.split_once(char::is_whitespace) {
        Some((idx, rest)) if idx.parse::<usize>().is_ok() && !rest.trim().is_empty() => {
            rest.trim().to_string()
        }
        _ => line.to_string(),
    }
}
