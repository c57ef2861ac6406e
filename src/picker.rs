// picker.rs
use crate::error::{DashboardError, Result};
use crate::user_interaction::Prompter;
use regex::Regex;
use std::sync::OnceLock;

fn is_index_token(token: &str) -> bool {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS
        .get_or_init(|| Regex::new(r"^[0-9]+$").unwrap())
        .is_match(token)
}

/// Parses `"1, 3, 3, 2"` style input against a menu of `len` items.
///
/// Returns 0-based indices, deduplicated in first-seen order. Blank input is a
/// valid empty selection; a single bad token rejects the whole line (`None`).
pub fn parse_multi_selection(raw: &str, len: usize) -> Option<Vec<usize>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(Vec::new());
    }

    let mut picked: Vec<usize> = Vec::new();
    for piece in raw.split(',') {
        let index = parse_single_selection(piece, len)?;
        if !picked.contains(&index) {
            picked.push(index);
        }
    }
    Some(picked)
}

/// Parses one 1-based menu number, returning the 0-based index when in range.
pub fn parse_single_selection(raw: &str, len: usize) -> Option<usize> {
    let token = raw.trim();
    if !is_index_token(token) {
        return None;
    }
    match token.parse::<usize>() {
        Ok(i) if i >= 1 && i <= len => Some(i - 1),
        _ => None,
    }
}

/// Shows `fields` as a numbered menu and collects zero or more of them.
///
/// Keeps asking until the line is either blank or entirely valid.
pub fn pick_multi_from<P: Prompter + ?Sized>(
    prompter: &mut P,
    fields: &[String],
    prompt: &str,
) -> Result<Vec<String>> {
    if fields.is_empty() {
        prompter.insight("(no available fields)");
        return Ok(Vec::new());
    }

    let names: Vec<&str> = fields.iter().map(String::as_str).collect();
    prompter.list(&names);

    loop {
        let raw = prompter.read_line(prompt)?;
        match parse_multi_selection(&raw, fields.len()) {
            Some(indices) => return Ok(indices.into_iter().map(|i| fields[i].clone()).collect()),
            None => {
                tracing::debug!("rejected multi-select input {:?}", raw);
                prompter.insight(&format!(
                    "Please enter comma-separated numbers between 1 and {} (or press Enter to skip).",
                    fields.len()
                ));
            }
        }
    }
}

/// Shows `items` as a numbered menu and collects exactly one of them.
pub fn pick_from_numbered_list<P: Prompter + ?Sized>(
    prompter: &mut P,
    items: &[String],
    prompt: &str,
) -> Result<String> {
    if items.is_empty() {
        return Err(DashboardError::NoChoices(prompt.trim().to_string()));
    }

    let names: Vec<&str> = items.iter().map(String::as_str).collect();
    prompter.list(&names);

    loop {
        let raw = prompter.read_line(prompt)?;
        if let Some(index) = parse_single_selection(&raw, items.len()) {
            return Ok(items[index].clone());
        }
        prompter.insight(&format!(
            "Please enter a number between 1 and {}.",
            items.len()
        ));
    }
}
