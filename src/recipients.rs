//! Builds the recipient list for a job from inline lists and JSON files.

use crate::core::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]*\.[^@\s]*$").expect("Recipient address pattern failed to compile. This is a bug.")
});

/// Shape of a recipient list file: `{"emails": ["a@example.com", ...]}`.
#[derive(Deserialize, Debug)]
struct RecipientsFile {
    #[serde(default)]
    emails: Vec<String>,
}

/// Loose syntax check; the transport does the strict parse.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

/// Splits a comma-separated list, keeping only plausible addresses.
pub fn parse_inline(list: &str) -> Vec<String> {
    clean(list.split(','))
}

/// Reads a recipient list file. A file without a single usable address is an error.
pub fn load_file(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path).map_err(|e| AppError::RecipientFile {
        path: path.to_path_buf(),
        reason: format!("cannot read file: {}", e),
    })?;
    let parsed: RecipientsFile =
        serde_json::from_str(&raw).map_err(|e| AppError::RecipientFile {
            path: path.to_path_buf(),
            reason: format!("invalid JSON: {}", e),
        })?;

    let emails = clean(parsed.emails.iter().map(String::as_str));
    if emails.is_empty() {
        return Err(AppError::RecipientFile {
            path: path.to_path_buf(),
            reason: "no valid email addresses".to_string(),
        });
    }
    tracing::debug!("Loaded {} recipients from {}", emails.len(), path.display());
    Ok(emails)
}

/// Combines the inline list and the file list, inline first, without duplicates.
pub fn resolve(inline: Option<&str>, file: Option<&Path>) -> Result<Vec<String>> {
    let inline = inline.filter(|s| !s.trim().is_empty());
    if inline.is_none() && file.is_none() {
        return Err(AppError::NoRecipients(
            "specify recipients with --to or --to-file".to_string(),
        ));
    }

    let mut recipients = inline.map(parse_inline).unwrap_or_default();
    if let Some(path) = file {
        recipients.extend(load_file(path)?);
    }

    let recipients = dedupe(recipients);
    if recipients.is_empty() {
        return Err(AppError::NoRecipients(
            "none of the supplied addresses are valid".to_string(),
        ));
    }
    Ok(recipients)
}

/// Filters and deduplicates a submitted list.
pub fn normalize(list: &[String]) -> Result<Vec<String>> {
    let recipients = clean(list.iter().map(String::as_str));
    if recipients.is_empty() {
        return Err(AppError::NoRecipients(
            "at least one valid recipient is required".to_string(),
        ));
    }
    Ok(recipients)
}

fn clean<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let emails = raw
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .filter(|e| {
            let valid = is_valid_email(e);
            if !valid {
                tracing::warn!("Skipping invalid recipient address '{}'", e);
            }
            valid
        })
        .map(str::to_string)
        .collect();
    dedupe(emails)
}

fn dedupe(emails: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    emails.into_iter().filter(|e| seen.insert(e.clone())).collect()
}
