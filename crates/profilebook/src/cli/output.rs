//! Text output for CLI commands.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use super::OutputFormat;
use crate::error::Result;
use crate::profile::{Profile, ProfileField};
use crate::search::{extract_city, SearchOutcome};

/// Shown in table cells with no value.
const BLANK_CELL: &str = "-";

const LIST_HEADERS: [&str; 7] = ["Regn No", "Name", "Gender", "DOB", "City", "Contact", "ID"];

fn list_row(profile: &Profile) -> [String; 7] {
    let cell = |value: &str| {
        let value = value.trim();
        if value.is_empty() {
            BLANK_CELL.to_string()
        } else {
            value.to_string()
        }
    };

    [
        cell(profile.regn_number()),
        cell(profile.full_name()),
        cell(profile.get(ProfileField::Gender)),
        cell(profile.get(ProfileField::Dob)),
        cell(extract_city(profile.get(ProfileField::Address)).unwrap_or_default()),
        cell(profile.get(ProfileField::ContactNo)),
        profile.id.clone(),
    ]
}

fn width(text: &str) -> usize {
    text.chars().count()
}

fn pad(text: &str, to: usize) -> String {
    let mut out = text.to_string();
    out.extend(std::iter::repeat(' ').take(to.saturating_sub(width(text))));
    out
}

/// Format a search outcome as a table with a summary line.
#[must_use]
pub fn format_table(outcome: &SearchOutcome<'_>) -> String {
    if let Some(message) = outcome.empty_message() {
        return format!("{message}\n");
    }

    let rows: Vec<[String; 7]> = outcome.matches.iter().map(|p| list_row(p)).collect();
    let mut widths = LIST_HEADERS.map(width);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(width(cell));
        }
    }

    let line = |cells: &[String]| {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| pad(cell, w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    let headers = LIST_HEADERS.map(str::to_string);
    let _ = writeln!(out, "{}", line(&headers[..]));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
    for row in &rows {
        let _ = writeln!(out, "{}", line(&row[..]));
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", outcome.summary());
    out
}

/// Format a search outcome as one line per profile.
#[must_use]
pub fn format_plain(outcome: &SearchOutcome<'_>) -> String {
    if let Some(message) = outcome.empty_message() {
        return format!("{message}\n");
    }

    let mut out = String::new();
    for profile in &outcome.matches {
        let [regn, name, .., id] = list_row(profile);
        let _ = writeln!(out, "{regn}\t{name}\t{id}");
    }
    out
}

/// Format a search outcome in the requested format.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_list(outcome: &SearchOutcome<'_>, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Plain => format_plain(outcome),
        OutputFormat::Table => format_table(outcome),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&outcome.matches)?;
            json.push('\n');
            json
        }
    })
}

fn format_millis(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis).map_or_else(
        || millis.to_string(),
        |dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

/// Format every field of one profile for reading.
#[must_use]
pub fn format_profile(profile: &Profile) -> String {
    let label_width = ProfileField::ALL
        .iter()
        .map(|f| width(f.label()))
        .max()
        .unwrap_or_default();

    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", profile.full_name(), profile.id);
    let _ = writeln!(out);
    for field in ProfileField::ALL {
        let value = profile.get(field);
        let mut lines = value.lines();
        let first = lines.next().unwrap_or(BLANK_CELL);
        let _ = writeln!(out, "{}  {first}", pad(field.label(), label_width));
        for line in lines {
            let _ = writeln!(out, "{}  {line}", pad("", label_width));
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Created: {}", format_millis(profile.created_at));
    let _ = writeln!(out, "Updated: {}", format_millis(profile.updated_at));
    out
}

/// Describe the field enumeration: key, label, required flag, input kind, hint.
#[must_use]
pub fn format_fields() -> String {
    let key_width = ProfileField::ALL.iter().map(|f| f.key().len()).max().unwrap_or_default();
    let label_width = ProfileField::ALL
        .iter()
        .map(|f| width(f.label()))
        .max()
        .unwrap_or_default();

    let mut out = String::new();
    for field in ProfileField::ALL {
        let required = if field.required() { "required" } else { "optional" };
        let _ = write!(
            out,
            "{}  {}  {required}  {}",
            pad(field.key(), key_width),
            pad(field.label(), label_width),
            field.kind()
        );
        if let Some(hint) = field.hint() {
            let _ = write!(out, "  {hint}");
        }
        out.push('\n');
    }
    out
}
