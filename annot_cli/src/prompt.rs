use std::io::{self, Write};

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use colored::Colorize;

use crate::ui;

/// Reads one trimmed line from stdin.
pub fn read_line(prompt: &str) -> Result<String> {
    print!("{} ", prompt.cyan());
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().read_line(&mut line)? == 0 {
        bail!("input closed");
    }
    Ok(line.trim().to_string())
}

/// Re-prompts until the operator provides a non-empty value.
pub fn read_nonempty(prompt: &str, field: &str) -> Result<String> {
    loop {
        let value = read_line(prompt)?;
        if value.is_empty() {
            ui::print_warning(&format!("{field} cannot be empty."));
        } else {
            return Ok(value);
        }
    }
}

/// Reads an optional value; empty input means skip.
pub fn read_optional(prompt: &str) -> Result<Option<String>> {
    let value = read_line(prompt)?;
    Ok(if value.is_empty() { None } else { Some(value) })
}

/// Prompts for a 1-based menu choice until it lands in range; returns the
/// 0-based index.
pub fn select_index(prompt: &str, len: usize) -> Result<usize> {
    loop {
        let raw = read_line(prompt)?;
        match raw.parse::<usize>() {
            Ok(choice) if (1..=len).contains(&choice) => return Ok(choice - 1),
            _ => ui::print_error(&format!("Please enter a number between 1 and {len}.")),
        }
    }
}

/// Parses a comma-separated ordinal selection ("1,3,5"); `0` selects all.
///
/// Returns 0-based indices in input order, duplicates and out-of-range
/// entries dropped; `None` when nothing usable was entered.
pub fn parse_selection(input: &str, len: usize) -> Option<Vec<usize>> {
    let mut picked = Vec::new();
    for token in input.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let Ok(value) = token.parse::<usize>() else {
            return None;
        };
        if value == 0 {
            return Some((0..len).collect());
        }
        let index = value - 1;
        if index < len && !picked.contains(&index) {
            picked.push(index);
        }
    }

    if picked.is_empty() {
        None
    } else {
        Some(picked)
    }
}

/// Accepts RFC3339 with `Z` or an explicit offset; a timestamp without a
/// zone is taken as UTC. Embedded whitespace is stripped first, and a double
/// colon is rejected locally — the API answers it with an opaque 400.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        bail!("timestamp is empty");
    }
    if cleaned.contains("::") {
        bail!("double colon in timestamp; use single colons (e.g. 2025-01-27T10:00:00Z)");
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(&cleaned) {
        return Ok(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(&cleaned, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    bail!("invalid timestamp '{cleaned}'; use the form 2025-01-27T10:00:00Z")
}

/// Re-prompts until a timestamp parses.
pub fn read_timestamp(prompt: &str) -> Result<DateTime<Utc>> {
    loop {
        let raw = read_line(prompt)?;
        match parse_timestamp(&raw) {
            Ok(timestamp) => return Ok(timestamp),
            Err(e) => ui::print_warning(&e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_accepts_comma_separated_ordinals() {
        assert_eq!(parse_selection("1,3,5", 6), Some(vec![0, 2, 4]));
        assert_eq!(parse_selection(" 2 , 1 ", 3), Some(vec![1, 0]));
    }

    #[test]
    fn selection_zero_means_all() {
        assert_eq!(parse_selection("0", 3), Some(vec![0, 1, 2]));
        assert_eq!(parse_selection("2,0,5", 3), Some(vec![0, 1, 2]));
    }

    #[test]
    fn selection_drops_duplicates_and_out_of_range_entries() {
        assert_eq!(parse_selection("1,1,9", 3), Some(vec![0]));
    }

    #[test]
    fn selection_rejects_garbage() {
        assert_eq!(parse_selection("one,two", 3), None);
        assert_eq!(parse_selection("", 3), None);
        assert_eq!(parse_selection("9", 3), None);
    }

    #[test]
    fn timestamp_accepts_z_suffix() {
        let parsed = parse_timestamp("2025-01-27T10:00:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 27, 10, 0, 0).unwrap());
    }

    #[test]
    fn timestamp_accepts_explicit_offsets() {
        let parsed = parse_timestamp("2025-01-27T10:00:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 27, 8, 0, 0).unwrap());
    }

    #[test]
    fn timestamp_without_zone_is_taken_as_utc() {
        let parsed = parse_timestamp("2025-01-27T10:00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 27, 10, 0, 0).unwrap());
    }

    #[test]
    fn timestamp_strips_embedded_whitespace() {
        let parsed = parse_timestamp(" 2025-01-27T 10:00:00Z ").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 27, 10, 0, 0).unwrap());
    }

    #[test]
    fn timestamp_rejects_double_colons_and_garbage() {
        assert!(parse_timestamp("2025-01-27T10::00:00Z").is_err());
        assert!(parse_timestamp("tomorrow").is_err());
        assert!(parse_timestamp("").is_err());
    }
}
