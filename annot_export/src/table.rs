use annot_client::AnnotationRecord;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::analysis::{category_of, or_none};

#[derive(Tabled)]
struct AnnotationRow {
    #[tabled(rename = "Time")]
    time: String,

    #[tabled(rename = "Category")]
    category: String,

    #[tabled(rename = "Description")]
    description: String,

    #[tabled(rename = "SLO")]
    slo: String,

    #[tabled(rename = "Project")]
    project: String,
}

const DESCRIPTION_LIMIT: usize = 50;

/// Compact terminal table of retrieved annotations.
pub fn render(records: &[AnnotationRecord]) -> String {
    let rows: Vec<AnnotationRow> = records
        .iter()
        .map(|record| AnnotationRow {
            time: format_timestamp(&record.start_time),
            category: category_of(record).to_string(),
            description: truncate(&record.description, DESCRIPTION_LIMIT),
            slo: or_none(&record.slo).to_string(),
            project: or_none(&record.project).to_string(),
        })
        .collect();

    Table::new(rows).with(Style::sharp()).to_string()
}

/// `%m/%d/%y %H:%M`, falling back to the raw value when it does not parse.
pub fn format_timestamp(raw: &str) -> String {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%SZ")
        .map(|timestamp| timestamp.format("%m/%d/%y %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let cut: String = text.chars().take(limit).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_timestamps_for_display() {
        assert_eq!(format_timestamp("2025-01-27T10:30:00Z"), "01/27/25 10:30");
        assert_eq!(format_timestamp("not-a-time"), "not-a-time");
    }

    #[test]
    fn truncates_long_descriptions() {
        let long = "x".repeat(80);
        let truncated = truncate(&long, DESCRIPTION_LIMIT);
        assert_eq!(truncated.chars().count(), DESCRIPTION_LIMIT + 3);
        assert!(truncated.ends_with("..."));

        assert_eq!(truncate("short", DESCRIPTION_LIMIT), "short");
    }

    #[test]
    fn renders_headers_and_values() {
        let records = vec![AnnotationRecord {
            description: "deploy".to_string(),
            category: "user".to_string(),
            slo: "latency".to_string(),
            project: "payments".to_string(),
            start_time: "2025-01-27T10:00:00Z".to_string(),
            ..AnnotationRecord::default()
        }];

        let table = render(&records);
        assert!(table.contains("Category"));
        assert!(table.contains("latency"));
        assert!(table.contains("01/27/25 10:00"));
    }
}
