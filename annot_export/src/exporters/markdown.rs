use annot_client::AnnotationRecord;
use anyhow::Result;
use std::path::Path;

use crate::analysis::{category_of, or_none};

pub struct MarkdownExporter;

impl MarkdownExporter {
    pub async fn export(records: &[AnnotationRecord], path: impl AsRef<Path>) -> Result<()> {
        let markdown = Self::format(records);
        tokio::fs::write(path, markdown).await?;
        Ok(())
    }

    pub fn format(records: &[AnnotationRecord]) -> String {
        let rows = records
            .iter()
            .map(|record| {
                format!(
                    "| {} | {} | {} | {} | {} | {} | {} |",
                    record.start_time,
                    record.end_time,
                    category_of(record),
                    record.name,
                    escape_cell(&record.description),
                    or_none(&record.slo),
                    or_none(&record.project),
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"# Annotations

{count} annotations.

| StartTime | EndTime | Category | Name | Description | SLO | Project |
|-----------|---------|----------|------|-------------|-----|---------|
{rows}
"#,
            count = records.len(),
            rows = rows,
        )
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
