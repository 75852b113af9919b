use annot_client::AnnotationRecord;
use anyhow::Result;
use std::path::Path;

use crate::analysis::{category_of, or_none};

pub struct CsvExporter;

impl CsvExporter {
    pub async fn export(records: &[AnnotationRecord], path: impl AsRef<Path>) -> Result<()> {
        let data = Self::to_string(records)?;
        tokio::fs::write(path, data).await?;
        Ok(())
    }

    pub fn to_string(records: &[AnnotationRecord]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "StartTime",
            "EndTime",
            "Category",
            "Name",
            "Description",
            "SLO",
            "Project",
        ])?;

        for record in records {
            writer.write_record([
                record.start_time.as_str(),
                record.end_time.as_str(),
                category_of(record),
                record.name.as_str(),
                record.description.as_str(),
                or_none(&record.slo),
                or_none(&record.project),
            ])?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("flushing CSV buffer: {e}"))?;
        Ok(String::from_utf8(bytes)?)
    }
}
