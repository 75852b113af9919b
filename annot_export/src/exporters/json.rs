use annot_client::AnnotationRecord;
use anyhow::Result;
use std::path::Path;

/// Full-detail export; unknown wire fields ride along untouched.
pub struct JsonExporter;

impl JsonExporter {
    pub async fn export(records: &[AnnotationRecord], path: impl AsRef<Path>) -> Result<()> {
        let json = Self::to_string(records)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn to_string(records: &[AnnotationRecord]) -> Result<String> {
        Ok(serde_json::to_string_pretty(records)?)
    }
}
