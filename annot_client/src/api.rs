use std::time::Duration;

use annot_core::{Annotation, AnnotationError, AnnotationSink, SubmitOutcome};
use anyhow::{bail, Context as _, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Wire shape of an annotation returned by the listing endpoint. Unknown
/// fields ride along in `extra` so a full-detail JSON export loses nothing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub project: String,

    #[serde(default)]
    pub slo: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub start_time: String,

    #[serde(default)]
    pub end_time: String,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Authenticated client for the annotations API.
pub struct AnnotationsClient {
    http: reqwest::Client,
    base_url: String,
    organization: String,
    token: String,
}

impl AnnotationsClient {
    pub fn new(
        base_url: impl Into<String>,
        organization: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            organization: organization.into(),
            token: token.into(),
        })
    }

    fn annotations_url(&self) -> String {
        format!("{}/api/annotations", self.base_url)
    }

    /// Creates one annotation. A 409 means an annotation with this name
    /// already exists and is reported as such rather than as an error.
    pub async fn create_annotation(
        &self,
        annotation: &Annotation,
    ) -> annot_core::Result<SubmitOutcome> {
        let response = self
            .http
            .post(self.annotations_url())
            .header("Accept", "application/json; version=v1alpha")
            .header("Organization", &self.organization)
            .bearer_auth(&self.token)
            .json(annotation)
            .send()
            .await
            .map_err(|e| AnnotationError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(annotation = %annotation.name, "annotation accepted");
            return Ok(SubmitOutcome::Created);
        }
        if status.as_u16() == 409 {
            return Ok(SubmitOutcome::AlreadyExists);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AnnotationError::Rejected {
            status: status.as_u16(),
            detail: error_detail(&body),
        })
    }

    /// Lists annotations overlapping the given window, newest first.
    pub async fn list_annotations(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<AnnotationRecord>> {
        info!(
            from = %from.to_rfc3339_opts(SecondsFormat::Secs, true),
            to = %to.to_rfc3339_opts(SecondsFormat::Secs, true),
            "fetching annotations"
        );

        let response = self
            .http
            .get(self.annotations_url())
            .header("Accept", "application/json; version=v1alpha")
            .header("Organization", &self.organization)
            .header("Project", "*")
            .bearer_auth(&self.token)
            .query(&[
                ("from", from.to_rfc3339_opts(SecondsFormat::Secs, true)),
                ("to", to.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ])
            .send()
            .await
            .context("annotations request failed")?;

        let status = response.status();
        let body = response.text().await.context("reading annotations response")?;
        if !status.is_success() {
            bail!(
                "annotations request failed (status {}): {}",
                status.as_u16(),
                error_detail(&body)
            );
        }

        let mut records = parse_annotations_body(&body)?;
        records.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(records)
    }
}

#[async_trait]
impl AnnotationSink for AnnotationsClient {
    async fn submit(&self, annotation: &Annotation) -> annot_core::Result<SubmitOutcome> {
        self.create_annotation(annotation).await
    }
}

/// The listing endpoint has returned both a bare list and an object wrapping
/// one; accept either shape.
pub fn parse_annotations_body(body: &str) -> Result<Vec<AnnotationRecord>> {
    #[derive(Deserialize)]
    struct Wrapped {
        #[serde(default)]
        annotations: Vec<AnnotationRecord>,
    }

    let value: serde_json::Value =
        serde_json::from_str(body).context("annotations response is not JSON")?;
    if value.is_array() {
        Ok(serde_json::from_value(value).context("unexpected annotation list shape")?)
    } else {
        let wrapped: Wrapped =
            serde_json::from_value(value).context("unexpected annotations response shape")?;
        Ok(wrapped.annotations)
    }
}

/// Pulls the most useful message out of an API error body.
///
/// Bodies arrive as `{"message": ...}`, `{"error": {...}}`, or as an `error`
/// string with a JSON object embedded in prose; anything unrecognized is
/// returned verbatim.
pub fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };

    if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
        return message.to_string();
    }

    match value.get("error") {
        Some(serde_json::Value::String(raw)) => {
            if let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) {
                if let Ok(nested) = serde_json::from_str::<serde_json::Value>(&raw[start..=end]) {
                    return summarize_error_object(&nested);
                }
            }
            raw.clone()
        }
        Some(object @ serde_json::Value::Object(_)) => summarize_error_object(object),
        _ => body.trim().to_string(),
    }
}

fn summarize_error_object(error: &serde_json::Value) -> String {
    let code = error
        .get("errorCode")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    let summary = error
        .get("errorSummary")
        .and_then(|v| v.as_str())
        .unwrap_or("no summary provided");
    format!("{code}: {summary}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_bare_annotation_list() {
        let body = r#"[
            {"name": "a", "slo": "latency", "project": "p", "startTime": "2025-01-27T10:00:00Z"}
        ]"#;

        let records = parse_annotations_body(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].slo, "latency");
    }

    #[test]
    fn accepts_a_wrapped_annotation_list() {
        let body = r#"{"annotations": [{"name": "a"}, {"name": "b"}]}"#;
        let records = parse_annotations_body(body).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn unknown_record_fields_survive_a_round_trip() {
        let body = r#"[{"name": "a", "labels": {"team": "sre"}}]"#;
        let records = parse_annotations_body(body).unwrap();

        let serialized = serde_json::to_value(&records[0]).unwrap();
        assert_eq!(serialized["labels"]["team"], "sre");
    }

    #[test]
    fn error_detail_prefers_the_message_field() {
        assert_eq!(
            error_detail(r#"{"message": "Project not found"}"#),
            "Project not found"
        );
    }

    #[test]
    fn error_detail_summarizes_error_objects() {
        let body = r#"{"error": {"errorCode": "E0000004", "errorSummary": "Authentication failed"}}"#;
        assert_eq!(error_detail(body), "E0000004: Authentication failed");
    }

    #[test]
    fn error_detail_digs_json_out_of_error_strings() {
        let body = r#"{"error": "upstream said {\"errorCode\": \"E01\", \"errorSummary\": \"bad credentials\"} while authenticating"}"#;
        assert_eq!(error_detail(body), "E01: bad credentials");
    }

    #[test]
    fn error_detail_falls_back_to_the_raw_body() {
        assert_eq!(error_detail("gateway timeout"), "gateway timeout");
        assert_eq!(error_detail(r#"{"status": 500}"#), r#"{"status": 500}"#);
    }
}
