use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::slo::Slo;

/// The operator-supplied payload shared by every annotation in one fan-out.
///
/// The pair of timestamps is passed through as given; whether the end lies
/// after the start is for the remote API to judge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRequest {
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// One annotation instance bound to a single SLO, ready for submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub name: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub project: String,
    pub slo: String,
}

impl Annotation {
    /// Binds `request` to `target` under a fresh unique identifier.
    pub fn for_target(target: &Slo, request: &AnnotationRequest) -> Self {
        Self {
            name: uuid::Uuid::new_v4().to_string(),
            description: request.description.clone(),
            start_time: request.start_time,
            end_time: request.end_time,
            project: target.project.clone(),
            slo: target.name.clone(),
        }
    }
}

/// Outcome of submitting one annotation. Failures travel on the error
/// channel, so a batch sees Success, Conflict, or Failure per target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created,
    AlreadyExists,
}

/// Boundary to the remote annotations API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnnotationSink: Send + Sync {
    async fn submit(&self, annotation: &Annotation) -> Result<SubmitOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request() -> AnnotationRequest {
        AnnotationRequest {
            description: "deploy 42".to_string(),
            start_time: Utc.with_ymd_and_hms(2025, 1, 27, 10, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 1, 27, 11, 0, 0).unwrap(),
        }
    }

    #[test]
    fn binds_target_identity_and_request_fields() {
        let target = Slo::new("payments", "checkout-latency");
        let annotation = Annotation::for_target(&target, &request());

        assert_eq!(annotation.project, "payments");
        assert_eq!(annotation.slo, "checkout-latency");
        assert_eq!(annotation.description, "deploy 42");
        assert!(!annotation.name.is_empty());
    }

    #[test]
    fn each_instance_gets_its_own_identifier() {
        let target = Slo::new("payments", "checkout-latency");
        let a = Annotation::for_target(&target, &request());
        let b = Annotation::for_target(&target, &request());
        assert_ne!(a.name, b.name);
    }

    #[test]
    fn serializes_with_api_field_casing() {
        let annotation = Annotation::for_target(&Slo::new("p", "s"), &request());
        let value = serde_json::to_value(&annotation).unwrap();

        assert!(value.get("startTime").is_some());
        assert!(value.get("endTime").is_some());
        assert_eq!(value["slo"], "s");
        assert_eq!(value["project"], "p");
    }
}
