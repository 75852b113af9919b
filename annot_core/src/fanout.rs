use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::annotation::{Annotation, AnnotationRequest, AnnotationSink, SubmitOutcome};
use crate::resolve::{extract_references, resolve};
use crate::slo::Slo;

/// Success/total tally for one fan-out batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FanoutSummary {
    pub succeeded: usize,
    pub total: usize,
}

impl FanoutSummary {
    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

/// How a composite's component references fared against the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionStatus {
    /// The composite declares no component references.
    NoReferences,
    /// References exist but none matched the inventory.
    NothingResolved,
    /// Some references matched, some did not.
    Partial,
    /// Every reference matched.
    Complete,
}

/// Outcome of annotating a composite and its resolved components.
#[derive(Debug, Clone, Serialize)]
pub struct CompositeReport {
    pub composite: FanoutSummary,
    /// Absent when nothing resolved, so the component pass never ran.
    pub components: Option<FanoutSummary>,
    pub referenced: usize,
    pub resolved: usize,
}

impl CompositeReport {
    pub fn resolution(&self) -> ResolutionStatus {
        match (self.referenced, self.resolved) {
            (0, _) => ResolutionStatus::NoReferences,
            (_, 0) => ResolutionStatus::NothingResolved,
            (referenced, resolved) if resolved < referenced => ResolutionStatus::Partial,
            _ => ResolutionStatus::Complete,
        }
    }
}

/// Applies one annotation request across a set of target SLOs, one
/// submission at a time, in target order.
pub struct Annotator<S> {
    sink: S,
}

impl<S: AnnotationSink> Annotator<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Fans `request` out over `targets`.
    ///
    /// `total` always equals `targets.len()`. A target without both identity
    /// fields is counted but never submitted. Conflicts and failures are
    /// reported per target and the batch keeps going.
    pub async fn apply(&self, targets: &[Slo], request: &AnnotationRequest) -> FanoutSummary {
        let mut summary = FanoutSummary {
            succeeded: 0,
            total: targets.len(),
        };

        for target in targets {
            if !target.has_identity() {
                debug!(
                    project = %target.project,
                    slo = %target.name,
                    "skipping target without name and project"
                );
                continue;
            }

            let annotation = Annotation::for_target(target, request);
            match self.sink.submit(&annotation).await {
                Ok(SubmitOutcome::Created) => {
                    summary.succeeded += 1;
                    info!(
                        annotation = %annotation.name,
                        project = %annotation.project,
                        slo = %annotation.slo,
                        "created annotation"
                    );
                }
                Ok(SubmitOutcome::AlreadyExists) => {
                    warn!(
                        annotation = %annotation.name,
                        slo = %annotation.slo,
                        "annotation already exists"
                    );
                }
                Err(e) => {
                    error!(
                        annotation = %annotation.name,
                        slo = %annotation.slo,
                        error = %e,
                        "failed to create annotation"
                    );
                }
            }
        }

        summary
    }

    /// Annotates `composite` first, then every component reference that
    /// resolves against `inventory`.
    ///
    /// A reference pointing outside the inventory is dropped from the
    /// component pass; the report carries both counts so the caller can
    /// surface the shortfall.
    pub async fn annotate_composite(
        &self,
        inventory: &[Slo],
        composite: &Slo,
        request: &AnnotationRequest,
    ) -> CompositeReport {
        let refs = extract_references(composite);
        let resolved = resolve(inventory, &refs);
        if resolved.len() < refs.len() {
            warn!(
                slo = %composite.name,
                referenced = refs.len(),
                resolved = resolved.len(),
                "component references did not fully resolve"
            );
        }

        let composite_summary = self.apply(std::slice::from_ref(composite), request).await;
        let components = if resolved.is_empty() {
            None
        } else {
            Some(self.apply(&resolved, request).await)
        };

        CompositeReport {
            composite: composite_summary,
            components,
            referenced: refs.len(),
            resolved: resolved.len(),
        }
    }
}
