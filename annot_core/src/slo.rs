use serde::{Deserialize, Serialize};

/// A service-level objective record from the inventory source.
///
/// Identity within one inventory snapshot is the (`project`, `name`) pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Slo {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    pub project: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    #[serde(default)]
    pub objectives: Vec<Objective>,
}

impl Slo {
    pub fn new(project: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            project: project.into(),
            ..Self::default()
        }
    }

    /// Human-friendly name, falling back to the metadata name.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn identity(&self) -> (&str, &str) {
        (&self.project, &self.name)
    }

    /// Both identity fields are present. Records failing this are tolerated
    /// in an inventory but never targeted by a submission.
    pub fn has_identity(&self) -> bool {
        !self.name.is_empty() && !self.project.is_empty()
    }

    /// Derived each time it is asked for: an SLO is composite when any of its
    /// objectives carries a composite definition.
    pub fn is_composite(&self) -> bool {
        self.objectives
            .iter()
            .any(|objective| objective.composite.is_some())
    }
}

/// One measurable threshold belonging to an SLO. Only the composite
/// definition matters here; the remaining threshold fields stay with the
/// inventory source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Objective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<CompositeSpec>,
}

impl Objective {
    /// An objective aggregating the given component references.
    pub fn composite_of(refs: Vec<ComponentRef>) -> Self {
        Self {
            name: None,
            composite: Some(CompositeSpec::with_components(refs)),
        }
    }
}

/// Aggregation definition carried by a composite objective.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompositeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<ComponentList>,
}

impl CompositeSpec {
    pub fn with_components(refs: Vec<ComponentRef>) -> Self {
        Self {
            components: Some(ComponentList { objectives: refs }),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComponentList {
    #[serde(default)]
    pub objectives: Vec<ComponentRef>,
}

/// Points at one objective of another SLO contributing to a composite.
/// May reference an SLO absent from the current inventory snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    pub project: String,
    pub slo: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
}

impl ComponentRef {
    pub fn new(project: impl Into<String>, slo: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            slo: slo.into(),
            objective: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_name() {
        let mut slo = Slo::new("payments", "checkout-latency");
        assert_eq!(slo.display_name(), "checkout-latency");

        slo.display_name = Some("Checkout latency".to_string());
        assert_eq!(slo.display_name(), "Checkout latency");
    }

    #[test]
    fn composite_is_derived_from_objectives() {
        let mut slo = Slo::new("payments", "checkout");
        assert!(!slo.is_composite());

        slo.objectives.push(Objective::default());
        assert!(!slo.is_composite());

        slo.objectives.push(Objective::composite_of(vec![ComponentRef::new(
            "payments",
            "checkout-latency",
        )]));
        assert!(slo.is_composite());
    }

    #[test]
    fn identity_guard_requires_both_fields() {
        assert!(Slo::new("payments", "checkout").has_identity());
        assert!(!Slo::new("", "checkout").has_identity());
        assert!(!Slo::new("payments", "").has_identity());
    }

    #[test]
    fn deserializes_nested_composite_definition() {
        let raw = r#"{
            "project": "p",
            "name": "svc-composite",
            "objectives": [
                {"composite": {"components": {"objectives": [
                    {"project": "p", "slo": "svc-latency"},
                    {"project": "p", "slo": "svc-errors"}
                ]}}}
            ]
        }"#;

        let slo: Slo = serde_json::from_str(raw).unwrap();
        assert!(slo.is_composite());
        let refs = &slo.objectives[0]
            .composite
            .as_ref()
            .unwrap()
            .components
            .as_ref()
            .unwrap()
            .objectives;
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].slo, "svc-latency");
    }
}
