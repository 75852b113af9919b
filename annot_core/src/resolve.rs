use std::collections::HashMap;

use crate::slo::{ComponentRef, Slo};

/// Collects the component references declared by a composite SLO.
///
/// References appear in objective order, then declaration order within each
/// objective. A plain SLO yields an empty list.
pub fn extract_references(slo: &Slo) -> Vec<ComponentRef> {
    let mut refs = Vec::new();
    for objective in &slo.objectives {
        let Some(composite) = &objective.composite else {
            continue;
        };
        if let Some(components) = &composite.components {
            refs.extend(components.objectives.iter().cloned());
        }
    }
    refs
}

/// Resolves component references against the inventory.
///
/// The first SLO whose (project, name) matches a reference wins; references
/// without a match are dropped without comment. Callers compare the result
/// length against the reference count to detect a shortfall.
pub fn resolve(inventory: &[Slo], refs: &[ComponentRef]) -> Vec<Slo> {
    let mut index: HashMap<(&str, &str), &Slo> = HashMap::with_capacity(inventory.len());
    for slo in inventory {
        index
            .entry((slo.project.as_str(), slo.name.as_str()))
            .or_insert(slo);
    }

    refs.iter()
        .filter_map(|reference| index.get(&(reference.project.as_str(), reference.slo.as_str())))
        .map(|slo| (*slo).clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slo::Objective;

    fn composite(project: &str, name: &str, objectives: Vec<Objective>) -> Slo {
        let mut slo = Slo::new(project, name);
        slo.objectives = objectives;
        slo
    }

    #[test]
    fn extracts_references_in_declaration_order() {
        let slo = composite(
            "p",
            "agg",
            vec![
                Objective::composite_of(vec![
                    ComponentRef::new("p", "latency"),
                    ComponentRef::new("p", "errors"),
                ]),
                Objective::default(),
                Objective::composite_of(vec![ComponentRef::new("other", "saturation")]),
            ],
        );

        let refs = extract_references(&slo);
        let names: Vec<&str> = refs.iter().map(|r| r.slo.as_str()).collect();
        assert_eq!(names, ["latency", "errors", "saturation"]);
    }

    #[test]
    fn plain_slo_yields_no_references() {
        assert!(extract_references(&Slo::new("p", "plain")).is_empty());
    }

    #[test]
    fn resolves_in_reference_order() {
        let inventory = vec![
            Slo::new("p", "errors"),
            Slo::new("p", "latency"),
        ];
        let refs = vec![
            ComponentRef::new("p", "latency"),
            ComponentRef::new("p", "errors"),
        ];

        let resolved = resolve(&inventory, &refs);
        let names: Vec<&str> = resolved.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["latency", "errors"]);
    }

    #[test]
    fn unmatched_references_are_dropped() {
        let inventory = vec![Slo::new("p", "latency")];
        let refs = vec![
            ComponentRef::new("p", "latency"),
            ComponentRef::new("p", "decommissioned"),
            ComponentRef::new("ghost-project", "latency"),
        ];

        let resolved = resolve(&inventory, &refs);
        assert_eq!(resolved.len(), 1);
        assert!(resolved.len() <= refs.len());
    }

    #[test]
    fn duplicate_identities_resolve_to_first_in_inventory_order() {
        let mut first = Slo::new("p", "latency");
        first.display_name = Some("the original".to_string());
        let mut duplicate = Slo::new("p", "latency");
        duplicate.display_name = Some("the impostor".to_string());

        let resolved = resolve(&[first, duplicate], &[ComponentRef::new("p", "latency")]);
        assert_eq!(resolved[0].display_name(), "the original");
    }

    #[test]
    fn resolution_does_not_touch_the_inventory() {
        let inventory = vec![Slo::new("p", "latency"), Slo::new("p", "errors")];
        let snapshot = inventory.clone();

        resolve(&inventory, &[ComponentRef::new("p", "errors")]);
        assert_eq!(inventory, snapshot);
    }
}
