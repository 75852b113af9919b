use crate::slo::Slo;

/// An inventory split into composite and component SLOs.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub composites: Vec<Slo>,
    pub components: Vec<Slo>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.composites.len() + self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.composites.is_empty() && self.components.is_empty()
    }
}

/// Splits `inventory` into composite and component SLOs.
///
/// Every SLO lands in exactly one group and relative order within each group
/// matches the inventory order. An SLO with no objectives is a component.
pub fn classify(inventory: &[Slo]) -> Partition {
    let mut partition = Partition::default();
    for slo in inventory {
        if slo.is_composite() {
            partition.composites.push(slo.clone());
        } else {
            partition.components.push(slo.clone());
        }
    }
    partition
}
