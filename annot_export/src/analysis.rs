use std::collections::{BTreeMap, BTreeSet};

use annot_client::AnnotationRecord;

pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Category label for a record; the API omits it on some annotation kinds.
pub fn category_of(record: &AnnotationRecord) -> &str {
    if record.category.is_empty() {
        UNKNOWN_CATEGORY
    } else {
        &record.category
    }
}

/// Per-category annotation counts, in category order.
pub fn category_counts(records: &[AnnotationRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(category_of(record).to_string()).or_insert(0) += 1;
    }
    counts
}

/// Keeps records whose category is in `selected`, preserving record order.
pub fn filter_by_categories(
    records: &[AnnotationRecord],
    selected: &BTreeSet<String>,
) -> Vec<AnnotationRecord> {
    records
        .iter()
        .filter(|record| selected.contains(category_of(record)))
        .cloned()
        .collect()
}

/// Empty wire values render as "None" in tables and exports.
pub fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "None"
    } else {
        value
    }
}
