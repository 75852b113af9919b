pub mod analysis;
pub mod exporters;
pub mod table;

pub use analysis::{category_counts, category_of, filter_by_categories, UNKNOWN_CATEGORY};
pub use exporters::{CsvExporter, JsonExporter, MarkdownExporter};
