pub mod api;
pub mod auth;
pub mod config;
pub mod sloctl;

pub use api::{AnnotationRecord, AnnotationsClient};
pub use config::{load_contexts, Context, DEFAULT_BASE_URL};
