pub mod annotation;
pub mod classify;
pub mod error;
pub mod fanout;
pub mod resolve;
pub mod slo;

pub use annotation::{Annotation, AnnotationRequest, AnnotationSink, SubmitOutcome};
pub use classify::{classify, Partition};
pub use error::{AnnotationError, Result};
pub use fanout::{Annotator, CompositeReport, FanoutSummary, ResolutionStatus};
pub use resolve::{extract_references, resolve};
pub use slo::{ComponentRef, CompositeSpec, Objective, Slo};

// Re-export commonly used types
pub use async_trait::async_trait;
