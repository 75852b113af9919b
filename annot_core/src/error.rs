use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("annotation rejected (status {status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid annotation payload: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AnnotationError>;
