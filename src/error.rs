use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the ingestion and query pipeline.
///
/// Nothing here is retried internally. Callers decide whether a second
/// attempt makes sense.
#[derive(Error, Debug)]
pub enum RagError {
    #[error("Storage error at {}: {message}", path.display())]
    Storage { path: PathBuf, message: String },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Embedding error: {0}")]
    Embedding(String),
    #[error("Generation error: {0}")]
    Generation(String),
    #[error("No document indexed yet. Upload a PDF before asking questions.")]
    EmptyIndex,
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RagError {
    pub fn storage(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        RagError::Storage {
            path: path.into(),
            message: err.to_string(),
        }
    }

    /// Short machine-readable name, used by the HTTP layer.
    pub fn kind(&self) -> &'static str {
        match self {
            RagError::Storage { .. } => "storage",
            RagError::Parse(_) => "parse",
            RagError::Embedding(_) => "embedding",
            RagError::Generation(_) => "generation",
            RagError::EmptyIndex => "empty_index",
            RagError::Config(_) => "config",
        }
    }
}

pub type RagResult<T> = Result<T, RagError>;
