use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("fixture file not found: {0} — run `membench generate` to create it")]
    MissingFixture(PathBuf),

    #[error("ingestion error: {0}")]
    Ingestion(String),

    #[error("backend query error: {0}")]
    Backend(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("remote service error: {0}")]
    Remote(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(String),
}

pub type BenchResult<T> = Result<T, BenchError>;
