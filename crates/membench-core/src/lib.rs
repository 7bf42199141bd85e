pub mod backend;
pub mod corpus;
pub mod document;
pub mod embedder;
pub mod error;
pub mod eval;
#[cfg(feature = "embeddings")]
pub mod fastembed_embedder;
pub mod fixture;
pub mod metrics;

pub use backend::{IngestSummary, RetrievalBackend, Verification};
pub use document::{Candidate, DocMetadata, DocStatus, Document, Query, UserContext};
pub use embedder::Embedder;
pub use error::{BenchError, BenchResult};
pub use eval::{EvaluationRecord, Evaluator};
#[cfg(feature = "embeddings")]
pub use fastembed_embedder::FastEmbedder;
pub use metrics::BackendSummary;
