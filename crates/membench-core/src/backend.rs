use crate::document::{Candidate, Document, UserContext};
use crate::error::BenchResult;

/// How the evaluator decides whether a backend's answer is a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Candidates carry stable source ids; hit when the target id is ranked.
    IdMatch,
    /// Candidates are free text; hit when the expected fact literal appears.
    FactInText,
}

/// Outcome of one ingestion pass. A non-zero `failed` is a degraded
/// condition the reporter surfaces alongside the metrics.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestSummary {
    pub attempted: usize,
    pub failed: usize,
}

impl IngestSummary {
    pub fn is_degraded(&self) -> bool {
        self.failed > 0
    }
}

pub trait RetrievalBackend {
    fn label(&self) -> &str;
    fn verification(&self) -> Verification;

    /// Load the corpus. At most once per instance per run; per-document
    /// failures are counted, not fatal.
    fn ingest(&mut self, docs: &[Document]) -> BenchResult<IngestSummary>;

    /// Return up to `top_k` candidates ranked by backend-reported relevance.
    /// An empty result set is an empty `Vec`, never an error.
    fn search(
        &self,
        query: &str,
        context: Option<&UserContext>,
        top_k: usize,
    ) -> BenchResult<Vec<Candidate>>;
}
