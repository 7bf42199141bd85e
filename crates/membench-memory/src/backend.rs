//! Identity-scoped retrieval backend over the remote memory service.
//!
//! The backend is fixed to one identity at construction; it cannot answer
//! for anyone else. Ranking and cross-identity isolation are the service's
//! responsibility. Benchmarking several simulated users means one backend
//! instance per identity.

use tracing::warn;

use membench_core::{
    BenchError, BenchResult, Candidate, Document, IngestSummary, RetrievalBackend, UserContext,
    Verification,
};

use crate::client::MemoryServiceClient;

pub struct ScopedMemoryBackend {
    client: MemoryServiceClient,
    identity: String,
    label: String,
    reset_before_ingest: bool,
    ingested: bool,
}

impl ScopedMemoryBackend {
    pub fn new(client: MemoryServiceClient, identity: impl Into<String>) -> Self {
        Self {
            client,
            identity: identity.into(),
            label: "scoped-memory".to_string(),
            reset_before_ingest: true,
            ingested: false,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Keep whatever the service already holds for this identity instead of
    /// wiping it before ingestion (replaying existing memories).
    pub fn keep_existing(mut self) -> Self {
        self.reset_before_ingest = false;
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }
}

impl RetrievalBackend for ScopedMemoryBackend {
    fn label(&self) -> &str {
        &self.label
    }

    fn verification(&self) -> Verification {
        Verification::FactInText
    }

    fn ingest(&mut self, docs: &[Document]) -> BenchResult<IngestSummary> {
        if self.ingested {
            return Err(BenchError::Ingestion(
                "memory backend was already ingested this run".into(),
            ));
        }
        self.ingested = true;

        // Construction does no I/O, so the clean-fixture reset happens here.
        // A failed reset is fatal: continuing would blend fixtures.
        if self.reset_before_ingest {
            self.client.delete_all(&self.identity)?;
        }

        let mut summary = IngestSummary {
            attempted: docs.len(),
            failed: 0,
        };
        for doc in docs {
            if let Err(e) = self.client.add(&doc.content, &self.identity) {
                warn!(identity = %self.identity, "document {} rejected: {e}", doc.id);
                summary.failed += 1;
            }
        }
        Ok(summary)
    }

    fn search(
        &self,
        query: &str,
        _context: Option<&UserContext>,
        top_k: usize,
    ) -> BenchResult<Vec<Candidate>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        // The caller's context is irrelevant: scope is the construction-time
        // identity, enforced by the service.
        self.client.search(query, &self.identity, top_k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> ScopedMemoryBackend {
        let client = MemoryServiceClient::with_key("http://localhost:8080", "test-key");
        ScopedMemoryBackend::new(client, "user_engineering")
    }

    #[test]
    fn test_identity_fixed_at_construction() {
        let b = backend();
        assert_eq!(b.identity(), "user_engineering");
        assert_eq!(b.label(), "scoped-memory");
        assert_eq!(b.verification(), Verification::FactInText);
    }

    #[test]
    fn test_label_override() {
        let b = backend().with_label("scoped-memory:hr");
        assert_eq!(b.label(), "scoped-memory:hr");
    }

    #[test]
    fn test_zero_top_k_short_circuits() {
        // Must not touch the network.
        let b = backend();
        let results = b.search("anything", None, 0).unwrap();
        assert!(results.is_empty());
    }
}
