//! Flat similarity index over SQLite + sqlite-vec.
//!
//! Every document lands in one unscoped KNN index with its metadata
//! flattened alongside. When the caller supplies a context carrying a
//! department (and the filter is enabled), the search narrows to that
//! department's partition before ranking; otherwise the whole index is
//! scanned.

use std::path::Path;
use std::sync::{Arc, Once};

use rusqlite::{params, Connection};
use tracing::warn;
use zerocopy::IntoBytes;

use membench_core::{
    BenchError, BenchResult, Candidate, Document, Embedder, IngestSummary, RetrievalBackend,
    UserContext, Verification,
};

use crate::schema::{init_db, EMBEDDING_DIMS};

const EMBED_BATCH: usize = 32;

static VEC_INIT: Once = Once::new();

/// Register sqlite-vec for every connection opened afterwards.
pub(crate) fn ensure_vec_init() {
    VEC_INIT.call_once(|| unsafe {
        rusqlite::ffi::sqlite3_auto_extension(Some(std::mem::transmute(
            sqlite_vec::sqlite3_vec_init as *const (),
        )));
    });
}

pub struct VectorIndex {
    conn: Connection,
    embedder: Arc<dyn Embedder>,
    label: String,
    use_context_filter: bool,
    ingested: bool,
}

impl VectorIndex {
    /// Open (or create) the index at `path`. Previous contents are dropped.
    pub fn new(path: &Path, embedder: Arc<dyn Embedder>) -> BenchResult<Self> {
        ensure_vec_init();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| BenchError::Database(format!("cannot create db directory: {e}")))?;
        }
        let conn = Connection::open(path)
            .map_err(|e| BenchError::Database(format!("cannot open database: {e}")))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| BenchError::Database(e.to_string()))?;
        Self::from_conn(conn, embedder)
    }

    pub fn in_memory(embedder: Arc<dyn Embedder>) -> BenchResult<Self> {
        ensure_vec_init();
        let conn = Connection::open_in_memory()
            .map_err(|e| BenchError::Database(format!("cannot open in-memory db: {e}")))?;
        Self::from_conn(conn, embedder)
    }

    fn from_conn(conn: Connection, embedder: Arc<dyn Embedder>) -> BenchResult<Self> {
        init_db(&conn)?;
        Ok(Self {
            conn,
            embedder,
            label: "flat-index".to_string(),
            use_context_filter: true,
            ingested: false,
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Disable department narrowing: the index then ignores any caller
    /// context and always searches globally (the naive baseline).
    pub fn context_filter(mut self, enabled: bool) -> Self {
        self.use_context_filter = enabled;
        self
    }

    pub fn count(&self) -> BenchResult<usize> {
        self.conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(|e| BenchError::Database(e.to_string()))
    }

    fn insert(&self, doc: &Document, embedding: &[f32]) -> BenchResult<()> {
        if embedding.len() != EMBEDDING_DIMS {
            return Err(BenchError::Embedding(format!(
                "expected {EMBEDDING_DIMS} dims, got {}",
                embedding.len()
            )));
        }

        self.conn
            .execute(
                "INSERT INTO documents (id, title, content, topic, department, status,
                 source, access_level, version)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    doc.id,
                    doc.title,
                    doc.content,
                    doc.topic,
                    doc.department,
                    doc.status.to_string(),
                    doc.metadata.source,
                    doc.metadata.access_level,
                    doc.metadata.version,
                ],
            )
            .map_err(|e| BenchError::Database(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO vec_documents (doc_id, department, embedding) VALUES (?1, ?2, ?3)",
                params![doc.id, doc.department, embedding.as_bytes()],
            )
            .map_err(|e| BenchError::Database(e.to_string()))?;

        Ok(())
    }

    fn knn(
        &self,
        embedding: &[f32],
        department: Option<&str>,
        top_k: usize,
    ) -> BenchResult<Vec<Candidate>> {
        let sql = if department.is_some() {
            "SELECT v.doc_id, d.content, v.distance
             FROM vec_documents v
             JOIN documents d ON d.id = v.doc_id
             WHERE v.embedding MATCH ?1 AND k = ?2 AND v.department = ?3
             ORDER BY v.distance"
        } else {
            "SELECT v.doc_id, d.content, v.distance
             FROM vec_documents v
             JOIN documents d ON d.id = v.doc_id
             WHERE v.embedding MATCH ?1 AND k = ?2
             ORDER BY v.distance"
        };

        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| BenchError::Database(e.to_string()))?;

        let map_row = |row: &rusqlite::Row| -> rusqlite::Result<Candidate> {
            let distance: f64 = row.get(2)?;
            Ok(Candidate {
                id: Some(row.get(0)?),
                text: row.get(1)?,
                // Cosine distance in [0, 2]; report similarity instead.
                score: Some(1.0 - distance as f32),
            })
        };

        let rows = match department {
            Some(dept) => stmt
                .query_map(params![embedding.as_bytes(), top_k as i64, dept], map_row)
                .map_err(|e| BenchError::Database(e.to_string()))?,
            None => stmt
                .query_map(params![embedding.as_bytes(), top_k as i64], map_row)
                .map_err(|e| BenchError::Database(e.to_string()))?,
        };

        let mut candidates = Vec::new();
        for row in rows {
            candidates.push(row.map_err(|e| BenchError::Database(e.to_string()))?);
        }
        Ok(candidates)
    }
}

impl RetrievalBackend for VectorIndex {
    fn label(&self) -> &str {
        &self.label
    }

    fn verification(&self) -> Verification {
        Verification::IdMatch
    }

    fn ingest(&mut self, docs: &[Document]) -> BenchResult<IngestSummary> {
        if self.ingested {
            return Err(BenchError::Ingestion(
                "index was already ingested this run".into(),
            ));
        }
        self.ingested = true;

        let mut summary = IngestSummary {
            attempted: docs.len(),
            failed: 0,
        };

        for chunk in docs.chunks(EMBED_BATCH) {
            let texts: Vec<&str> = chunk.iter().map(|d| d.content.as_str()).collect();
            let embeddings = match self.embedder.embed_batch(&texts) {
                Ok(e) => e,
                Err(e) => {
                    warn!("embedding batch failed, skipping {} documents: {e}", chunk.len());
                    summary.failed += chunk.len();
                    continue;
                }
            };
            for (doc, embedding) in chunk.iter().zip(&embeddings) {
                if let Err(e) = self.insert(doc, embedding) {
                    warn!("document {} rejected: {e}", doc.id);
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }

    fn search(
        &self,
        query: &str,
        context: Option<&UserContext>,
        top_k: usize,
    ) -> BenchResult<Vec<Candidate>> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        let embedding = self.embedder.embed(query)?;
        let department = if self.use_context_filter {
            context.map(|c| c.department.as_str())
        } else {
            None
        };
        self.knn(&embedding, department, top_k)
    }
}

#[cfg(test)]
pub mod test_helpers {
    pub(crate) use super::ensure_vec_init;
}
