//! Fixture persistence — the (corpus, query set) pair is written to disk so
//! repeated backend runs compare against an identical fixture.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::document::{Document, Query};
use crate::error::{BenchError, BenchResult};

pub const CORPUS_FILE: &str = "knowledge_base.json";
pub const QUERY_FILE: &str = "benchmark_queries.json";

fn save_json<T: Serialize>(path: &Path, items: &[T]) -> BenchResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(items)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> BenchResult<Vec<T>> {
    if !path.exists() {
        return Err(BenchError::MissingFixture(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_corpus(path: &Path, docs: &[Document]) -> BenchResult<()> {
    save_json(path, docs)
}

pub fn load_corpus(path: &Path) -> BenchResult<Vec<Document>> {
    load_json(path)
}

pub fn save_queries(path: &Path, queries: &[Query]) -> BenchResult<()> {
    save_json(path, queries)
}

pub fn load_queries(path: &Path) -> BenchResult<Vec<Query>> {
    load_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{generate_corpus, generate_queries};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_corpus_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CORPUS_FILE);

        let mut rng = StdRng::seed_from_u64(1);
        let docs = generate_corpus(10, &mut rng);
        save_corpus(&path, &docs).unwrap();

        let loaded = load_corpus(&path).unwrap();
        assert_eq!(loaded.len(), docs.len());
        assert_eq!(loaded[0].id, docs[0].id);
        assert_eq!(loaded[0].key_fact_value, docs[0].key_fact_value);
        assert_eq!(loaded[0].status, docs[0].status);
    }

    #[test]
    fn test_query_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(QUERY_FILE);

        let mut rng = StdRng::seed_from_u64(2);
        let docs = generate_corpus(5, &mut rng);
        let queries = generate_queries(&docs, 8, &mut rng);
        save_queries(&path, &queries).unwrap();

        let loaded = load_queries(&path).unwrap();
        assert_eq!(loaded.len(), 8);
        assert_eq!(loaded[0].query_id, queries[0].query_id);
        assert_eq!(loaded[0].expected_fact, queries[0].expected_fact);
    }

    #[test]
    fn test_missing_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let result = load_corpus(&path);
        assert!(matches!(result, Err(BenchError::MissingFixture(_))));
    }
}
