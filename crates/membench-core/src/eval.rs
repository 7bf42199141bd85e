//! Benchmark evaluation — replays a fixed query sequence against one
//! retrieval backend, timing each search call and scoring hit or miss.
//!
//! Execution is strictly sequential: one synchronous `search` per query,
//! measured in isolation. A failed call is absorbed, logged and recorded as
//! a miss with zero latency; one bad query never aborts the run.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::backend::{RetrievalBackend, Verification};
use crate::document::{Candidate, Document, Query, UserContext};

/// Outcome of one (backend, query) pair. `failed` marks records produced by
/// an absorbed backend error; their latency is the zero sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRecord {
    pub query_id: String,
    pub latency: Duration,
    pub hit: bool,
    pub system: String,
    pub failed: bool,
}

/// Drives a backend over a query set. Holds the per-department table of
/// ground-truth fact literals needed to score negative probes.
pub struct Evaluator {
    top_k: usize,
    facts_by_department: HashMap<String, Vec<String>>,
}

impl Evaluator {
    /// Build from a document corpus: the fact table is derived from each
    /// document's department and key fact value.
    pub fn new(corpus: &[Document], top_k: usize) -> Self {
        Self::from_facts(
            corpus
                .iter()
                .map(|d| (d.department.clone(), d.key_fact_value.to_string())),
            top_k,
        )
    }

    /// Build from an explicit (department, fact literal) table. Used by the
    /// conversational fixture, where not every seeded memory has a number.
    pub fn from_facts<I>(facts: I, top_k: usize) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut facts_by_department: HashMap<String, Vec<String>> = HashMap::new();
        for (department, literal) in facts {
            let entry = facts_by_department.entry(department).or_default();
            if !entry.contains(&literal) {
                entry.push(literal);
            }
        }
        Self {
            top_k,
            facts_by_department,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Replay `queries` against `backend`, one record per query.
    pub fn evaluate(
        &self,
        backend: &dyn RetrievalBackend,
        queries: &[Query],
    ) -> Vec<EvaluationRecord> {
        let label = backend.label().to_string();
        let verification = backend.verification();
        let mut records = Vec::with_capacity(queries.len());

        for query in queries {
            let started = Instant::now();
            let record = match backend.search(&query.query_text, query.user_context.as_ref(), self.top_k)
            {
                Ok(candidates) => {
                    let latency = started.elapsed();
                    let hit = self.score(query, verification, &candidates);
                    debug!(
                        query_id = %query.query_id,
                        system = %label,
                        hit,
                        latency_ms = latency.as_secs_f64() * 1000.0,
                        "query evaluated"
                    );
                    EvaluationRecord {
                        query_id: query.query_id.clone(),
                        latency,
                        hit,
                        system: label.clone(),
                        failed: false,
                    }
                }
                Err(e) => {
                    warn!(query_id = %query.query_id, system = %label, "query failed: {e}");
                    EvaluationRecord {
                        query_id: query.query_id.clone(),
                        latency: Duration::ZERO,
                        hit: false,
                        system: label.clone(),
                        failed: true,
                    }
                }
            };
            records.push(record);
        }

        records
    }

    fn score(&self, query: &Query, verification: Verification, candidates: &[Candidate]) -> bool {
        match query.expected_fact {
            Some(expected) => match verification {
                Verification::IdMatch => candidates
                    .iter()
                    .filter_map(|c| c.id.as_deref())
                    .any(|id| id == query.target_doc_id),
                Verification::FactInText => {
                    let literal = expected.to_string();
                    candidates.iter().any(|c| c.text.contains(&literal))
                }
            },
            None => self.absent(query.user_context.as_ref(), candidates),
        }
    }

    /// Negative probe: hit iff nothing leaked — the result set is empty, or
    /// no candidate carries a fact literal from a foreign department.
    fn absent(&self, context: Option<&UserContext>, candidates: &[Candidate]) -> bool {
        if candidates.is_empty() {
            return true;
        }
        let own = context.map(|c| c.department.as_str());
        for (department, literals) in &self.facts_by_department {
            if Some(department.as_str()) == own {
                continue;
            }
            for literal in literals {
                if candidates.iter().any(|c| c.text.contains(literal.as_str())) {
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::IngestSummary;
    use crate::error::{BenchError, BenchResult};

    struct StubBackend {
        label: String,
        verification: Verification,
        candidates: Vec<Candidate>,
        fail: bool,
    }

    impl StubBackend {
        fn new(verification: Verification, candidates: Vec<Candidate>) -> Self {
            Self {
                label: "stub".into(),
                verification,
                candidates,
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                label: "stub".into(),
                verification: Verification::FactInText,
                candidates: Vec::new(),
                fail: true,
            }
        }
    }

    impl RetrievalBackend for StubBackend {
        fn label(&self) -> &str {
            &self.label
        }

        fn verification(&self) -> Verification {
            self.verification
        }

        fn ingest(&mut self, docs: &[Document]) -> BenchResult<IngestSummary> {
            Ok(IngestSummary {
                attempted: docs.len(),
                failed: 0,
            })
        }

        fn search(
            &self,
            _query: &str,
            _context: Option<&UserContext>,
            top_k: usize,
        ) -> BenchResult<Vec<Candidate>> {
            if self.fail {
                return Err(BenchError::Backend("simulated outage".into()));
            }
            Ok(self.candidates.iter().take(top_k).cloned().collect())
        }
    }

    fn candidate(id: &str, text: &str) -> Candidate {
        Candidate {
            id: Some(id.into()),
            text: text.into(),
            score: Some(0.9),
        }
    }

    fn positive_query(target: &str, expected: i64, department: &str) -> Query {
        Query {
            query_id: "q1".into(),
            query_text: "what is the limit?".into(),
            target_doc_id: target.into(),
            expected_fact: Some(expected),
            user_context: Some(UserContext {
                department: department.into(),
                role: "Employee".into(),
            }),
        }
    }

    fn negative_query(department: &str) -> Query {
        Query {
            query_id: "q-neg".into(),
            query_text: "what is the other team's limit?".into(),
            target_doc_id: "foreign".into(),
            expected_fact: None,
            user_context: Some(UserContext {
                department: department.into(),
                role: "Employee".into(),
            }),
        }
    }

    fn evaluator() -> Evaluator {
        Evaluator::from_facts(
            [
                ("Engineering".to_string(), "4662".to_string()),
                ("Engineering".to_string(), "206".to_string()),
                ("HR".to_string(), "2343".to_string()),
                ("HR".to_string(), "1691".to_string()),
            ],
            3,
        )
    }

    #[test]
    fn test_id_match_hit_and_miss() {
        let backend = StubBackend::new(
            Verification::IdMatch,
            vec![candidate("d1", "first"), candidate("d2", "second")],
        );
        let ev = evaluator();

        let hit = ev.evaluate(&backend, &[positive_query("d2", 100, "HR")]);
        assert!(hit[0].hit);

        let miss = ev.evaluate(&backend, &[positive_query("d3", 100, "HR")]);
        assert!(!miss[0].hit);
    }

    #[test]
    fn test_value_containment_hit_and_miss() {
        let backend = StubBackend::new(
            Verification::FactInText,
            vec![candidate("m1", "...limit is $206 per month...")],
        );
        let ev = evaluator();

        let hit = ev.evaluate(&backend, &[positive_query("d1", 206, "Engineering")]);
        assert!(hit[0].hit);

        let miss = ev.evaluate(&backend, &[positive_query("d1", 2343, "Engineering")]);
        assert!(!miss[0].hit);
    }

    #[test]
    fn test_negative_probe_empty_result_hits() {
        let backend = StubBackend::new(Verification::FactInText, Vec::new());
        let records = evaluator().evaluate(&backend, &[negative_query("Engineering")]);
        assert!(records[0].hit);
    }

    #[test]
    fn test_negative_probe_foreign_fact_misses() {
        // An HR fact (2343) leaking into an Engineering-scoped result.
        let backend = StubBackend::new(
            Verification::FactInText,
            vec![candidate("m1", "expense reimbursement limit is $2343")],
        );
        let records = evaluator().evaluate(&backend, &[negative_query("Engineering")]);
        assert!(!records[0].hit);
    }

    #[test]
    fn test_negative_probe_own_fact_is_not_a_leak() {
        let backend = StubBackend::new(
            Verification::FactInText,
            vec![candidate("m1", "travel allowance limit is $4662 per quarter")],
        );
        let records = evaluator().evaluate(&backend, &[negative_query("Engineering")]);
        assert!(records[0].hit);
    }

    #[test]
    fn test_failure_absorbed_as_sentinel_miss() {
        let backend = StubBackend::failing();
        let queries = vec![
            positive_query("d1", 100, "HR"),
            positive_query("d2", 200, "HR"),
        ];
        let records = evaluator().evaluate(&backend, &queries);

        assert_eq!(records.len(), 2);
        for r in &records {
            assert!(!r.hit);
            assert!(r.failed);
            assert_eq!(r.latency, Duration::ZERO);
        }
    }

    #[test]
    fn test_idempotent_outcomes() {
        let backend = StubBackend::new(
            Verification::IdMatch,
            vec![candidate("d1", "first"), candidate("d2", "second")],
        );
        let ev = evaluator();
        let queries = vec![
            positive_query("d1", 100, "HR"),
            positive_query("d9", 100, "HR"),
            negative_query("Engineering"),
        ];

        let first = ev.evaluate(&backend, &queries);
        let second = ev.evaluate(&backend, &queries);
        let outcomes = |rs: &[EvaluationRecord]| rs.iter().map(|r| r.hit).collect::<Vec<_>>();
        assert_eq!(outcomes(&first), outcomes(&second));
    }

    #[test]
    fn test_top_k_truncation() {
        // Target ranked below top_k must not count as a hit.
        let backend = StubBackend::new(
            Verification::IdMatch,
            vec![
                candidate("d1", "a"),
                candidate("d2", "b"),
                candidate("d3", "c"),
            ],
        );
        let ev = Evaluator::from_facts(std::iter::empty::<(String, String)>(), 2);
        let records = ev.evaluate(&backend, &[positive_query("d3", 100, "HR")]);
        assert!(!records[0].hit);
    }
}
