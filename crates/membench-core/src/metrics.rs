//! Metric aggregation over evaluation records.

use std::time::Duration;

use crate::backend::IngestSummary;
use crate::eval::EvaluationRecord;

/// Sample quantile with linear interpolation between closest ranks.
/// `pct` is in [0, 100]. Empty input yields 0.
pub fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = pct.clamp(0.0, 100.0) / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

pub fn hit_rate(records: &[EvaluationRecord]) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().filter(|r| r.hit).count() as f64 / records.len() as f64
}

/// Aggregated metrics for one backend over one query replay.
#[derive(Debug, Clone)]
pub struct BackendSummary {
    pub label: String,
    pub queries: usize,
    pub hits: usize,
    pub hit_rate: f64,
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
    pub failed_queries: usize,
    pub ingest_attempted: usize,
    pub ingest_failed: usize,
}

impl BackendSummary {
    pub fn is_degraded(&self) -> bool {
        self.failed_queries > 0 || self.ingest_failed > 0
    }
}

pub fn summarize(records: &[EvaluationRecord], ingest: IngestSummary) -> BackendSummary {
    let label = records
        .first()
        .map(|r| r.system.clone())
        .unwrap_or_default();
    let latencies: Vec<f64> = records.iter().map(|r| r.latency.as_secs_f64()).collect();

    BackendSummary {
        label,
        queries: records.len(),
        hits: records.iter().filter(|r| r.hit).count(),
        hit_rate: hit_rate(records),
        p50: Duration::from_secs_f64(percentile(&latencies, 50.0)),
        p95: Duration::from_secs_f64(percentile(&latencies, 95.0)),
        p99: Duration::from_secs_f64(percentile(&latencies, 99.0)),
        failed_queries: records.iter().filter(|r| r.failed).count(),
        ingest_attempted: ingest.attempted,
        ingest_failed: ingest.failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(hit: bool, latency: f64) -> EvaluationRecord {
        EvaluationRecord {
            query_id: "q".into(),
            latency: Duration::from_secs_f64(latency),
            hit,
            system: "test".into(),
            failed: false,
        }
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let values = [0.1, 0.2, 0.3, 0.4];
        assert!((percentile(&values, 50.0) - 0.25).abs() < 1e-9);
        assert!((percentile(&values, 100.0) - 0.4).abs() < 1e-9);
        assert!((percentile(&values, 0.0) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_unsorted_input() {
        let values = [0.4, 0.1, 0.3, 0.2];
        assert!((percentile(&values, 50.0) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_degenerate() {
        assert_eq!(percentile(&[], 50.0), 0.0);
        assert!((percentile(&[0.7], 99.0) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_hit_rate() {
        let records: Vec<_> = [true, true, false, true, false]
            .into_iter()
            .map(|h| record(h, 0.01))
            .collect();
        assert!((hit_rate(&records) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_summarize() {
        let records: Vec<_> = [true, false, true, true]
            .into_iter()
            .enumerate()
            .map(|(i, h)| record(h, 0.1 * (i + 1) as f64))
            .collect();

        let summary = summarize(
            &records,
            IngestSummary {
                attempted: 10,
                failed: 1,
            },
        );
        assert_eq!(summary.label, "test");
        assert_eq!(summary.queries, 4);
        assert_eq!(summary.hits, 3);
        assert!((summary.hit_rate - 0.75).abs() < 1e-9);
        assert!((summary.p50.as_secs_f64() - 0.25).abs() < 1e-6);
        assert_eq!(summary.ingest_failed, 1);
        assert!(summary.is_degraded());
    }
}
