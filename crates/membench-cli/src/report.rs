//! Console comparison table and CSV detail output.

use std::path::Path;
use std::time::Duration;

use membench_core::{BackendSummary, BenchResult, EvaluationRecord};

pub fn print_comparison(summaries: &[BackendSummary]) {
    if summaries.is_empty() {
        return;
    }
    let width = 18 + 16 * summaries.len();

    println!();
    println!("Benchmark Report");
    println!("{}", "─".repeat(width));
    print!("{:<18}", "Metric");
    for s in summaries {
        print!("{:>16}", s.label);
    }
    println!();
    println!("{}", "─".repeat(width));

    print_row("Queries", summaries, |s| s.queries.to_string());
    print_row("Hit rate", summaries, |s| {
        format!("{:.2}%", s.hit_rate * 100.0)
    });
    print_row("p50 latency", summaries, |s| format_duration(s.p50));
    print_row("p95 latency", summaries, |s| format_duration(s.p95));
    print_row("p99 latency", summaries, |s| format_duration(s.p99));
    println!("{}", "─".repeat(width));

    for s in summaries.iter().filter(|s| s.is_degraded()) {
        println!(
            "degraded: {}: {} failed queries, {} of {} documents rejected at ingest",
            s.label, s.failed_queries, s.ingest_failed, s.ingest_attempted
        );
    }
}

fn print_row(label: &str, summaries: &[BackendSummary], cell: impl Fn(&BackendSummary) -> String) {
    print!("{:<18}", label);
    for s in summaries {
        print!("{:>16}", cell(s));
    }
    println!();
}

pub fn format_duration(d: Duration) -> String {
    let ms = d.as_secs_f64() * 1000.0;
    if ms < 0.001 {
        format!("{:.1} ns", ms * 1_000_000.0)
    } else if ms < 1.0 {
        format!("{:.1} µs", ms * 1000.0)
    } else if ms < 1000.0 {
        format!("{:.1} ms", ms)
    } else {
        format!("{:.2} s", ms / 1000.0)
    }
}

/// One row per (backend, query) pair; overwritten each run.
pub fn write_csv(path: &Path, records: &[EvaluationRecord]) -> BenchResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut out = String::from("query_id,latency,hit,system\n");
    for r in records {
        out.push_str(&format!(
            "{},{:.6},{},{}\n",
            r.query_id,
            r.latency.as_secs_f64(),
            r.hit,
            r.system
        ));
    }
    std::fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_scales() {
        assert_eq!(format_duration(Duration::from_micros(250)), "250.0 µs");
        assert_eq!(format_duration(Duration::from_millis(42)), "42.0 ms");
        assert_eq!(format_duration(Duration::from_secs(2)), "2.00 s");
    }

    #[test]
    fn test_write_csv_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("details.csv");

        let records = vec![
            EvaluationRecord {
                query_id: "q1".into(),
                latency: Duration::from_secs_f64(0.003),
                hit: true,
                system: "flat-index".into(),
                failed: false,
            },
            EvaluationRecord {
                query_id: "q2".into(),
                latency: Duration::ZERO,
                hit: false,
                system: "scoped-memory".into(),
                failed: true,
            },
        ];
        write_csv(&path, &records).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "query_id,latency,hit,system");
        assert_eq!(lines[1], "q1,0.003000,true,flat-index");
        assert_eq!(lines[2], "q2,0.000000,false,scoped-memory");
    }
}
