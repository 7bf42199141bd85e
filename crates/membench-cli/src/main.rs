mod config;
mod report;
mod scope_fixture;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

use membench_core::{
    corpus, fixture, metrics, Embedder, EvaluationRecord, Evaluator, IngestSummary, Query,
    RetrievalBackend,
};
use membench_index::VectorIndex;
use membench_memory::{MemoryServiceClient, ScopedMemoryBackend, API_KEY_ENV};

use crate::config::{load_config, show_config_path, Config};

#[derive(Parser)]
#[command(
    name = "membench",
    version,
    about = "Retrieval benchmark: flat vector index vs identity-scoped memory service"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh corpus and query fixture
    Generate {
        /// Number of documents
        #[arg(long)]
        docs: Option<usize>,

        /// Number of queries
        #[arg(long)]
        queries: Option<usize>,

        /// RNG seed for a reproducible fixture
        #[arg(long)]
        seed: Option<u64>,

        /// Fixture directory
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Replay the persisted fixture against the selected backends
    Run {
        /// Which backend(s) to evaluate
        #[arg(long, value_enum, default_value = "both")]
        backend: BackendKind,

        /// Regenerate the fixture before running instead of replaying it
        #[arg(long)]
        fresh: bool,

        /// Candidates considered per query
        #[arg(long)]
        top_k: Option<usize>,

        /// Detailed results CSV path
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Fixture directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// RNG seed used with --fresh
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the conversational fixture: per-identity scoped memories vs an
    /// unscoped flat mirror of the same facts
    Scoped {
        /// Wipe and re-seed the remote memories instead of replaying them
        #[arg(long)]
        fresh: bool,

        /// Detailed results CSV path
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// List memories stored in the remote service per identity
    Inspect {
        /// Single identity to inspect (default: all fixture identities)
        #[arg(short, long)]
        identity: Option<String>,

        /// Broad search query used for listing
        #[arg(short, long, default_value = "expense limit policy threshold")]
        query: String,

        /// Maximum results per identity
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Show the resolved configuration
    Config,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    Flat,
    Memory,
    Both,
}

impl BackendKind {
    fn wants_flat(self) -> bool {
        matches!(self, Self::Flat | Self::Both)
    }

    fn wants_memory(self) -> bool {
        matches!(self, Self::Memory | Self::Both)
    }
}

#[cfg(feature = "embeddings")]
fn init_embedder() -> Result<Arc<dyn Embedder>> {
    Ok(Arc::new(membench_core::FastEmbedder::new()))
}

#[cfg(not(feature = "embeddings"))]
fn init_embedder() -> Result<Arc<dyn Embedder>> {
    anyhow::bail!("the flat-index backend needs the `embeddings` feature — rebuild with `--features embeddings`")
}

fn seed_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn fixture_dir(cfg: &Config, dir: Option<PathBuf>) -> PathBuf {
    dir.or_else(|| cfg.fixture.dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn index_db_path(cfg: &Config) -> PathBuf {
    if let Some(p) = &cfg.index.db_path {
        return PathBuf::from(p);
    }
    directories::ProjectDirs::from("dev", "membench", "membench")
        .map(|dirs| dirs.data_dir().join("index.db"))
        .unwrap_or_else(|| PathBuf::from("index.db"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .init();

    let cli = Cli::parse();
    let cfg = load_config()?;

    match cli.command {
        Commands::Generate {
            docs,
            queries,
            seed,
            dir,
        } => cmd_generate(&cfg, docs, queries, seed, dir),
        Commands::Run {
            backend,
            fresh,
            top_k,
            csv,
            dir,
            seed,
        } => cmd_run(&cfg, backend, fresh, top_k, csv, dir, seed),
        Commands::Scoped { fresh, csv } => cmd_scoped(&cfg, fresh, csv),
        Commands::Inspect {
            identity,
            query,
            limit,
        } => cmd_inspect(&cfg, identity, &query, limit),
        Commands::Config => cmd_config(&cfg),
    }
}

fn generate_fixture(
    cfg: &Config,
    docs: Option<usize>,
    queries: Option<usize>,
    seed: Option<u64>,
    dir: &PathBuf,
) -> Result<(Vec<membench_core::Document>, Vec<Query>)> {
    let n_docs = docs.unwrap_or(cfg.bench.docs);
    let n_queries = queries.unwrap_or(cfg.bench.queries);
    let mut rng = seed_rng(seed);

    let corpus_docs = corpus::generate_corpus(n_docs, &mut rng);
    let query_set = corpus::generate_queries(&corpus_docs, n_queries, &mut rng);

    let corpus_path = dir.join(fixture::CORPUS_FILE);
    let query_path = dir.join(fixture::QUERY_FILE);
    fixture::save_corpus(&corpus_path, &corpus_docs)
        .with_context(|| format!("writing {}", corpus_path.display()))?;
    fixture::save_queries(&query_path, &query_set)
        .with_context(|| format!("writing {}", query_path.display()))?;

    println!(
        "Generated {} documents -> {}",
        corpus_docs.len(),
        corpus_path.display()
    );
    println!(
        "Generated {} queries -> {}",
        query_set.len(),
        query_path.display()
    );

    Ok((corpus_docs, query_set))
}

fn cmd_generate(
    cfg: &Config,
    docs: Option<usize>,
    queries: Option<usize>,
    seed: Option<u64>,
    dir: Option<PathBuf>,
) -> Result<()> {
    let dir = fixture_dir(cfg, dir);
    generate_fixture(cfg, docs, queries, seed, &dir)?;
    Ok(())
}

fn cmd_run(
    cfg: &Config,
    backend: BackendKind,
    fresh: bool,
    top_k: Option<usize>,
    csv: Option<PathBuf>,
    dir: Option<PathBuf>,
    seed: Option<u64>,
) -> Result<()> {
    let dir = fixture_dir(cfg, dir);

    let (docs, queries) = if fresh {
        generate_fixture(cfg, None, None, seed, &dir)?
    } else {
        let corpus_path = dir.join(fixture::CORPUS_FILE);
        let query_path = dir.join(fixture::QUERY_FILE);
        let docs = fixture::load_corpus(&corpus_path)?;
        let queries = fixture::load_queries(&query_path)?;
        (docs, queries)
    };

    println!(
        "Benchmarking with {} documents and {} queries",
        docs.len(),
        queries.len()
    );

    let evaluator = Evaluator::new(&docs, top_k.unwrap_or(cfg.bench.top_k));
    let mut summaries = Vec::new();
    let mut all_records: Vec<EvaluationRecord> = Vec::new();

    if backend.wants_flat() {
        let embedder = init_embedder()?;
        let mut index = VectorIndex::new(&index_db_path(cfg), embedder)
            .context("constructing flat index")?;

        let started = Instant::now();
        let ingest = index.ingest(&docs)?;
        println!(
            "flat-index: ingested {} documents in {}",
            ingest.attempted - ingest.failed,
            report::format_duration(started.elapsed())
        );

        let records = evaluator.evaluate(&index, &queries);
        summaries.push(metrics::summarize(&records, ingest));
        all_records.extend(records);
    }

    if backend.wants_memory() {
        let client = MemoryServiceClient::new(&cfg.memory.base_url)?;
        let mut memory = ScopedMemoryBackend::new(client, &cfg.memory.identity);

        let started = Instant::now();
        let ingest = memory.ingest(&docs)?;
        println!(
            "scoped-memory: ingested {} documents in {}",
            ingest.attempted - ingest.failed,
            report::format_duration(started.elapsed())
        );

        let records = evaluator.evaluate(&memory, &queries);
        summaries.push(metrics::summarize(&records, ingest));
        all_records.extend(records);
    }

    report::print_comparison(&summaries);

    let csv_path = csv.unwrap_or_else(|| dir.join("benchmark_results_detailed.csv"));
    report::write_csv(&csv_path, &all_records)?;
    println!("Detailed results written to {}", csv_path.display());

    Ok(())
}

fn cmd_scoped(cfg: &Config, fresh: bool, csv: Option<PathBuf>) -> Result<()> {
    let evaluator = Evaluator::from_facts(scope_fixture::fact_table(), cfg.bench.top_k);
    let probes = scope_fixture::probes();
    let mut summaries = Vec::new();
    let mut all_records: Vec<EvaluationRecord> = Vec::new();

    // Flat mirror: every identity's facts in one unscoped index. The mirror
    // ignores caller context, so it must tell users apart from the query
    // text alone.
    let embedder = init_embedder()?;
    let mut mirror = VectorIndex::in_memory(embedder)?.context_filter(false);
    let mirror_ingest = mirror.ingest(&scope_fixture::seed_documents())?;
    let mirror_queries: Vec<Query> = probes.iter().map(|(_, q)| q.clone()).collect();
    let records = evaluator.evaluate(&mirror, &mirror_queries);
    summaries.push(metrics::summarize(&records, mirror_ingest));
    all_records.extend(records);

    // Scoped memory: one backend per identity, each answering only its own
    // probes against the remote service.
    let mut memory_records: Vec<EvaluationRecord> = Vec::new();
    let mut memory_ingest = IngestSummary::default();
    for identity in scope_fixture::IDENTITIES {
        let client = MemoryServiceClient::new(&cfg.memory.base_url)?;
        let mut backend = ScopedMemoryBackend::new(client, *identity);

        if fresh {
            let seeds = scope_fixture::seed_documents_for(identity);
            let ingest = backend.ingest(&seeds)?;
            println!(
                "{identity}: seeded {} memories",
                ingest.attempted - ingest.failed
            );
            memory_ingest.attempted += ingest.attempted;
            memory_ingest.failed += ingest.failed;
        }

        let own: Vec<Query> = probes
            .iter()
            .filter(|(id, _)| id == identity)
            .map(|(_, q)| q.clone())
            .collect();
        memory_records.extend(evaluator.evaluate(&backend, &own));
    }
    summaries.push(metrics::summarize(&memory_records, memory_ingest));
    all_records.extend(memory_records);

    report::print_comparison(&summaries);

    let csv_path = csv.unwrap_or_else(|| PathBuf::from("conversational_benchmark_results.csv"));
    report::write_csv(&csv_path, &all_records)?;
    println!("Detailed results written to {}", csv_path.display());

    Ok(())
}

fn cmd_inspect(cfg: &Config, identity: Option<String>, query: &str, limit: usize) -> Result<()> {
    let client = MemoryServiceClient::new(&cfg.memory.base_url)?;

    let identities: Vec<String> = match identity {
        Some(id) => vec![id],
        None => {
            let mut ids: Vec<String> = scope_fixture::IDENTITIES
                .iter()
                .map(|s| s.to_string())
                .collect();
            ids.push(cfg.memory.identity.clone());
            ids
        }
    };

    println!("Searching memories with query: {query:?}\n");
    for id in &identities {
        match client.search(query, id, limit) {
            Ok(results) => {
                println!("--- {id}: {} results ---", results.len());
                for c in &results {
                    let score = c.score.unwrap_or(0.0);
                    let text: String = c.text.chars().take(120).collect();
                    println!("  [{score:.2}] {text}");
                }
            }
            Err(e) => println!("--- {id}: error: {e} ---"),
        }
    }

    Ok(())
}

fn cmd_config(cfg: &Config) -> Result<()> {
    println!("config file:     {}", show_config_path());
    println!(
        "fixture dir:     {}",
        cfg.fixture.dir.as_deref().unwrap_or(".")
    );
    println!("index db:        {}", index_db_path(cfg).display());
    println!("memory base_url: {}", cfg.memory.base_url);
    println!("memory identity: {}", cfg.memory.identity);
    println!(
        "api key:         {}",
        if std::env::var(API_KEY_ENV).is_ok() {
            "set"
        } else {
            "NOT SET"
        }
    );
    println!(
        "bench defaults:  {} docs, {} queries, top_k {}",
        cfg.bench.docs, cfg.bench.queries, cfg.bench.top_k
    );
    Ok(())
}
