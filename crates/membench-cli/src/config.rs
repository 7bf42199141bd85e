//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$MEMBENCH_CONFIG` environment variable
//! 2. `~/.config/membench/config.toml`
//! 3. Built-in defaults (everything is optional)
//!
//! The memory service API key is NOT configurable here; it comes only from
//! the `MEMBENCH_API_KEY` environment variable.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fixture: FixtureConfig,
    pub index: IndexConfig,
    pub memory: MemoryConfig,
    pub bench: BenchConfig,
}

/// Fixture file locations.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Directory holding the corpus and query files. Default: current dir.
    pub dir: Option<String>,
}

/// Flat index storage settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// SQLite index path. Default: platform-specific data dir.
    pub db_path: Option<String>,
}

/// Remote memory service settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub base_url: String,
    /// Identity used for whole-corpus runs (`membench run`).
    pub identity: String,
}

/// Benchmark shape defaults, overridable per command.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    pub docs: usize,
    pub queries: usize,
    pub top_k: usize,
}

// --- Defaults ---

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".into(),
            identity: "benchmark_user_hq".into(),
        }
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            docs: 50,
            queries: 1000,
            top_k: 3,
        }
    }
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    let path = config_path();

    if let Some(p) = &path {
        if p.exists() {
            let content =
                std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            let config: Config =
                toml::from_str(&content).with_context(|| format!("parsing {}", p.display()))?;
            return Ok(config);
        }
    }

    Ok(Config::default())
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    // 1. Environment variable
    if let Ok(p) = std::env::var("MEMBENCH_CONFIG") {
        return Some(PathBuf::from(p));
    }

    // 2. ~/.config/membench/config.toml
    if let Some(home) = dirs_home() {
        let p = home.join(".config").join("membench").join("config.toml");
        return Some(p);
    }

    None
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Show the active config path (for `membench config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bench.docs, 50);
        assert_eq!(config.bench.queries, 1000);
        assert_eq!(config.bench.top_k, 3);
        assert_eq!(config.memory.identity, "benchmark_user_hq");
        assert!(config.fixture.dir.is_none());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[bench]
top_k = 5
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.bench.top_k, 5);
        // Other fields should be defaults
        assert_eq!(config.bench.docs, 50);
        assert_eq!(config.memory.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[fixture]
dir = "/tmp/fixtures"

[index]
db_path = "/tmp/index.db"

[memory]
base_url = "https://memories.example.net"
identity = "bench_user_2"

[bench]
docs = 100
queries = 500
top_k = 1
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.fixture.dir.as_deref(), Some("/tmp/fixtures"));
        assert_eq!(config.index.db_path.as_deref(), Some("/tmp/index.db"));
        assert_eq!(config.memory.base_url, "https://memories.example.net");
        assert_eq!(config.bench.docs, 100);
        assert_eq!(config.bench.top_k, 1);
    }
}
