//! Thin JSON client for the remote memory service.
//!
//! The service owns storage, similarity ranking and identity isolation;
//! this client only shapes requests and tolerates sloppy responses. The API
//! key comes from the environment, never from source or config files.

use serde_json::{json, Value};

use membench_core::{BenchError, BenchResult, Candidate};

pub const API_KEY_ENV: &str = "MEMBENCH_API_KEY";

pub struct MemoryServiceClient {
    agent: ureq::Agent,
    base_url: String,
    api_key: String,
}

impl MemoryServiceClient {
    /// Build a client for `base_url`, reading the API key from
    /// `MEMBENCH_API_KEY`. Fails with a config error when the key is unset.
    pub fn new(base_url: impl Into<String>) -> BenchResult<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| {
            BenchError::Config(format!(
                "{API_KEY_ENV} is not set — export the memory service API key first"
            ))
        })?;
        Ok(Self::with_key(base_url, api_key))
    }

    pub fn with_key(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            agent: ureq::agent(),
            base_url,
            api_key: api_key.into(),
        }
    }

    /// Store one piece of content under `identity`.
    pub fn add(&self, content: &str, identity: &str) -> BenchResult<()> {
        let body = json!({
            "messages": [{ "role": "user", "content": content }],
            "user_id": identity,
        });
        self.post("/v1/memories", body)?;
        Ok(())
    }

    /// Search memories constrained to `identity`.
    pub fn search(&self, query: &str, identity: &str, limit: usize) -> BenchResult<Vec<Candidate>> {
        let body = json!({
            "query": query,
            "filters": { "user_id": identity },
            "limit": limit,
        });
        let value = self.post("/v1/memories/search", body)?;
        Ok(parse_candidates(&value))
    }

    /// Delete every memory stored under `identity`.
    pub fn delete_all(&self, identity: &str) -> BenchResult<()> {
        let url = format!("{}/v1/memories?user_id={identity}", self.base_url);
        self.agent
            .delete(&url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .call()
            .map_err(|e| BenchError::Remote(e.to_string()))?;
        Ok(())
    }

    fn post(&self, path: &str, body: Value) -> BenchResult<Value> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .agent
            .post(&url)
            .set("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(body)
            .map_err(|e| BenchError::Remote(e.to_string()))?;
        response
            .into_json()
            .map_err(|e| BenchError::Remote(format!("invalid response body: {e}")))
    }
}

/// Extract candidates from a search payload. The service usually answers
/// `{"results": [{"id", "memory", "score"}, ...]}` but some deployments
/// return a bare array; anything else counts as an empty result set.
pub fn parse_candidates(value: &Value) -> Vec<Candidate> {
    let results = match value.get("results").and_then(Value::as_array) {
        Some(r) => r,
        None => match value.as_array() {
            Some(r) => r,
            None => return Vec::new(),
        },
    };

    results
        .iter()
        .filter_map(|r| {
            let text = r.get("memory").and_then(Value::as_str)?;
            Some(Candidate {
                id: r.get("id").and_then(Value::as_str).map(String::from),
                text: text.to_string(),
                score: r.get("score").and_then(Value::as_f64).map(|s| s as f32),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_candidates_results_object() {
        let value = json!({
            "results": [
                { "id": "m1", "memory": "travel allowance is $4662", "score": 0.91 },
                { "id": "m2", "memory": "expense limit is $206", "score": 0.73 },
            ]
        });
        let candidates = parse_candidates(&value);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].id.as_deref(), Some("m1"));
        assert_eq!(candidates[0].text, "travel allowance is $4662");
        assert!((candidates[1].score.unwrap() - 0.73).abs() < 1e-6);
    }

    #[test]
    fn test_parse_candidates_bare_array() {
        let value = json!([{ "memory": "quota is $250000" }]);
        let candidates = parse_candidates(&value);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].id.is_none());
        assert!(candidates[0].score.is_none());
    }

    #[test]
    fn test_parse_candidates_malformed_is_empty() {
        assert!(parse_candidates(&json!({})).is_empty());
        assert!(parse_candidates(&json!({ "error": "rate limited" })).is_empty());
        assert!(parse_candidates(&json!(null)).is_empty());
        // Entries without a memory field are skipped, not errors.
        let partial = json!({ "results": [{ "id": "m1" }, { "memory": "ok" }] });
        assert_eq!(parse_candidates(&partial).len(), 1);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = MemoryServiceClient::with_key("http://localhost:8080///", "k");
        assert_eq!(client.base_url, "http://localhost:8080");
    }
}
