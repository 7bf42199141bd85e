use std::fmt;

use serde::{Deserialize, Serialize};

/// One synthetic knowledge-base document. Generated once per fixture and
/// immutable afterwards; `key_fact_value` is the ground truth a correct
/// retrieval must surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub content: String,
    pub topic: String,
    pub department: String,
    pub status: DocStatus,
    pub key_fact_value: i64,
    pub metadata: DocMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocMetadata {
    pub source: String,
    pub access_level: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocStatus {
    Draft,
    Final,
    Archived,
    Deprecated,
}

impl DocStatus {
    pub const ALL: &'static [DocStatus] = &[
        DocStatus::Draft,
        DocStatus::Final,
        DocStatus::Archived,
        DocStatus::Deprecated,
    ];
}

impl fmt::Display for DocStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "Draft"),
            Self::Final => write!(f, "Final"),
            Self::Archived => write!(f, "Archived"),
            Self::Deprecated => write!(f, "Deprecated"),
        }
    }
}

impl std::str::FromStr for DocStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(Self::Draft),
            "Final" => Ok(Self::Final),
            "Archived" => Ok(Self::Archived),
            "Deprecated" => Ok(Self::Deprecated),
            _ => Err(format!("invalid document status: {s}")),
        }
    }
}

/// A benchmark query with its ground truth. `expected_fact == None` marks a
/// cross-scope negative probe: the fact must NOT surface for this context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub query_id: String,
    pub query_text: String,
    pub target_doc_id: String,
    pub expected_fact: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_context: Option<UserContext>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserContext {
    pub department: String,
    pub role: String,
}

/// One ranked answer from a retrieval backend. `id` is present only for
/// backends whose candidates carry stable source ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Option<String>,
    pub text: String,
    pub score: Option<f32>,
}
