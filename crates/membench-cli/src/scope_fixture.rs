//! Hand-authored fixture for the scoped-memory benchmark variant.
//!
//! Three simulated users with distinct stored facts, plus a fixed probe
//! list. The two cross-scope probes carry no expected fact: they pass only
//! when nothing from a foreign identity surfaces.

use membench_core::{DocMetadata, DocStatus, Document, Query, UserContext};

pub struct SeedFact {
    pub id: &'static str,
    pub identity: &'static str,
    pub department: &'static str,
    pub content: &'static str,
    pub fact: Option<i64>,
}

pub const IDENTITIES: &[&str] = &["user_engineering", "user_hr", "user_sales"];

pub const SEED_FACTS: &[SeedFact] = &[
    SeedFact {
        id: "eng-travel",
        identity: "user_engineering",
        department: "Engineering",
        content: "My travel allowance limit is $4662 per quarter.",
        fact: Some(4662),
    },
    SeedFact {
        id: "eng-expense",
        identity: "user_engineering",
        department: "Engineering",
        content: "My expense reimbursement limit is $206 per month.",
        fact: Some(206),
    },
    SeedFact {
        id: "eng-role",
        identity: "user_engineering",
        department: "Engineering",
        content: "I work in the Engineering department and focus on backend systems.",
        fact: None,
    },
    SeedFact {
        id: "hr-expense",
        identity: "user_hr",
        department: "HR",
        content: "My expense reimbursement limit is $2343 per month.",
        fact: Some(2343),
    },
    SeedFact {
        id: "hr-privacy",
        identity: "user_hr",
        department: "HR",
        content: "The data privacy policy limit is $1095 for training materials.",
        fact: Some(1095),
    },
    SeedFact {
        id: "hr-onboarding",
        identity: "user_hr",
        department: "HR",
        content: "The onboarding budget is $1691 per new hire.",
        fact: Some(1691),
    },
    SeedFact {
        id: "hr-role",
        identity: "user_hr",
        department: "HR",
        content: "I work in HR and handle employee relations.",
        fact: None,
    },
    SeedFact {
        id: "sales-quota",
        identity: "user_sales",
        department: "Sales",
        content: "My quarterly sales quota is $250000.",
        fact: Some(250000),
    },
    SeedFact {
        id: "sales-entertainment",
        identity: "user_sales",
        department: "Sales",
        content: "My expense limit for client entertainment is $500 per event.",
        fact: Some(500),
    },
];

struct Probe {
    id: &'static str,
    identity: &'static str,
    text: &'static str,
    target: &'static str,
    expected: Option<i64>,
}

const PROBES: &[Probe] = &[
    Probe {
        id: "probe-eng-travel",
        identity: "user_engineering",
        text: "What is my travel allowance limit?",
        target: "eng-travel",
        expected: Some(4662),
    },
    Probe {
        id: "probe-eng-expense",
        identity: "user_engineering",
        text: "How much can I expense each month?",
        target: "eng-expense",
        expected: Some(206),
    },
    Probe {
        id: "probe-hr-expense",
        identity: "user_hr",
        text: "What is my expense reimbursement limit?",
        target: "hr-expense",
        expected: Some(2343),
    },
    Probe {
        id: "probe-hr-privacy",
        identity: "user_hr",
        text: "What is the data privacy policy limit?",
        target: "hr-privacy",
        expected: Some(1095),
    },
    Probe {
        id: "probe-hr-onboarding",
        identity: "user_hr",
        text: "What is the onboarding budget?",
        target: "hr-onboarding",
        expected: Some(1691),
    },
    // Cross-scope probes: the fact lives under another identity.
    Probe {
        id: "probe-eng-cross-onboarding",
        identity: "user_engineering",
        text: "What is the onboarding budget?",
        target: "hr-onboarding",
        expected: None,
    },
    Probe {
        id: "probe-hr-cross-travel",
        identity: "user_hr",
        text: "What is my travel allowance?",
        target: "eng-travel",
        expected: None,
    },
];

pub fn department_for(identity: &str) -> &'static str {
    match identity {
        "user_engineering" => "Engineering",
        "user_hr" => "HR",
        "user_sales" => "Sales",
        other => panic!("unknown identity in fixture: {other}"),
    }
}

/// Probe queries paired with the identity that asks them.
pub fn probes() -> Vec<(&'static str, Query)> {
    PROBES
        .iter()
        .map(|p| {
            (
                p.identity,
                Query {
                    query_id: p.id.to_string(),
                    query_text: p.text.to_string(),
                    target_doc_id: p.target.to_string(),
                    expected_fact: p.expected,
                    user_context: Some(UserContext {
                        department: department_for(p.identity).to_string(),
                        role: "Employee".to_string(),
                    }),
                },
            )
        })
        .collect()
}

fn seed_to_document(fact: &SeedFact) -> Document {
    Document {
        id: fact.id.to_string(),
        title: format!("{} memory", fact.identity),
        content: fact.content.to_string(),
        topic: "conversational".to_string(),
        department: fact.department.to_string(),
        status: DocStatus::Final,
        key_fact_value: fact.fact.unwrap_or(0),
        metadata: DocMetadata {
            source: "memory_seed".to_string(),
            access_level: "internal".to_string(),
            version: "1.0".to_string(),
        },
    }
}

/// All seed facts as documents, for mirroring into an unscoped flat index.
pub fn seed_documents() -> Vec<Document> {
    SEED_FACTS.iter().map(seed_to_document).collect()
}

/// The seed facts belonging to one identity.
pub fn seed_documents_for(identity: &str) -> Vec<Document> {
    SEED_FACTS
        .iter()
        .filter(|f| f.identity == identity)
        .map(seed_to_document)
        .collect()
}

/// (department, fact literal) pairs for scoring negative probes. Seeds
/// without a numeric fact contribute nothing.
pub fn fact_table() -> Vec<(String, String)> {
    SEED_FACTS
        .iter()
        .filter_map(|f| {
            f.fact
                .map(|v| (f.department.to_string(), v.to_string()))
        })
        .collect()
}
