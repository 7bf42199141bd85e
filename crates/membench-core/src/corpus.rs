//! Synthetic corpus and query generation.
//!
//! Documents are corporate policy lookalikes: randomized department, topic,
//! type and status axes, a numeric "approved limit" embedded in the body as
//! the ground-truth fact, and filler prose from fixed word pools. Colliding
//! documents (same topic and department, different status/version) are
//! intentional; query generation resolves them through [`authoritative`].

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::document::{DocMetadata, DocStatus, Document, Query, UserContext};

pub const DEPARTMENTS: &[&str] = &["Engineering", "HR", "Sales", "Legal", "Compliance"];

pub const TOPICS: &[&str] = &[
    "Remote Work",
    "Expense Reimbursement",
    "Cloud Security",
    "Hiring Process",
    "Code Review",
    "Incident Response",
    "Data Privacy",
    "Travel Allowance",
    "Procurement",
    "Onboarding",
];

pub const DOC_TYPES: &[&str] = &[
    "Policy",
    "Standard Operating Procedure",
    "Meeting Notes",
    "Proposal",
];

const VERSIONS: &[&str] = &["1.0", "1.1", "2.0"];

const FACT_MIN: i64 = 100;
const FACT_MAX: i64 = 5000;

const AUTHORS: &[&str] = &[
    "Dana Whitfield",
    "Marcus Oyelaran",
    "Priya Ramanathan",
    "Tomasz Kowalczyk",
    "Leah Brandt",
    "Victor Ashby",
    "Ingrid Solheim",
    "Rafael Quintero",
];

const FILLER: &[&str] = &[
    "stakeholders",
    "should",
    "review",
    "the",
    "relevant",
    "documentation",
    "before",
    "submitting",
    "requests",
    "approval",
    "workflows",
    "remain",
    "subject",
    "to",
    "quarterly",
    "audit",
    "teams",
    "are",
    "expected",
    "follow",
    "established",
    "escalation",
    "paths",
    "and",
    "record",
    "decisions",
    "in",
    "tracking",
    "system",
    "exceptions",
    "require",
    "written",
    "signoff",
];

fn sentence(rng: &mut StdRng) -> String {
    let len = rng.gen_range(6..=12);
    let mut words: Vec<&str> = (0..len)
        .map(|_| *FILLER.choose(rng).expect("pool is non-empty"))
        .collect();
    let first = words[0];
    let capitalized = format!(
        "{}{}",
        first[..1].to_uppercase(),
        &first[1..]
    );
    words.remove(0);
    format!("{capitalized} {}.", words.join(" "))
}

fn paragraph(rng: &mut StdRng, sentences: usize) -> String {
    (0..sentences)
        .map(|_| sentence(rng))
        .collect::<Vec<_>>()
        .join(" ")
}

fn slug(s: &str) -> String {
    s.to_lowercase().replace(' ', "-")
}

fn render_content(
    rng: &mut StdRng,
    id: &str,
    title: &str,
    topic: &str,
    department: &str,
    doc_type: &str,
    status: DocStatus,
    fact: i64,
) -> String {
    let author = AUTHORS.choose(rng).expect("pool is non-empty");
    let updated = chrono::Utc::now() - chrono::Duration::days(rng.gen_range(0..730));
    format!(
        "# {title}\n\
         **ID**: {id}\n\
         **Department**: {department}\n\
         **Status**: {status}\n\
         **Last Updated**: {}\n\
         **Author**: {author}\n\
         \n\
         ## 1. Executive Summary\n\
         {}\n\
         \n\
         ## 2. {topic} Guidelines\n\
         The objective of this {doc_type} is to define the boundaries for {department} regarding {topic}.\n\
         {}\n\
         \n\
         ### Key Thresholds & Limits\n\
         > **CRITICAL**: The current approved limit for {topic} is **${fact}** (or equivalent units). This supersedes all previous memos.\n\
         \n\
         ## 3. Compliance and Exceptions\n\
         Any exceptions to the ${fact} rule must be approved by the VP of {department}.\n\
         {}\n\
         \n\
         ## 4. References\n\
         - Internal Wiki: https://wiki.internal/{}/{}\n\
         - Slack Channel: #{}-{}\n",
        updated.format("%Y-%m-%d"),
        paragraph(rng, 3),
        paragraph(rng, 5),
        paragraph(rng, 4),
        slug(department),
        slug(topic),
        slug(department),
        slug(topic),
    )
}

/// Generate `count` documents with independently sampled axes. The key fact
/// value lands in the body as a literal numeral twice: once in the
/// guidelines threshold line and once in the compliance exception line.
pub fn generate_corpus(count: usize, rng: &mut StdRng) -> Vec<Document> {
    let mut docs = Vec::with_capacity(count);

    for _ in 0..count {
        let topic = *TOPICS.choose(rng).expect("pool is non-empty");
        let department = *DEPARTMENTS.choose(rng).expect("pool is non-empty");
        let doc_type = *DOC_TYPES.choose(rng).expect("pool is non-empty");
        let status = *DocStatus::ALL.choose(rng).expect("pool is non-empty");
        let fact = rng.gen_range(FACT_MIN..=FACT_MAX);

        let id = ulid::Ulid::new().to_string();
        let title = format!("{department} {topic} {doc_type}");
        let content =
            render_content(rng, &id, &title, topic, department, doc_type, status, fact);

        docs.push(Document {
            id,
            title,
            content,
            topic: topic.to_string(),
            department: department.to_string(),
            status,
            key_fact_value: fact,
            metadata: DocMetadata {
                source: "internal_wiki".to_string(),
                access_level: "internal".to_string(),
                version: VERSIONS.choose(rng).expect("pool is non-empty").to_string(),
            },
        });
    }

    docs
}

fn status_rank(status: DocStatus) -> u8 {
    match status {
        DocStatus::Final => 3,
        DocStatus::Draft => 2,
        DocStatus::Archived => 1,
        DocStatus::Deprecated => 0,
    }
}

/// Index of the authoritative document per (topic, department) group:
/// `Final` supersedes `Draft`, `Archived` and `Deprecated`; ties resolve to
/// the highest version, then to the latest-generated document.
pub fn authoritative(corpus: &[Document]) -> HashMap<(String, String), usize> {
    let mut best: HashMap<(String, String), usize> = HashMap::new();

    for (i, doc) in corpus.iter().enumerate() {
        let key = (doc.topic.clone(), doc.department.clone());
        match best.get(&key) {
            Some(&j) => {
                let current = &corpus[j];
                let candidate = (status_rank(doc.status), doc.metadata.version.as_str(), i);
                let incumbent = (
                    status_rank(current.status),
                    current.metadata.version.as_str(),
                    j,
                );
                if candidate > incumbent {
                    best.insert(key, i);
                }
            }
            None => {
                best.insert(key, i);
            }
        }
    }

    best
}

/// Generate `count` positive queries. Each samples a target uniformly at
/// random, then remaps it to the authoritative document of its
/// (topic, department) group so conflicting versions have a single correct
/// answer. The query text comes from one of four fixed templates.
pub fn generate_queries(corpus: &[Document], count: usize, rng: &mut StdRng) -> Vec<Query> {
    assert!(!corpus.is_empty(), "cannot generate queries over an empty corpus");

    let authority = authoritative(corpus);
    let mut queries = Vec::with_capacity(count);

    for _ in 0..count {
        let sampled = corpus.choose(rng).expect("corpus is non-empty");
        let key = (sampled.topic.clone(), sampled.department.clone());
        let target = &corpus[authority[&key]];

        let query_text = match rng.gen_range(0..4) {
            0 => format!(
                "What is the {} limit for {}?",
                target.topic, target.department
            ),
            1 => format!(
                "Current threshold for {} in {}",
                target.topic, target.department
            ),
            2 => format!(
                "As a {} employee, how much can I spend on {}?",
                target.department, target.topic
            ),
            _ => format!("Show me the {} policy for {}", target.status, target.topic),
        };

        queries.push(Query {
            query_id: ulid::Ulid::new().to_string(),
            query_text,
            target_doc_id: target.id.clone(),
            expected_fact: Some(target.key_fact_value),
            user_context: Some(UserContext {
                department: target.department.clone(),
                role: "Employee".to_string(),
            }),
        });
    }

    queries
}
