use rusqlite::Connection;

use membench_core::BenchError;

pub const EMBEDDING_DIMS: usize = 384;

/// Create the index tables, dropping any previous contents first so every
/// run starts from a clean, reproducible fixture.
pub fn init_db(conn: &Connection) -> Result<(), BenchError> {
    conn.execute_batch(
        "
        DROP TABLE IF EXISTS vec_documents;
        DROP TABLE IF EXISTS documents;

        CREATE TABLE documents (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,

            -- Flattened metadata for filtering
            topic TEXT NOT NULL,
            department TEXT NOT NULL,
            status TEXT NOT NULL,
            source TEXT NOT NULL,
            access_level TEXT NOT NULL,
            version TEXT NOT NULL
        );

        CREATE INDEX idx_documents_department ON documents(department);
        CREATE INDEX idx_documents_topic ON documents(topic);
        ",
    )
    .map_err(|e| BenchError::Database(e.to_string()))?;

    // sqlite-vec virtual table; the department partition key lets a scoped
    // search constrain KNN to one department's vectors.
    conn.execute_batch(&format!(
        "CREATE VIRTUAL TABLE vec_documents USING vec0(
            doc_id TEXT PRIMARY KEY,
            department TEXT PARTITION KEY,
            embedding float[{EMBEDDING_DIMS}] distance_metric=cosine
        )"
    ))
    .map_err(|e| BenchError::Database(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::test_helpers::ensure_vec_init;

    #[test]
    fn test_init_db() {
        ensure_vec_init();
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        // Re-running resets rather than failing
        init_db(&conn).unwrap();

        let tables: Vec<String> = {
            let mut stmt = conn
                .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
                .unwrap();
            stmt.query_map([], |row| row.get(0))
                .unwrap()
                .map(|r| r.unwrap())
                .collect()
        };
        assert!(tables.contains(&"documents".to_string()));
        assert!(tables.contains(&"vec_documents".to_string()));
    }
}
