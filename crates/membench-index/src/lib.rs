pub mod index;
pub mod schema;

pub use index::VectorIndex;
pub use schema::EMBEDDING_DIMS;
