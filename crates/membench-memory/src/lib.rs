pub mod backend;
pub mod client;

pub use backend::ScopedMemoryBackend;
pub use client::{MemoryServiceClient, API_KEY_ENV};
