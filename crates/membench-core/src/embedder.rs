use crate::error::BenchResult;

pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> BenchResult<Vec<f32>>;
    fn embed_batch(&self, texts: &[&str]) -> BenchResult<Vec<Vec<f32>>>;
    fn dimensions(&self) -> usize;
}
