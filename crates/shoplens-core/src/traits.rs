use crate::error::Result;
use crate::types::{QueryRecord, RetrievalPath, RetrievalResult};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// One retrieval path. Both engines take the full ground-truth record but
/// only the hybrid path reads `required_attributes`; neither sees
/// `expected_items`.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    fn path(&self) -> RetrievalPath;
    async fn retrieve(&self, query: &QueryRecord) -> Result<RetrievalResult>;
}
