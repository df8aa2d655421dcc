//! Text embedder trait

use async_trait::async_trait;

use crate::Result;

/// Trait for embedding collaborators (e.g. watsonx.ai embedding models)
///
/// An embedder maps text to a fixed-length numeric vector. For a given model
/// id and input text the output is deterministic, and every vector produced
/// by one model has the same length.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Embed a piece of text into a fixed-length vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get the embedding model id being used.
    fn model_id(&self) -> &str;
}
