//! In-memory vector index.

use tracing::debug;

use docq_core::{Chunk, EmbeddedChunk, Error, Result, TextEmbedder};

/// Immutable similarity index over embedded chunks.
///
/// Built exactly once per corpus snapshot. Entries keep the chunker's
/// ordering, which doubles as the tie-break order for equal distances, so a
/// given corpus and query always retrieve the same context. `search` never
/// mutates, which makes a built index safe to share behind an `Arc` across
/// any number of concurrent callers without locking.
#[derive(Debug)]
pub struct VectorIndex {
    dimension: usize,
    entries: Vec<EmbeddedChunk>,
}

impl VectorIndex {
    /// Embed every chunk and build the index.
    ///
    /// One embedding call is made per chunk, in chunk order. Any embedding
    /// failure fails the whole build; no partially filled index is ever
    /// returned. An empty chunk sequence fails with [`Error::EmptyCorpus`]
    /// because an index with nothing to retrieve must not serve queries.
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn TextEmbedder) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::EmptyCorpus("no chunks to index".to_string()));
        }

        let mut dimension = 0;
        let mut entries: Vec<EmbeddedChunk> = Vec::with_capacity(chunks.len());

        for chunk in chunks {
            let vector = embedder.embed(&chunk.text).await.map_err(|e| {
                Error::Embedding(format!("failed to embed chunk {}: {}", chunk.id, e))
            })?;

            if entries.is_empty() {
                if vector.is_empty() {
                    return Err(Error::Embedding(format!(
                        "embedder returned an empty vector for chunk {}",
                        chunk.id
                    )));
                }
                dimension = vector.len();
            } else if vector.len() != dimension {
                return Err(Error::Embedding(format!(
                    "chunk {} embedded to {} dimensions, expected {}",
                    chunk.id,
                    vector.len(),
                    dimension
                )));
            }

            entries.push(EmbeddedChunk { chunk, vector });
        }

        debug!(
            entries = entries.len(),
            dimension,
            model_id = embedder.model_id(),
            "vector index built"
        );
        Ok(Self { dimension, entries })
    }

    /// Return the `k` entries closest to `query_vector` by cosine distance.
    ///
    /// Results are sorted by ascending distance; equal distances keep their
    /// insertion order. If the index holds fewer than `k` entries, all of
    /// them are returned.
    pub fn search(&self, query_vector: &[f32], k: usize) -> Result<Vec<EmbeddedChunk>> {
        if k == 0 {
            return Err(Error::InvalidInput("k must be at least 1".to_string()));
        }
        if query_vector.len() != self.dimension {
            return Err(Error::InvalidInput(format!(
                "query vector has {} dimensions, index has {}",
                query_vector.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(f32, usize)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (cosine_distance(query_vector, &entry.vector), i))
            .collect();

        scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(_, i)| self.entries[i].clone())
            .collect())
    }

    /// The fixed vector length of every entry in this index.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cosine distance between two equal-length vectors: `1 - cosine similarity`.
/// Zero-magnitude vectors compare as maximally distant.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    1.0 - dot_product / (norm_a * norm_b)
}
