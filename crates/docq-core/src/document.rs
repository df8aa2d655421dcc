//! Document and chunk types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A page of extracted text from the corpus.
///
/// Produced by the extraction collaborator and never mutated afterwards.
/// `page_number` starts at 1 within the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub text: String,
    pub source_path: PathBuf,
    pub page_number: usize,
}

/// A bounded contiguous piece of a document, the unit of retrieval.
///
/// `start_offset`/`end_offset` are character offsets into the parent
/// document's text, so every chunk maps back to exactly one document and
/// one contiguous range. The final chunk of a document may be shorter than
/// the configured chunk size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub document_id: String,
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// A chunk together with its embedding vector.
///
/// The vector is produced once at index build time and never recomputed;
/// its length equals the index dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}
