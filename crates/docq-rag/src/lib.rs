//! Retrieval-augmented question answering over a local document corpus
//!
//! This crate implements the retrieval pipeline: sliding-window chunking,
//! an immutable in-memory vector index with build-once caching, prompt
//! assembly, the per-session conversation transcript, and the question
//! pipeline tying them to the embedding and generation collaborators.

pub mod cache;
pub mod chunker;
pub mod conversation;
pub mod index;
pub mod loader;
pub mod pipeline;
pub mod prompt;


pub use cache::{CorpusFingerprint, IndexCache};
pub use conversation::ConversationStore;
pub use index::VectorIndex;
pub use loader::DirectoryLoader;
pub use pipeline::{QueryPipeline, DEFAULT_TOP_K};
pub use prompt::FALLBACK_ANSWER;

// Re-export core types for convenience
pub use docq_core::{
    ChatMessage, Chunk, CorpusLoader, Document, EmbeddedChunk, Error, RagConfig, Result, Role,
    TextEmbedder, TextGenerator,
};
