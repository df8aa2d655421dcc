//! Core traits and types for DocQ
//!
//! This crate defines the fundamental traits and types used across the DocQ
//! system: the document/chunk data model, the conversation transcript types,
//! and the collaborator-facing interfaces for corpus extraction, text
//! embedding, and answer generation, making the system test-friendly and
//! extensible.

pub mod chat;
pub mod config;
pub mod document;
pub mod embedder;
pub mod error;
pub mod generator;
pub mod loader;

pub use chat::{ChatMessage, Role};
pub use config::RagConfig;
pub use document::{Chunk, Document, EmbeddedChunk};
pub use embedder::TextEmbedder;
pub use error::{Error, Result};
pub use generator::{GenerationConfig, GenerationResult, TextGenerator};
pub use loader::CorpusLoader;
