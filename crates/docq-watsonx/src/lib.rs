//! watsonx.ai integration for DocQ
//!
//! Implements the embedding and generation collaborator traits over the
//! watsonx.ai HTTP API, with IAM token authentication.

mod client;
mod config;

#[cfg(test)]
mod tests;

pub use client::WatsonxClient;
pub use config::WatsonxConfig;

// Re-export core types for convenience
pub use docq_core::{
    Error, GenerationConfig, GenerationResult, Result, TextEmbedder, TextGenerator,
};
