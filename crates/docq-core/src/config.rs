//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::{Error, Result};

/// Default corpus folder, relative to the working directory.
pub const DEFAULT_CORPUS_DIR: &str = "docs";

/// Default glob pattern for corpus files.
pub const DEFAULT_GLOB_PATTERN: &str = "**/*.md";

/// Configuration for the retrieval pipeline.
///
/// Everything here is externally supplied; unset values fall back to the
/// defaults below (chunk size 1000, overlap 200, top-k 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    pub corpus_dir: PathBuf,
    pub glob_pattern: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub embedding_model: String,
    pub generation_model: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from(DEFAULT_CORPUS_DIR),
            glob_pattern: DEFAULT_GLOB_PATTERN.to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
            embedding_model: "ibm/slate-30m-english-rtrvr".to_string(),
            generation_model: "ibm/granite-4-h-small".to_string(),
        }
    }
}

impl RagConfig {
    /// Create configuration from environment variables, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(dir) = env::var("DOCQ_CORPUS_DIR") {
            config.corpus_dir = PathBuf::from(dir);
        }
        if let Ok(pattern) = env::var("DOCQ_CORPUS_PATTERN") {
            config.glob_pattern = pattern;
        }
        if let Ok(size) = env::var("DOCQ_CHUNK_SIZE") {
            config.chunk_size = parse_var("DOCQ_CHUNK_SIZE", &size)?;
        }
        if let Ok(overlap) = env::var("DOCQ_CHUNK_OVERLAP") {
            config.chunk_overlap = parse_var("DOCQ_CHUNK_OVERLAP", &overlap)?;
        }
        if let Ok(top_k) = env::var("DOCQ_TOP_K") {
            config.top_k = parse_var("DOCQ_TOP_K", &top_k)?;
        }
        if let Ok(model) = env::var("DOCQ_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }
        if let Ok(model) = env::var("DOCQ_GENERATION_MODEL") {
            config.generation_model = model;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the constraints the chunker and retrieval stages rely on.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Configuration(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Configuration(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(Error::Configuration("top-k must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn parse_var(name: &str, value: &str) -> Result<usize> {
    value.parse().map_err(|_| {
        Error::Configuration(format!(
            "{} must be a non-negative integer, got '{}'",
            name, value
        ))
    })
}
