//! Text generator trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::Result;

/// Configuration for text generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    pub model_id: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub top_k: Option<u32>,
    pub stop_sequences: Vec<String>,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model_id: "ibm/granite-4-h-small".to_string(),
            max_tokens: 512,
            temperature: Some(0.2),
            top_p: None,
            top_k: None,
            stop_sequences: Vec::new(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Result of a text generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub model_id: String,
    pub tokens_used: Option<u32>,
}

/// Trait for generation collaborators (e.g. watsonx.ai)
///
/// A generator maps a prompt string to a completion and may fail with a
/// transient or permanent error. No retry happens at this layer; callers
/// treat each call as a timeout-bounded network operation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text using the default configuration.
    async fn generate(&self, prompt: &str) -> Result<GenerationResult>;

    /// Generate text with custom configuration.
    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult>;

    /// Get the generation model id being used.
    fn model_id(&self) -> &str;
}
