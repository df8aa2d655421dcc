//! watsonx.ai client implementation

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use docq_core::{
    Error, GenerationConfig, GenerationResult, Result, TextEmbedder, TextGenerator,
};

use crate::config::WatsonxConfig;

/// watsonx.ai client serving both collaborator roles: text embeddings for
/// the vector index and text generation for answers.
pub struct WatsonxClient {
    config: WatsonxConfig,
    access_token: Option<String>,
    client: Client,
    embedding_model: String,
    generation_model: String,
}

#[derive(Serialize)]
struct TokenRequest {
    grant_type: String,
    apikey: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Serialize)]
struct EmbeddingRequest {
    inputs: Vec<String>,
    model_id: String,
    project_id: String,
}

#[derive(Deserialize)]
struct EmbeddingResults {
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    results: Vec<EmbeddingResults>,
}

#[derive(Serialize)]
struct GenerationParams {
    decoding_method: String,
    max_new_tokens: u32,
    min_new_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    repetition_penalty: f32,
    stop_sequences: Vec<String>,
}

#[derive(Serialize)]
struct GenerationRequest {
    input: String,
    parameters: GenerationParams,
    model_id: String,
    project_id: String,
}

#[derive(Deserialize)]
struct GenerationResults {
    generated_text: String,
    #[serde(default)]
    generated_token_count: Option<u32>,
}

#[derive(Deserialize)]
struct GenerationData {
    results: Vec<GenerationResults>,
}

impl WatsonxClient {
    /// Model constants
    pub const SLATE_30M_ENGLISH_RTRVR: &'static str = "ibm/slate-30m-english-rtrvr";
    pub const SLATE_125M_ENGLISH_RTRVR: &'static str = "ibm/slate-125m-english-rtrvr";
    pub const GRANITE_4_H_SMALL: &'static str = "ibm/granite-4-h-small";
    pub const GRANITE_3_3_8B_INSTRUCT: &'static str = "ibm/granite-3-3-8b-instruct";

    /// Create a new watsonx client from configuration
    pub fn new(config: WatsonxConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            access_token: None,
            client,
            embedding_model: Self::SLATE_30M_ENGLISH_RTRVR.to_string(),
            generation_model: Self::GRANITE_4_H_SMALL.to_string(),
        })
    }

    /// Create a new watsonx client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = WatsonxConfig::from_env()?;
        Self::new(config)
    }

    /// Set the model used for embeddings
    pub fn with_embedding_model(mut self, model_id: impl Into<String>) -> Self {
        self.embedding_model = model_id.into();
        self
    }

    /// Set the model used for generation
    pub fn with_generation_model(mut self, model_id: impl Into<String>) -> Self {
        self.generation_model = model_id.into();
        self
    }

    /// Authenticate against IBM Cloud IAM and store the access token.
    pub async fn connect(&mut self) -> Result<()> {
        let token_request = TokenRequest {
            grant_type: "urn:ibm:params:oauth:grant-type:apikey".to_string(),
            apikey: self.config.api_key.clone(),
        };

        let url = format!("https://{}/identity/token", self.config.iam_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .form(&token_request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::Authentication(format!(
                "Authentication failed: {}",
                response.status()
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        self.access_token = Some(token_response.access_token);

        Ok(())
    }

    fn bearer_token(&self) -> Result<&str> {
        self.access_token.as_deref().ok_or_else(|| {
            Error::Authentication("Not authenticated. Call connect() first.".to_string())
        })
    }

    async fn perform_embedding(&self, text: &str) -> Result<Vec<f32>> {
        let access_token = self.bearer_token()?;

        let request_body = EmbeddingRequest {
            inputs: vec![text.to_string()],
            model_id: self.embedding_model.clone(),
            project_id: self.config.project_id.clone(),
        };

        let url = format!(
            "{}/ml/v1/text/embeddings?version=2024-05-02",
            self.config.api_url
        );

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", access_token))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Embedding(format!(
                "watsonx embeddings request failed with status {}: {}",
                status, error_text
            )));
        }

        let data: EmbeddingData = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let embedding = data
            .results
            .into_iter()
            .next()
            .map(|r| r.embedding)
            .ok_or_else(|| Error::Embedding("watsonx returned no embedding result".to_string()))?;

        if embedding.is_empty() {
            return Err(Error::Embedding(
                "watsonx returned an empty embedding".to_string(),
            ));
        }

        debug!(
            model_id = %self.embedding_model,
            dimension = embedding.len(),
            "text embedded"
        );
        Ok(embedding)
    }

    async fn perform_generation(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<(String, Option<u32>)> {
        let access_token = self.bearer_token()?;

        let params = GenerationParams {
            decoding_method: if config.temperature.is_some() {
                "sample".to_string()
            } else {
                "greedy".to_string()
            },
            max_new_tokens: config.max_tokens,
            min_new_tokens: 1,
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            repetition_penalty: 1.1,
            stop_sequences: config.stop_sequences.clone(),
        };

        let request_body = GenerationRequest {
            input: prompt.to_string(),
            parameters: params,
            model_id: config.model_id.clone(),
            project_id: self.config.project_id.clone(),
        };

        let url = format!(
            "{}/ml/v1/text/generation?version=2023-05-29",
            self.config.api_url
        );

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", access_token))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Generation(format!(
                "watsonx generation request failed with status {}: {}",
                status, error_text
            )));
        }

        let data: GenerationData = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let result = data
            .results
            .into_iter()
            .next()
            .ok_or_else(|| Error::Generation("watsonx returned no generation result".to_string()))?;

        let text = result.generated_text.trim().to_string();
        if text.is_empty() {
            return Err(Error::Generation("empty response from watsonx".to_string()));
        }

        Ok((text, result.generated_token_count))
    }
}

#[async_trait]
impl TextEmbedder for WatsonxClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.perform_embedding(text).await
    }

    fn model_id(&self) -> &str {
        &self.embedding_model
    }
}

#[async_trait]
impl TextGenerator for WatsonxClient {
    async fn generate(&self, prompt: &str) -> Result<GenerationResult> {
        let config = GenerationConfig {
            model_id: self.generation_model.clone(),
            ..Default::default()
        };
        self.generate_with_config(prompt, &config).await
    }

    async fn generate_with_config(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let generation_future = self.perform_generation(prompt, config);

        let (text, tokens_used) = match timeout(config.timeout, generation_future).await {
            Ok(result) => result?,
            Err(_) => return Err(Error::Timeout("generation request timed out".to_string())),
        };

        debug!(
            model_id = %config.model_id,
            tokens = ?tokens_used,
            "answer generated"
        );

        Ok(GenerationResult {
            text,
            model_id: config.model_id.clone(),
            tokens_used,
        })
    }

    fn model_id(&self) -> &str {
        &self.generation_model
    }
}
