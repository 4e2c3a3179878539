//! Gemini client for answer generation via the Generative Language API
//!
//! Authenticates with an API key; the model variant is chosen per call so a
//! single client serves the whole fallback chain.

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::providers::llm::LlmProvider;

/// Gemini REST client
pub struct GeminiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    temperature: f32,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("Gemini API key is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            temperature: config.temperature,
        })
    }

    /// generateContent endpoint for a model
    fn generate_endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }

    fn models_endpoint(&self) -> String {
        format!("{}/models", self.base_url)
    }
}

#[derive(serde::Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(serde::Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(serde::Serialize)]
struct Part {
    text: String,
}

#[derive(serde::Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(serde::Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(serde::Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(serde::Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(serde::Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(serde::Deserialize)]
struct ModelInfo {
    name: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate, empty when absent
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: 2048,
            },
        };

        let response = self
            .client
            .post(self.generate_endpoint(model))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("Gemini request to {} failed: {}", model, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!(
                "Gemini generation with {} failed ({}): {}",
                model, status, body
            )));
        }

        let gen_response: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("Failed to parse Gemini response: {}", e)))?;

        Ok(gen_response.into_text())
    }

    async fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.models_endpoint())
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| Error::Llm(format!("Gemini model listing failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Llm(format!(
                "Gemini model listing failed ({})",
                response.status()
            )));
        }

        let listing: ListModelsResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("Failed to parse model listing: {}", e)))?;

        Ok(listing.models.into_iter().map(|m| m.name).collect())
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
