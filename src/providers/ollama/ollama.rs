use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::ProviderConfig;
use crate::providers::traits::{CompletionProvider, EmbeddingProvider};
use crate::providers::utils::{build_http_client, endpoint};

/// Local Ollama server, used for both embeddings and generation.
#[derive(Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        Ok(Self {
            client: build_http_client(config.timeout())?,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    async fn post(&self, path: &str, body: Value) -> Result<reqwest::Response> {
        let url = endpoint(&self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Ollama unreachable at {}: {}", url, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Ollama request failed: Status {}, Body: {}", status, error_text));
        }
        Ok(response)
    }
}

fn parse_embeddings(body: Value, expected: usize) -> Result<Vec<Vec<f32>>> {
    if let Some(error) = body.get("error") {
        return Err(anyhow!("Ollama returned error: {}", error));
    }

    let parsed: EmbedResponse =
        serde_json::from_value(body).map_err(|e| anyhow!("Invalid embedding response: {}", e))?;

    if parsed.embeddings.len() != expected {
        return Err(anyhow!(
            "Ollama returned {} embeddings for {} inputs",
            parsed.embeddings.len(),
            expected
        ));
    }
    Ok(parsed.embeddings)
}

fn parse_generation(response_json: Value) -> Result<String> {
    if let Some(error) = response_json.get("error") {
        return Err(anyhow!("Ollama returned error: {}", error));
    }

    serde_json::from_value::<GenerateResponse>(response_json.clone())
        .map(|r| r.response)
        .map_err(|_| {
            let debug_json = serde_json::to_string_pretty(&response_json).unwrap_or_default();
            anyhow!("Invalid response format. Response JSON: {}", debug_json)
        })
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .post(
                "api/embed",
                json!({
                    "model": self.model,
                    "input": texts,
                }),
            )
            .await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| anyhow!("Invalid embedding response: {}", e))?;
        parse_embeddings(body, texts.len())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .post(
                "api/generate",
                json!({
                    "model": self.model,
                    "prompt": prompt,
                    "stream": false,
                    "options": { "temperature": self.temperature },
                }),
            )
            .await?;

        let response_json: Value = response.json().await?;
        parse_generation(response_json)
    }

    async fn get_model_info(&self) -> Result<String> {
        Ok(format!("ollama/{}", self.model))
    }

    fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
        Box::new(self.clone())
    }
}
