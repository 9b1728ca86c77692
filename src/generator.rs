use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Settings;
use crate::error::GenerationError;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f64,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<String>,
}

/// Client for a locally hosted Ollama-style `/api/generate` endpoint.
pub struct Generator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f64,
}

impl Generator {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.generation_timeout())
            .build()?;
        Ok(Generator {
            client,
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One non-streaming generation. No retry, no fallback model.
    pub async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateRequest {
            model: &self.model,
            prompt,
            temperature: self.temperature,
            stream: false,
        };

        let start = Instant::now();
        let response = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(GenerationError::Status(status));
        }

        let raw = response.text().await?;
        let parsed: GenerateResponse = serde_json::from_str(&raw)
            .map_err(|e| GenerationError::Payload(e.to_string()))?;
        let text = parsed
            .response
            .ok_or_else(|| GenerationError::Payload("missing 'response' field".to_string()))?;

        info!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            answer_chars = text.chars().count(),
            latency_ms = start.elapsed().as_millis() as u64,
            "Generation complete"
        );
        Ok(text)
    }
}

// ── Tests ──
