use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

use crate::core::narrative::LlmClient;

/// Client for the Google Generative Language API (`generateContent`).
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        GeminiClient {
            base_url: base_url.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize, Debug)]
struct CandidatePart {
    text: String,
}

#[async_trait]
impl LlmClient for GeminiClient {
    #[instrument(name = "GeminiComplete", skip(self, system_prompt, user_prompt))]
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        debug!("Requesting completion from {}", url);

        let body = json!({
            "system_instruction": {
                "parts": [{ "text": system_prompt }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": user_prompt }]
            }],
            "generationConfig": { "temperature": 0.0 }
        });

        let client = reqwest::Client::builder().user_agent("omaha/1.0").build()?;
        let response = client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for model: {}", e, self.model))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} from model: {}",
                response.status(),
                self.model
            ));
        }

        let data = response.json::<GenerateContentResponse>().await?;
        let text = data
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .ok_or_else(|| anyhow!("No completion returned for model: {}", self.model))?;

        Ok(text)
    }
}
