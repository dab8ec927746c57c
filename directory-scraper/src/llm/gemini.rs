use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::debug;

use super::types::{
    GeminiContent, GeminiPart, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};
use super::LlmClient;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    fn endpoint(&self, model: &str) -> Result<url::Url> {
        // Model names may already carry the "models/" prefix.
        let model = model.trim_start_matches("models/");
        let mut url = url::Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Gemini base URL cannot take a path"))?
            .push("models")
            .push(&format!("{model}:generateContent"));
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete_json(&self, model: &str, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json".to_string(),
            },
        };

        debug!(model = %model, "Gemini generateContent request");

        let response = self
            .http
            .post(self.endpoint(model)?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API error {}: {}", status.as_u16(), error_text));
        }

        let data: GenerateContentResponse = response.json().await?;
        data.first_text()
            .ok_or_else(|| anyhow!("Gemini response did not contain any candidates."))
    }
}
