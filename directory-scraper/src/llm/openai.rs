use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use super::types::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat};
use super::LlmClient;

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_API_URL: &str = "https://openrouter.ai/api/v1";
const OPENROUTER_DEFAULT_TITLE: &str = "Business Directory";

/// Chat completions client. OpenRouter speaks the same protocol and only
/// differs in base URL and attribution headers.
pub struct OpenAiClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    provider_name: &'static str,
    extra_headers: Vec<(&'static str, String)>,
}

impl OpenAiClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: OPENAI_API_URL.to_string(),
            provider_name: "OpenAI",
            extra_headers: Vec::new(),
        }
    }

    pub fn openrouter(api_key: &str) -> Self {
        let referer = std::env::var("OPENROUTER_SITE")
            .or_else(|_| std::env::var("APP_URL"))
            .unwrap_or_else(|_| "http://localhost".to_string());
        let title = std::env::var("OPENROUTER_TITLE")
            .unwrap_or_else(|_| OPENROUTER_DEFAULT_TITLE.to_string());

        Self {
            api_key: api_key.to_string(),
            http: reqwest::Client::new(),
            base_url: OPENROUTER_API_URL.to_string(),
            provider_name: "OpenRouter",
            extra_headers: vec![("http-referer", referer), ("x-title", title)],
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &self.extra_headers {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_str(value)?);
        }
        Ok(headers)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete_json(&self, model: &str, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: 0.0,
            response_format: ResponseFormat::json_object(),
        };

        debug!(provider = self.provider_name, model = %model, "chat completion request");

        let response = self
            .http
            .post(&url)
            .headers(self.headers()?)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "{} API error {}: {}",
                self.provider_name,
                status.as_u16(),
                error_text
            ));
        }

        let chat_response: ChatResponse = response.json().await?;
        chat_response
            .first_text()
            .ok_or_else(|| anyhow!("{} returned an empty response.", self.provider_name))
    }
}
