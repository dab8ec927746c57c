pub mod gemini;
pub mod openai;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared_types::AiProvider;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// A chat model asked for a single JSON answer at temperature 0.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete_json(&self, model: &str, prompt: &str) -> Result<String>;
}

pub fn client_for(provider: AiProvider, api_key: &str) -> Arc<dyn LlmClient> {
    match provider {
        AiProvider::OpenAi => Arc::new(OpenAiClient::new(api_key)),
        AiProvider::OpenRouter => Arc::new(OpenAiClient::openrouter(api_key)),
        AiProvider::Gemini => Arc::new(GeminiClient::new(api_key)),
    }
}
