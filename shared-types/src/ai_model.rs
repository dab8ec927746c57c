use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    OpenAi,
    Gemini,
    OpenRouter,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::OpenAi => "openai",
            AiProvider::Gemini => "gemini",
            AiProvider::OpenRouter => "openrouter",
        }
    }
}

/// A model as listed to the dashboard, with readiness resolved.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AiModel {
    pub id: String,
    pub label: String,
    pub provider: AiProvider,
    pub description: String,
    pub default: bool,
    pub ready: bool,
}

#[derive(Debug, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AiModelsResponse {
    pub models: Vec<AiModel>,
    pub default_model_id: Option<String>,
}
