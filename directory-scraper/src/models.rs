use serde::{Deserialize, Serialize};
use shared_types::{AiModel, AiModelsResponse, AiProvider};

/// One entry of the `[[ai_models]]` config table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiModelConfig {
    pub id: String,
    pub label: String,
    pub provider: AiProvider,
    pub model: String,
    #[serde(default)]
    pub env_var: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiKeysConfig {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
}

impl ApiKeysConfig {
    fn for_provider(&self, provider: AiProvider) -> Option<&str> {
        let key = match provider {
            AiProvider::OpenAi => &self.openai_api_key,
            AiProvider::Gemini => &self.gemini_api_key,
            AiProvider::OpenRouter => &self.openrouter_api_key,
        };
        key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }
}

pub fn builtin_models() -> Vec<AiModelConfig> {
    vec![
        AiModelConfig {
            id: "gpt-4o-mini".to_string(),
            label: "GPT-4o mini".to_string(),
            provider: AiProvider::OpenAi,
            model: "gpt-4o-mini".to_string(),
            env_var: Some("OPENAI_API_KEY".to_string()),
            description: "Fast, low-cost OpenAI model".to_string(),
            default: true,
        },
        AiModelConfig {
            id: "gpt-4o".to_string(),
            label: "GPT-4o".to_string(),
            provider: AiProvider::OpenAi,
            model: "gpt-4o".to_string(),
            env_var: Some("OPENAI_API_KEY".to_string()),
            description: "OpenAI flagship model".to_string(),
            default: false,
        },
        AiModelConfig {
            id: "gemini-2.0-flash".to_string(),
            label: "Gemini 2.0 Flash".to_string(),
            provider: AiProvider::Gemini,
            model: "models/gemini-2.0-flash".to_string(),
            env_var: Some("GEMINI_API_KEY".to_string()),
            description: "Google Gemini".to_string(),
            default: false,
        },
        AiModelConfig {
            id: "openrouter-llama-3.1-8b".to_string(),
            label: "Llama 3.1 8B (OpenRouter)".to_string(),
            provider: AiProvider::OpenRouter,
            model: "meta-llama/llama-3.1-8b-instruct".to_string(),
            env_var: Some("OPENROUTER_API_KEY".to_string()),
            description: "Open model routed through OpenRouter".to_string(),
            default: false,
        },
    ]
}

/// Configured models plus the keys that make them usable.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<AiModelConfig>,
    keys: ApiKeysConfig,
}

impl ModelRegistry {
    /// An empty model list falls back to `builtin_models`.
    pub fn new(models: Vec<AiModelConfig>, keys: ApiKeysConfig) -> Self {
        let models = if models.is_empty() {
            builtin_models()
        } else {
            models
        };
        Self { models, keys }
    }

    pub fn models(&self) -> &[AiModelConfig] {
        &self.models
    }

    /// Looks a model up by id, then by provider model name.
    pub fn find(&self, candidate: &str) -> Option<&AiModelConfig> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return None;
        }
        self.models
            .iter()
            .find(|model| model.id == candidate)
            .or_else(|| self.models.iter().find(|model| model.model == candidate))
    }

    /// Config key for the provider first, then the model's env var.
    pub fn api_key_for(&self, model: &AiModelConfig) -> Option<String> {
        if let Some(key) = self.keys.for_provider(model.provider) {
            return Some(key.to_string());
        }
        model
            .env_var
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|key| !key.trim().is_empty())
    }

    /// A model without an env var needs no key.
    pub fn is_ready(&self, model: &AiModelConfig) -> bool {
        model.env_var.is_none() || self.api_key_for(model).is_some()
    }

    /// First ready default, first ready, first default, first.
    pub fn default_model_id(&self) -> Option<String> {
        let ready: Vec<&AiModelConfig> = self.models.iter().filter(|m| self.is_ready(m)).collect();

        ready
            .iter()
            .find(|model| model.default)
            .or_else(|| ready.first())
            .copied()
            .or_else(|| self.models.iter().find(|model| model.default))
            .or_else(|| self.models.first())
            .map(|model| model.id.clone())
    }

    /// The requested id when it names a ready model, otherwise the default.
    pub fn sanitize_model_id(&self, requested: Option<&str>) -> Option<String> {
        let requested = requested.map(str::trim).unwrap_or("");
        match self.models.iter().find(|model| model.id == requested) {
            Some(model) if self.is_ready(model) => Some(model.id.clone()),
            _ => self.default_model_id(),
        }
    }

    /// Model to run a scrape with: the requested one if known, else the default.
    pub fn resolve(&self, requested: Option<&str>) -> Option<&AiModelConfig> {
        requested
            .and_then(|candidate| self.find(candidate))
            .or_else(|| {
                self.default_model_id()
                    .and_then(|id| self.models.iter().find(|model| model.id == id))
            })
    }

    pub fn describe(&self) -> AiModelsResponse {
        let models = self
            .models
            .iter()
            .map(|model| AiModel {
                id: model.id.clone(),
                label: model.label.clone(),
                provider: model.provider,
                description: model.description.clone(),
                default: model.default,
                ready: self.is_ready(model),
            })
            .collect();

        AiModelsResponse {
            models,
            default_model_id: self.default_model_id(),
        }
    }
}
