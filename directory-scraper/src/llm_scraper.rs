use anyhow::Result;
use async_trait::async_trait;
use shared_types::{ScrapeMeta, ScrapedCompany};
use tracing::{debug, info};

use crate::client::{ScrapeClient, ScrapeOutput};
use crate::error::{classify_scrape_failure, ScrapeError};
use crate::fetch::{PageFetcher, ScraperSettings};
use crate::llm::client_for;
use crate::models::{AiModelConfig, ModelRegistry};
use crate::page_text::extract_page_text;
use crate::prompt::build_extraction_prompt;

/// Scrapes a company website by handing its readable text to an LLM.
pub struct LlmScrapeClient {
    fetcher: PageFetcher,
    registry: ModelRegistry,
    max_page_chars: usize,
}

impl LlmScrapeClient {
    pub fn new(settings: &ScraperSettings, registry: ModelRegistry) -> Result<Self> {
        Ok(Self {
            fetcher: PageFetcher::new(settings)?,
            registry,
            max_page_chars: settings.max_page_chars,
        })
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    async fn fetch_page_text(&self, url: &str) -> Result<String, ScrapeError> {
        let page = url::Url::parse(url)
            .map_err(|e| ScrapeError::Failed(format!("Failed to fetch URL: {}", e)))?;

        self.fetcher
            .check_robots(&page)
            .await
            .map_err(ScrapeError::Blocked)?;

        let html = self
            .fetcher
            .fetch_html(page.as_str())
            .await
            .map_err(|e| classify_scrape_failure(format!("Failed to fetch URL: {}", e)))?;

        Ok(extract_page_text(&html, self.max_page_chars))
    }

    fn resolve_model(&self, model_id: Option<&str>) -> Result<(&AiModelConfig, String), ScrapeError> {
        let model = self.registry.resolve(model_id).ok_or_else(|| {
            ScrapeError::Failed("No AI models have been configured.".to_string())
        })?;

        let api_key = self.registry.api_key_for(model).ok_or_else(|| {
            let source = model
                .env_var
                .as_deref()
                .map(|name| format!("the {} environment variable", name))
                .unwrap_or_else(|| format!("a {} API key", model.provider.as_str()));
            ScrapeError::Failed(format!("{} requires {} to be set.", model.label, source))
        })?;

        Ok((model, api_key))
    }
}

fn meta_for(model: &AiModelConfig) -> ScrapeMeta {
    let label = if model.label.is_empty() {
        model.id.clone()
    } else {
        model.label.clone()
    };
    ScrapeMeta {
        model_id: model.id.clone(),
        provider: model.provider.as_str().to_string(),
        label,
    }
}

/// Parses the model's JSON answer, tolerating a Markdown code fence.
pub fn parse_scraped_json(text: &str) -> Result<ScrapedCompany, ScrapeError> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);

    serde_json::from_str(unfenced.trim()).map_err(|e| {
        ScrapeError::Failed(format!("AI response was not a valid company JSON object: {}", e))
    })
}

#[async_trait]
impl ScrapeClient for LlmScrapeClient {
    async fn scrape(&self, url: &str, model_id: Option<&str>) -> Result<ScrapeOutput, ScrapeError> {
        let (model, api_key) = self.resolve_model(model_id)?;
        let page_text = self.fetch_page_text(url).await?;
        let prompt = build_extraction_prompt(url, &page_text);

        debug!(url = %url, model = %model.id, chars = page_text.len(), "scraping page");

        let llm = client_for(model.provider, &api_key);
        let text = llm
            .complete_json(&model.model, &prompt)
            .await
            .map_err(|e| classify_scrape_failure(e.to_string()))?;

        let data = parse_scraped_json(&text)?;
        info!(url = %url, model = %model.id, "scrape finished");

        Ok(ScrapeOutput {
            data,
            meta: Some(meta_for(model)),
        })
    }
}
