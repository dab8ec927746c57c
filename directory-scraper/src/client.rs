use async_trait::async_trait;
use shared_types::{ScrapeMeta, ScrapedCompany};

use crate::error::ScrapeError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapeOutput {
    pub data: ScrapedCompany,
    pub meta: Option<ScrapeMeta>,
}

/// Fetches a company website and returns the structured fields found on it.
#[async_trait]
pub trait ScrapeClient: Send + Sync {
    async fn scrape(&self, url: &str, model_id: Option<&str>) -> Result<ScrapeOutput, ScrapeError>;
}
