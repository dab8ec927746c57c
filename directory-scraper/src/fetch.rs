use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::page_text::DEFAULT_MAX_PAGE_CHARS;
use crate::robots::{check_robots, robots_url};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; CompanyInfoBot/1.0;)";

/// `[scraper]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperSettings {
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_page_chars: usize,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            max_page_chars: DEFAULT_MAX_PAGE_CHARS,
        }
    }
}

/// HTTP client for company pages and directory listings.
#[derive(Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
}

impl PageFetcher {
    pub fn new(settings: &ScraperSettings) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.user_agent).context("Invalid user agent")?,
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Body of a page; non-2xx statuses are errors.
    pub async fn fetch_html(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP error! status: {}", status.as_u16()));
        }
        Ok(response.text().await?)
    }

    /// `Err` with the user-facing message when robots.txt forbids the page.
    /// A missing or unreachable robots.txt allows everything.
    pub async fn check_robots(&self, page: &url::Url) -> std::result::Result<(), String> {
        let Some(robots) = robots_url(page) else {
            return Ok(());
        };

        match self.fetch_html(&robots).await {
            Ok(body) => check_robots(&body, page.path()),
            Err(e) => {
                warn!("Could not check robots.txt at {}: {}", robots, e);
                Ok(())
            }
        }
    }
}
