pub mod client;
pub mod directory;
pub mod error;
pub mod fetch;
pub mod llm;
pub mod llm_scraper;
pub mod models;
pub mod page_text;
pub mod prompt;
pub mod robots;

pub use client::{ScrapeClient, ScrapeOutput};
pub use directory::{
    detect_layout, normalize_directory_url, parse_listing_page, parse_profile, DirectoryLayout,
    ListingPage,
};
pub use error::{classify_scrape_failure, DirectoryLayoutError, ScrapeError};
pub use fetch::{PageFetcher, ScraperSettings};
pub use llm_scraper::LlmScrapeClient;
pub use models::{AiModelConfig, ApiKeysConfig, ModelRegistry};
