use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use directory_scraper::{
    detect_layout, normalize_directory_url, parse_listing_page, parse_profile,
    DirectoryLayoutError, PageFetcher,
};
use shared_types::{CancelDirectoryImportResponse, DirectoryImportStatus};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use url::Url;

use crate::database::AsyncDbConnection;
use crate::helpers::company_create::{create_company, drop_invalid_fields, CreateOutcome};

pub const PROFILE_DELAY: Duration = Duration::from_secs(1);
const MAX_LISTING_PAGES: usize = 200;

/// Where directory pages come from.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_html(&self, url: &str) -> Result<String>;
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        PageFetcher::fetch_html(self, url).await
    }
}

type SharedStatus = Arc<RwLock<DirectoryImportStatus>>;

/// Imports member listings from a chamber-style directory, one import at a
/// time. Starting a new import aborts the running one.
///
/// Each run writes to its own status handle. A replaced run that has not
/// reached its next await point yet can only touch its detached handle.
pub struct DirectoryImportManager {
    db_conn: AsyncDbConnection,
    pages: Arc<dyn PageSource>,
    profile_delay: Duration,
    status: RwLock<SharedStatus>,
    active_job: Mutex<Option<JoinHandle<()>>>,
}

impl DirectoryImportManager {
    pub fn new(db_conn: AsyncDbConnection, pages: Arc<dyn PageSource>) -> Self {
        Self {
            db_conn,
            pages,
            profile_delay: PROFILE_DELAY,
            status: RwLock::new(Arc::new(RwLock::new(DirectoryImportStatus::default()))),
            active_job: Mutex::new(None),
        }
    }

    pub fn with_profile_delay(mut self, delay: Duration) -> Self {
        self.profile_delay = delay;
        self
    }

    pub async fn start(&self, raw_url: &str) -> Result<(), DirectoryLayoutError> {
        let url = normalize_directory_url(raw_url)?;

        let mut active_job = self.active_job.lock().await;
        if let Some(previous) = active_job.take() {
            if !previous.is_finished() {
                info!("Replacing running directory import");
                previous.abort();
            }
        }

        let status = Arc::new(RwLock::new(DirectoryImportStatus {
            running: true,
            url: Some(url.to_string()),
            ..Default::default()
        }));
        *self.status.write().await = status.clone();

        let db_conn = self.db_conn.clone();
        let pages = self.pages.clone();
        let delay = self.profile_delay;

        let handle = tokio::spawn(async move {
            let result = run_import(&db_conn, pages.as_ref(), &status, url, delay).await;

            let mut status = status.write().await;
            status.running = false;
            if let Err(e) = result {
                warn!("Directory import failed: {}", e);
                status.error = Some(e.to_string());
            }
        });

        *active_job = Some(handle);
        Ok(())
    }

    pub async fn cancel(&self) -> CancelDirectoryImportResponse {
        let mut active_job = self.active_job.lock().await;
        let running = active_job
            .as_ref()
            .is_some_and(|job| !job.is_finished());

        if !running {
            return CancelDirectoryImportResponse {
                canceled: false,
                message: "No active scrape running".to_string(),
            };
        }

        if let Some(job) = active_job.take() {
            job.abort();
        }
        self.current_status().await.write().await.running = false;
        info!("Directory import cancelled");

        CancelDirectoryImportResponse {
            canceled: true,
            message: "Directory scrape canceled".to_string(),
        }
    }

    pub async fn status(&self) -> DirectoryImportStatus {
        self.current_status().await.read().await.clone()
    }

    async fn current_status(&self) -> SharedStatus {
        self.status.read().await.clone()
    }
}

async fn run_import(
    db_conn: &AsyncDbConnection,
    pages: &dyn PageSource,
    status: &RwLock<DirectoryImportStatus>,
    url: Url,
    delay: Duration,
) -> Result<()> {
    let index_html = pages.fetch_html(url.as_str()).await?;
    let layout = detect_layout(&index_html)?.ok_or(DirectoryLayoutError::Unsupported)?;
    info!("Importing {} directory from {}", layout.name(), url);

    let profile_urls = collect_profile_urls(pages, layout, url, index_html).await?;
    status.write().await.listings_found = profile_urls.len() as u64;

    for (index, profile_url) in profile_urls.iter().enumerate() {
        if index > 0 {
            tokio::time::sleep(delay).await;
        }

        let outcome = match pages.fetch_html(profile_url).await {
            Ok(html) => match parse_profile(&html, layout) {
                Ok(input) => create_company(db_conn.clone(), drop_invalid_fields(input)).await,
                Err(e) => Err(e.into()),
            },
            Err(e) => Err(e),
        };

        let mut status = status.write().await;
        match outcome {
            Ok(CreateOutcome::Created(company)) => {
                info!("Imported {} from {}", company.company_name, profile_url);
                status.imported += 1;
            }
            Ok(CreateOutcome::Duplicate(duplicate)) => {
                info!(
                    "Skipping {}: matches company {}",
                    profile_url, duplicate.existing.id
                );
                status.skipped_duplicates += 1;
            }
            Ok(CreateOutcome::Invalid(fields)) => {
                warn!("Skipping {}: invalid fields {:?}", profile_url, fields);
                status.failed += 1;
            }
            Err(e) => {
                warn!("Failed to import {}: {}", profile_url, e);
                status.failed += 1;
            }
        }
    }

    Ok(())
}

/// Profile links from the index page and, for paginated layouts, every
/// following page.
async fn collect_profile_urls(
    pages: &dyn PageSource,
    layout: directory_scraper::DirectoryLayout,
    index_url: Url,
    index_html: String,
) -> Result<Vec<String>> {
    let mut profile_urls: Vec<String> = Vec::new();
    let mut seen_profiles = HashSet::new();
    let mut visited_pages = HashSet::from([index_url.to_string()]);
    let mut page_url = index_url;
    let mut html = index_html;

    loop {
        let listing = parse_listing_page(&html, layout, &page_url)?;
        for profile in listing.profile_urls {
            if seen_profiles.insert(profile.clone()) {
                profile_urls.push(profile);
            }
        }

        let Some(next) = listing.next_page else {
            break;
        };
        if !visited_pages.insert(next.clone()) {
            break;
        }
        if visited_pages.len() > MAX_LISTING_PAGES {
            return Err(anyhow!("Directory has more than {} listing pages", MAX_LISTING_PAGES));
        }

        page_url = Url::parse(&next)?;
        html = pages.fetch_html(&next).await?;
    }

    Ok(profile_urls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::companies as db;
    use crate::database::Database;
    use std::collections::HashMap;

    struct FakePages {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl PageSource for FakePages {
        async fn fetch_html(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| anyhow!("HTTP error! status: 404"))
        }
    }

    /// Never answers, so an import stays in flight.
    struct StalledPages;

    #[async_trait]
    impl PageSource for StalledPages {
        async fn fetch_html(&self, _url: &str) -> Result<String> {
            std::future::pending().await
        }
    }

    const INDEX: &str = r#"
        <html><body>
          <div class="mn-listing ccaMemListing "><div class="ccaMemProfileLnk"><a href="alpha">More</a></div></div>
          <div class="mn-listing ccaMemListing "><div class="ccaMemProfileLnk"><a href="beta">More</a></div></div>
          <a class="ccaNext" href="?page=2">Next</a>
        </body></html>"#;

    const PAGE_TWO: &str = r#"
        <html><body>
          <div class="mn-listing ccaMemListing "><div class="ccaMemProfileLnk"><a href="beta">More</a></div></div>
          <div class="mn-listing ccaMemListing "><div class="ccaMemProfileLnk"><a href="missing">More</a></div></div>
          <a class="ccaNext" href="?page=2">Next</a>
        </body></html>"#;

    fn profile(name: &str, website: &str) -> String {
        format!(
            r#"<html><body>
              <div class="ccaNameBlock"><h2>{name}</h2></div>
              <div class="ccaAddr"><span>1 Main St</span><br><span>Tyler, TX 75701</span></div>
              <div class="ccaPhone">903-555-0100</div>
              <div class="ccaWebAddr">{website}</div>
            </body></html>"#
        )
    }

    fn fake_pages() -> FakePages {
        let pages = HashMap::from([
            ("https://chamber.example.org/list/".to_string(), INDEX.to_string()),
            ("https://chamber.example.org/list/?page=2".to_string(), PAGE_TWO.to_string()),
            (
                "https://chamber.example.org/list/alpha".to_string(),
                profile("Alpha Works", "alpha.com"),
            ),
            (
                "https://chamber.example.org/list/beta".to_string(),
                profile("Beta Goods", "acme.com"),
            ),
        ]);
        FakePages { pages }
    }

    async fn wait_until_idle(manager: &DirectoryImportManager) -> DirectoryImportStatus {
        for _ in 0..200 {
            let status = manager.status().await;
            if !status.running {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("import did not finish");
    }

    #[tokio::test]
    async fn test_import_counts_created_duplicates_and_failures() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::new(&dir.path().join("db.sqlite")).unwrap();
        let conn = database.async_connection.clone();
        db::insert_company(
            conn.clone(),
            &shared_types::CompanyInput {
                company_name: Some("Acme".to_string()),
                website_url: Some("https://www.acme.com/".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let manager = DirectoryImportManager::new(conn.clone(), Arc::new(fake_pages()))
            .with_profile_delay(Duration::ZERO);
        manager
            .start("chamber.example.org/list/")
            .await
            .unwrap();
        let status = wait_until_idle(&manager).await;

        assert_eq!(status.error, None);
        assert_eq!(status.listings_found, 3);
        assert_eq!(status.imported, 1);
        assert_eq!(status.skipped_duplicates, 1);
        assert_eq!(status.failed, 1);

        let alpha = db::list_companies(conn)
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.company_name == "Alpha Works")
            .unwrap();
        assert_eq!(alpha.state.as_deref(), Some("Texas"));
        assert_eq!(alpha.website_url.as_deref(), Some("https://www.alpha.com/"));
    }

    #[tokio::test]
    async fn test_unknown_layout_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::new(&dir.path().join("db.sqlite")).unwrap();
        let pages = FakePages {
            pages: HashMap::from([(
                "https://plain.example.com/".to_string(),
                "<html><body><p>Members</p></body></html>".to_string(),
            )]),
        };

        let manager = DirectoryImportManager::new(database.async_connection.clone(), Arc::new(pages));
        manager.start("https://plain.example.com/").await.unwrap();
        let status = wait_until_idle(&manager).await;

        assert_eq!(
            status.error.as_deref(),
            Some("Unknown or unsupported directory layout")
        );
        assert_eq!(status.listings_found, 0);
    }

    #[tokio::test]
    async fn test_replaced_import_writes_to_detached_status() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::new(&dir.path().join("db.sqlite")).unwrap();
        let manager =
            DirectoryImportManager::new(database.async_connection.clone(), Arc::new(StalledPages));

        manager.start("chamber.example.org/list/").await.unwrap();
        let replaced = manager.current_status().await;
        manager.start("chamber.example.org/list/").await.unwrap();

        replaced.write().await.imported += 5;
        replaced.write().await.running = false;

        let status = manager.status().await;
        assert!(status.running);
        assert_eq!(status.imported, 0);
        assert!(manager.cancel().await.canceled);
    }

    #[tokio::test]
    async fn test_cancel_without_import() {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::new(&dir.path().join("db.sqlite")).unwrap();
        let manager =
            DirectoryImportManager::new(database.async_connection.clone(), Arc::new(fake_pages()));

        let response = manager.cancel().await;

        assert!(!response.canceled);
        assert!(manager.start("http://").await.is_err());
    }
}
