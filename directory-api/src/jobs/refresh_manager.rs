use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Result;
use directory_scraper::ScrapeClient;
use shared_types::{
    RefreshProgress, RefreshStateResponse, RefreshStatus, RefreshSummary, SingleRefreshResponse,
    StartRefreshRequest,
};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::database::companies::resolve_last_updated_by;
use crate::database::CompanyStore;
use crate::jobs::bulk_refresh::{
    is_refresh_eligible, refresh_company, run_bulk_refresh, BulkRefreshResult, RefreshOptions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRefresh {
    Started,
    NothingToRefresh,
    AlreadyRunning,
}

#[derive(Default)]
struct RefreshState {
    summary: Option<RefreshSummary>,
    blocked: BTreeMap<i64, String>,
}

#[derive(Default)]
struct ProgressCounter {
    current: AtomicU64,
    total: AtomicU64,
}

/// Runs at most one bulk refresh in the background and keeps the last
/// summary and blocked map for the dashboard.
pub struct RefreshManager {
    store: Arc<dyn CompanyStore>,
    scraper: Arc<dyn ScrapeClient>,
    default_actor: String,
    state: Arc<RwLock<RefreshState>>,
    progress: Arc<ProgressCounter>,
    cancel: Arc<AtomicBool>,
    active_job: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshManager {
    pub fn new(
        store: Arc<dyn CompanyStore>,
        scraper: Arc<dyn ScrapeClient>,
        default_actor: String,
    ) -> Self {
        Self {
            store,
            scraper,
            default_actor,
            state: Arc::new(RwLock::new(RefreshState::default())),
            progress: Arc::new(ProgressCounter::default()),
            cancel: Arc::new(AtomicBool::new(false)),
            active_job: Mutex::new(None),
        }
    }

    fn options(&self, actor_name: Option<&str>, model_id: Option<String>) -> RefreshOptions {
        let actor = actor_name
            .map(str::trim)
            .filter(|actor| !actor.is_empty())
            .unwrap_or(&self.default_actor);
        RefreshOptions {
            actor_name: resolve_last_updated_by(Some(actor)),
            model_id: model_id.filter(|id| !id.trim().is_empty()),
        }
    }

    /// A run counts as active until its task ends, including by panic.
    async fn is_running(&self) -> bool {
        self.active_job
            .lock()
            .await
            .as_ref()
            .is_some_and(|job| !job.is_finished())
    }

    pub async fn start(&self, request: StartRefreshRequest) -> Result<StartRefresh> {
        let mut active_job = self.active_job.lock().await;
        if active_job.as_ref().is_some_and(|job| !job.is_finished()) {
            return Ok(StartRefresh::AlreadyRunning);
        }

        let records = self.store.list_companies().await?;
        let total = records.iter().filter(|c| is_refresh_eligible(c)).count() as u64;
        if total == 0 {
            return Ok(StartRefresh::NothingToRefresh);
        }

        let options = self.options(request.actor_name.as_deref(), request.model_id);
        self.cancel.store(false, Ordering::SeqCst);
        self.progress.current.store(0, Ordering::SeqCst);
        self.progress.total.store(total, Ordering::SeqCst);
        {
            let mut state = self.state.write().await;
            state.summary = None;
            state.blocked.clear();
        }

        let store = self.store.clone();
        let scraper = self.scraper.clone();
        let state = self.state.clone();
        let progress = self.progress.clone();
        let cancel = self.cancel.clone();

        let handle = tokio::spawn(async move {
            let result = run_bulk_refresh(
                store.as_ref(),
                scraper.as_ref(),
                &records,
                &options,
                |p: RefreshProgress| progress.current.store(p.current, Ordering::SeqCst),
                &cancel,
            )
            .await;

            let mut state = state.write().await;
            if let BulkRefreshResult::Finished(run) = result {
                state.summary = Some(run.summary);
                state.blocked = run.blocked_map;
            }
        });

        *active_job = Some(handle);
        Ok(StartRefresh::Started)
    }

    /// Asks the running refresh to stop before its next record.
    pub async fn cancel(&self) -> bool {
        let running = self.is_running().await;
        if running {
            tracing::info!("Refresh cancellation requested");
            self.cancel.store(true, Ordering::SeqCst);
        }
        running
    }

    pub async fn state(&self) -> RefreshStateResponse {
        let running = self.is_running().await;
        let state = self.state.read().await;
        let total = self.progress.total.load(Ordering::SeqCst);
        let progress = (total > 0).then(|| RefreshProgress {
            current: self.progress.current.load(Ordering::SeqCst),
            total,
        });

        RefreshStateResponse {
            running,
            progress,
            summary: state.summary.clone(),
            blocked: state.blocked.clone(),
        }
    }

    /// Refreshes a single company now. A blocked result is added to the
    /// blocked map, a successful one clears any earlier block.
    pub async fn refresh_one(
        &self,
        id: i64,
        request: StartRefreshRequest,
    ) -> Result<Option<SingleRefreshResponse>> {
        let Some(company) = self.store.get_company(id).await? else {
            return Ok(None);
        };

        let options = self.options(request.actor_name.as_deref(), request.model_id);
        let (outcome, updated) =
            refresh_company(self.store.as_ref(), self.scraper.as_ref(), &company, &options).await;

        {
            let mut state = self.state.write().await;
            match outcome.status {
                RefreshStatus::Blocked => {
                    state
                        .blocked
                        .insert(id, outcome.message.clone().unwrap_or_default());
                }
                RefreshStatus::Updated => {
                    state.blocked.remove(&id);
                }
                RefreshStatus::Failed => {}
            }
        }

        Ok(Some(SingleRefreshResponse {
            outcome,
            company: updated,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::bulk_refresh::tests::{company, FakeScraper, FakeStore};
    use async_trait::async_trait;
    use directory_scraper::{ScrapeError, ScrapeOutput};
    use shared_types::ScrapedCompany;
    use std::time::Duration;
    use tokio::sync::Notify;

    async fn wait_until_idle(manager: &RefreshManager) -> RefreshStateResponse {
        for _ in 0..200 {
            let state = manager.state().await;
            if !state.running {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("refresh did not finish");
    }

    /// Holds every scrape until released.
    struct GatedScraper {
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl ScrapeClient for GatedScraper {
        async fn scrape(
            &self,
            _url: &str,
            _model_id: Option<&str>,
        ) -> std::result::Result<ScrapeOutput, ScrapeError> {
            self.gate.notified().await;
            Ok(ScrapeOutput::default())
        }
    }

    #[tokio::test]
    async fn test_start_runs_in_background_and_rejects_second_start() {
        let records = vec![company(1, "A", Some("a.com"))];
        let gate = Arc::new(Notify::new());
        let manager = RefreshManager::new(
            Arc::new(FakeStore::with(&records)),
            Arc::new(GatedScraper { gate: gate.clone() }),
            "System".to_string(),
        );

        let first = manager.start(StartRefreshRequest::default()).await.unwrap();
        assert_eq!(first, StartRefresh::Started);
        assert!(manager.state().await.running);

        let second = manager.start(StartRefreshRequest::default()).await.unwrap();
        assert_eq!(second, StartRefresh::AlreadyRunning);

        gate.notify_one();
        let state = wait_until_idle(&manager).await;
        let summary = state.summary.unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.success_count, 1);
        assert_eq!(state.progress, Some(RefreshProgress { current: 1, total: 1 }));
    }

    struct PanickingScraper;

    #[async_trait]
    impl ScrapeClient for PanickingScraper {
        async fn scrape(
            &self,
            _url: &str,
            _model_id: Option<&str>,
        ) -> std::result::Result<ScrapeOutput, ScrapeError> {
            panic!("scraper crashed");
        }
    }

    #[tokio::test]
    async fn test_panicked_run_does_not_stay_running() {
        let records = vec![company(1, "A", Some("a.com"))];
        let manager = RefreshManager::new(
            Arc::new(FakeStore::with(&records)),
            Arc::new(PanickingScraper),
            "System".to_string(),
        );

        let first = manager.start(StartRefreshRequest::default()).await.unwrap();
        assert_eq!(first, StartRefresh::Started);

        let state = wait_until_idle(&manager).await;
        assert!(state.summary.is_none());
        assert!(!manager.cancel().await);

        let second = manager.start(StartRefreshRequest::default()).await.unwrap();
        assert_eq!(second, StartRefresh::Started);
        wait_until_idle(&manager).await;
    }

    #[tokio::test]
    async fn test_start_clears_previous_blocked_map() {
        let records = vec![company(1, "A", Some("a.com"))];
        let gate = Arc::new(Notify::new());
        let manager = RefreshManager::new(
            Arc::new(FakeStore::with(&records)),
            Arc::new(GatedScraper { gate: gate.clone() }),
            "System".to_string(),
        );
        manager.state.write().await.blocked.insert(1, "old block".to_string());

        manager.start(StartRefreshRequest::default()).await.unwrap();
        let state = manager.state().await;
        assert!(state.running);
        assert!(state.blocked.is_empty());

        gate.notify_one();
        wait_until_idle(&manager).await;
    }

    #[tokio::test]
    async fn test_start_with_no_websites() {
        let records = vec![company(1, "A", None)];
        let manager = RefreshManager::new(
            Arc::new(FakeStore::with(&records)),
            Arc::new(FakeScraper::default()),
            "System".to_string(),
        );

        let started = manager.start(StartRefreshRequest::default()).await.unwrap();

        assert_eq!(started, StartRefresh::NothingToRefresh);
        assert!(!manager.state().await.running);
        assert!(!manager.cancel().await);
    }

    #[tokio::test]
    async fn test_bulk_run_replaces_blocked_map() {
        let records = vec![company(1, "A", Some("a.com")), company(2, "B", Some("b.com"))];
        let scraper = FakeScraper::default()
            .respond(
                "https://www.a.com/",
                Err(ScrapeError::Blocked("disallowed in robots.txt".to_string())),
            )
            .respond("https://www.b.com/", Ok(ScrapedCompany::default()));
        let manager = RefreshManager::new(
            Arc::new(FakeStore::with(&records)),
            Arc::new(scraper),
            "System".to_string(),
        );
        manager.state.write().await.blocked.insert(2, "old block".to_string());

        manager.start(StartRefreshRequest::default()).await.unwrap();
        let state = wait_until_idle(&manager).await;

        assert_eq!(state.blocked.len(), 1);
        assert_eq!(
            state.blocked.get(&1).map(String::as_str),
            Some("disallowed in robots.txt")
        );
    }

    #[tokio::test]
    async fn test_single_refresh_tracks_blocked_map() {
        let records = vec![company(1, "A", Some("a.com"))];
        let blocked = FakeScraper::default().respond(
            "https://www.a.com/",
            Err(ScrapeError::Blocked("robots.txt says no".to_string())),
        );
        let store = Arc::new(FakeStore::with(&records));
        let manager = RefreshManager::new(store.clone(), Arc::new(blocked), "System".to_string());

        let response = manager
            .refresh_one(1, StartRefreshRequest::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.outcome.status, RefreshStatus::Blocked);
        assert!(response.company.is_none());
        assert!(manager.state().await.blocked.contains_key(&1));

        assert!(manager
            .refresh_one(99, StartRefreshRequest::default())
            .await
            .unwrap()
            .is_none());

        let allowed = FakeScraper::default().respond(
            "https://www.a.com/",
            Ok(ScrapedCompany {
                city: Some("Austin".to_string()),
                ..Default::default()
            }),
        );
        let manager = RefreshManager {
            scraper: Arc::new(allowed),
            ..manager
        };
        let response = manager
            .refresh_one(
                1,
                StartRefreshRequest {
                    actor_name: Some("Dana".to_string()),
                    model_id: None,
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.outcome.status, RefreshStatus::Updated);
        assert!(!manager.state().await.blocked.contains_key(&1));
        assert_eq!(store.get(1).last_updated_by.as_deref(), Some("Dana"));
    }
}
