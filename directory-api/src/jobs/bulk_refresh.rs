//! Re-scrapes every company that has a website and merges the results back
//! into the store, one company at a time.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use directory_scraper::{ScrapeClient, ScrapeError};
use normalizers::{build_payload, expand_state_code, normalize_website};
use shared_types::{
    Company, CompanyInput, RefreshOutcome, RefreshProgress, RefreshStatus, RefreshSummary,
    ScrapedCompany,
};
use tracing::{info, warn};

use crate::database::CompanyStore;
use crate::helpers::company_create::drop_invalid_fields;

pub const MISSING_WEBSITE_MESSAGE: &str = "Missing a valid website URL";

#[derive(Debug, Clone, Default)]
pub struct RefreshOptions {
    pub actor_name: String,
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshRun {
    pub summary: RefreshSummary,
    /// Company id to blocking message, for this run only.
    pub blocked_map: BTreeMap<i64, String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BulkRefreshResult {
    NothingToRefresh,
    Finished(RefreshRun),
}

pub fn is_refresh_eligible(company: &Company) -> bool {
    company.website().is_some()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Scraped values win when non-empty and valid. An invalid scraped value
/// (a malformed email, a short phone) keeps the stored one. Fields with no
/// value on either side are left out of the update.
pub fn merge_scraped(
    company: &Company,
    scraped: ScrapedCompany,
    normalized_url: &str,
    actor_name: &str,
) -> CompanyInput {
    let keep = |scraped: Option<String>, existing: &Option<String>| {
        non_empty(scraped).or_else(|| non_empty(existing.clone()))
    };

    let website = scraped
        .website_url
        .as_deref()
        .and_then(normalize_website)
        .unwrap_or_else(|| normalized_url.to_string());

    let scraped = drop_invalid_fields(CompanyInput {
        company_name: scraped.company_name,
        street_address: scraped.street_address,
        city: scraped.city,
        state: scraped
            .state
            .map(|state| expand_state_code(&state).map_or(state, str::to_string)),
        postal_code: scraped.postal_code,
        email_address: scraped.email_address,
        phone_number: scraped.phone_number,
        website_url: None,
        note_text: scraped.notes,
        ai_description: scraped.ai_description,
        last_updated_by: None,
    });

    let merged = CompanyInput {
        company_name: non_empty(scraped.company_name)
            .or_else(|| Some(company.company_name.clone())),
        street_address: keep(scraped.street_address, &company.street_address),
        city: keep(scraped.city, &company.city),
        state: keep(scraped.state, &company.state),
        postal_code: keep(scraped.postal_code, &company.postal_code),
        email_address: keep(scraped.email_address, &company.email_address),
        phone_number: keep(scraped.phone_number, &company.phone_number),
        website_url: Some(website),
        note_text: keep(scraped.note_text, &company.note_text),
        ai_description: keep(scraped.ai_description, &company.ai_description),
        last_updated_by: Some(actor_name.to_string()),
    };

    build_payload(merged)
}

fn outcome(company: &Company, status: RefreshStatus, message: Option<String>) -> RefreshOutcome {
    RefreshOutcome {
        id: company.id,
        name: company.display_name(),
        status,
        message,
    }
}

/// One scrape-merge-persist attempt. The record is only written on a
/// successful scrape.
pub async fn refresh_company(
    store: &dyn CompanyStore,
    scraper: &dyn ScrapeClient,
    company: &Company,
    options: &RefreshOptions,
) -> (RefreshOutcome, Option<Company>) {
    let Some(url) = company.website().and_then(normalize_website) else {
        warn!("Skipping company {}: no usable website", company.id);
        return (
            outcome(company, RefreshStatus::Failed, Some(MISSING_WEBSITE_MESSAGE.to_string())),
            None,
        );
    };

    let scraped = match scraper.scrape(&url, options.model_id.as_deref()).await {
        Ok(output) => output.data,
        Err(ScrapeError::Blocked(message)) => {
            warn!("Company {} blocked: {}", company.id, message);
            return (outcome(company, RefreshStatus::Blocked, Some(message)), None);
        }
        Err(ScrapeError::Failed(message)) => {
            warn!("Company {} scrape failed: {}", company.id, message);
            return (outcome(company, RefreshStatus::Failed, Some(message)), None);
        }
    };

    let update = merge_scraped(company, scraped, &url, &options.actor_name);
    match store.update_company(company.id, update).await {
        Ok(updated) => {
            info!("Refreshed company {} from {}", company.id, url);
            (outcome(&updated, RefreshStatus::Updated, None), Some(updated))
        }
        Err(e) => {
            warn!("Failed to save refreshed company {}: {}", company.id, e);
            (outcome(company, RefreshStatus::Failed, Some(e.to_string())), None)
        }
    }
}

/// Refreshes every eligible record in list order.
///
/// `progress` fires after each attempt whatever its outcome. `cancel` is
/// checked before each record; a scrape already in flight runs to completion.
pub async fn run_bulk_refresh<F>(
    store: &dyn CompanyStore,
    scraper: &dyn ScrapeClient,
    records: &[Company],
    options: &RefreshOptions,
    mut progress: F,
    cancel: &AtomicBool,
) -> BulkRefreshResult
where
    F: FnMut(RefreshProgress) + Send,
{
    let eligible: Vec<&Company> = records.iter().filter(|c| is_refresh_eligible(c)).collect();
    if eligible.is_empty() {
        return BulkRefreshResult::NothingToRefresh;
    }

    let total = eligible.len() as u64;
    info!("Refreshing {} companies", total);

    let mut run = RefreshRun::default();
    for (index, company) in eligible.into_iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            info!("Refresh cancelled after {} of {}", index, total);
            run.summary.cancelled = true;
            break;
        }

        let (outcome, _) = refresh_company(store, scraper, company, options).await;
        if outcome.status == RefreshStatus::Blocked {
            run.blocked_map
                .insert(outcome.id, outcome.message.clone().unwrap_or_default());
        }
        run.summary.record(outcome);

        progress(RefreshProgress {
            current: index as u64 + 1,
            total,
        });
    }

    info!(
        "Refresh finished: {} updated, {} blocked, {} failed",
        run.summary.success_count, run.summary.blocked_count, run.summary.failure_count
    );

    BulkRefreshResult::Finished(run)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use directory_scraper::ScrapeOutput;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    pub(crate) fn company(id: i64, name: &str, website: Option<&str>) -> Company {
        Company {
            id,
            company_name: name.to_string(),
            street_address: None,
            city: Some("Tyler".to_string()),
            state: Some("Texas".to_string()),
            postal_code: None,
            email_address: None,
            phone_number: None,
            website_url: website.map(str::to_string),
            note_text: Some("existing note".to_string()),
            ai_description: None,
            last_updated_by: None,
            added_at: 0,
            last_updated_at: 0,
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeStore {
        pub records: Mutex<HashMap<i64, Company>>,
        pub failing: HashSet<i64>,
    }

    impl FakeStore {
        pub(crate) fn with(records: &[Company]) -> Self {
            Self {
                records: Mutex::new(records.iter().map(|c| (c.id, c.clone())).collect()),
                failing: HashSet::new(),
            }
        }

        pub(crate) fn get(&self, id: i64) -> Company {
            self.records.lock().unwrap()[&id].clone()
        }
    }

    #[async_trait]
    impl CompanyStore for FakeStore {
        async fn list_companies(&self) -> Result<Vec<Company>> {
            let mut all: Vec<Company> = self.records.lock().unwrap().values().cloned().collect();
            all.sort_by_key(|c| c.id);
            Ok(all)
        }

        async fn get_company(&self, id: i64) -> Result<Option<Company>> {
            Ok(self.records.lock().unwrap().get(&id).cloned())
        }

        async fn update_company(&self, id: i64, input: CompanyInput) -> Result<Company> {
            if self.failing.contains(&id) {
                return Err(anyhow!("database is locked"));
            }
            let mut records = self.records.lock().unwrap();
            let company = records.get_mut(&id).ok_or_else(|| anyhow!("not found"))?;
            if let Some(name) = input.company_name {
                company.company_name = name;
            }
            company.city = input.city.or(company.city.take());
            company.website_url = input.website_url.or(company.website_url.take());
            company.note_text = input.note_text.or(company.note_text.take());
            company.last_updated_by = input.last_updated_by;
            company.last_updated_at += 1;
            Ok(company.clone())
        }
    }

    #[derive(Default)]
    pub(crate) struct FakeScraper {
        pub responses: HashMap<String, std::result::Result<ScrapedCompany, ScrapeError>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeScraper {
        pub(crate) fn respond(
            mut self,
            url: &str,
            response: std::result::Result<ScrapedCompany, ScrapeError>,
        ) -> Self {
            self.responses.insert(url.to_string(), response);
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ScrapeClient for FakeScraper {
        async fn scrape(
            &self,
            url: &str,
            _model_id: Option<&str>,
        ) -> std::result::Result<ScrapeOutput, ScrapeError> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.responses.get(url) {
                Some(Ok(data)) => Ok(ScrapeOutput {
                    data: data.clone(),
                    meta: None,
                }),
                Some(Err(e)) => Err(e.clone()),
                None => Err(ScrapeError::Failed("no fixture".to_string())),
            }
        }
    }

    fn options() -> RefreshOptions {
        RefreshOptions {
            actor_name: "Dana".to_string(),
            model_id: None,
        }
    }

    fn city(value: &str) -> ScrapedCompany {
        ScrapedCompany {
            city: Some(value.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_nothing_to_refresh_skips_scraper() {
        let records = vec![company(1, "A", None), company(2, "B", Some("   "))];
        let store = FakeStore::with(&records);
        let scraper = FakeScraper::default();
        let cancel = AtomicBool::new(false);

        let result = run_bulk_refresh(&store, &scraper, &records, &options(), |_| {}, &cancel).await;

        assert_eq!(result, BulkRefreshResult::NothingToRefresh);
        assert!(scraper.calls().is_empty());
    }

    #[tokio::test]
    async fn test_blocked_updated_and_ineligible_records() {
        let records = vec![
            company(1, "Alpha", Some("alpha.com")),
            company(2, "Beta", Some("beta.com")),
            company(3, "Gamma", None),
        ];
        let store = FakeStore::with(&records);
        let scraper = FakeScraper::default()
            .respond(
                "https://www.alpha.com/",
                Err(directory_scraper::classify_scrape_failure(
                    "Error: robots.txt disallow",
                )),
            )
            .respond("https://www.beta.com/", Ok(city("Austin")));
        let cancel = AtomicBool::new(false);

        let BulkRefreshResult::Finished(run) =
            run_bulk_refresh(&store, &scraper, &records, &options(), |_| {}, &cancel).await
        else {
            panic!("expected a finished run");
        };

        assert_eq!(run.summary.total, 2);
        assert_eq!(run.summary.success_count, 1);
        assert_eq!(run.summary.blocked_count, 1);
        assert_eq!(run.summary.failure_count, 0);
        assert_eq!(
            run.blocked_map.get(&1).map(String::as_str),
            Some("Error: robots.txt disallow")
        );

        assert_eq!(store.get(1), records[0]);
        assert_eq!(store.get(2).city.as_deref(), Some("Austin"));
        assert_eq!(store.get(2).last_updated_by.as_deref(), Some("Dana"));
        assert_eq!(store.get(3), records[2]);
    }

    #[tokio::test]
    async fn test_progress_once_per_eligible_record() {
        let records = vec![
            company(1, "A", Some("a.com")),
            company(2, "B", None),
            company(3, "C", Some("c.com")),
            company(4, "D", Some("d.com")),
        ];
        let store = FakeStore::with(&records);
        let scraper = FakeScraper::default();
        let cancel = AtomicBool::new(false);
        let mut seen = Vec::new();

        run_bulk_refresh(
            &store,
            &scraper,
            &records,
            &options(),
            |p| seen.push((p.current, p.total)),
            &cancel,
        )
        .await;

        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn test_unparsable_website_fails_without_scrape() {
        let records = vec![company(1, "A", Some("not a url"))];
        let store = FakeStore::with(&records);
        let scraper = FakeScraper::default();
        let cancel = AtomicBool::new(false);

        let BulkRefreshResult::Finished(run) =
            run_bulk_refresh(&store, &scraper, &records, &options(), |_| {}, &cancel).await
        else {
            panic!("expected a finished run");
        };

        assert_eq!(run.summary.failure_count, 1);
        assert_eq!(
            run.summary.failures[0].message.as_deref(),
            Some(MISSING_WEBSITE_MESSAGE)
        );
        assert!(scraper.calls().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_counts_as_failed() {
        let records = vec![company(1, "A", Some("a.com")), company(2, "B", Some("b.com"))];
        let mut store = FakeStore::with(&records);
        store.failing.insert(1);
        let scraper = FakeScraper::default()
            .respond("https://www.a.com/", Ok(city("Austin")))
            .respond("https://www.b.com/", Ok(city("Dallas")));
        let cancel = AtomicBool::new(false);

        let BulkRefreshResult::Finished(run) =
            run_bulk_refresh(&store, &scraper, &records, &options(), |_| {}, &cancel).await
        else {
            panic!("expected a finished run");
        };

        assert_eq!(run.summary.success_count, 1);
        assert_eq!(run.summary.failure_count, 1);
        assert_eq!(
            run.summary.failures[0].message.as_deref(),
            Some("database is locked")
        );
        assert_eq!(store.get(2).city.as_deref(), Some("Dallas"));
    }

    #[tokio::test]
    async fn test_cancel_stops_before_next_record() {
        let records = vec![
            company(1, "A", Some("a.com")),
            company(2, "B", Some("b.com")),
            company(3, "C", Some("c.com")),
        ];
        let store = FakeStore::with(&records);
        let scraper = FakeScraper::default()
            .respond("https://www.a.com/", Ok(city("Austin")))
            .respond("https://www.b.com/", Ok(city("Dallas")));
        let cancel = AtomicBool::new(false);

        let BulkRefreshResult::Finished(run) = run_bulk_refresh(
            &store,
            &scraper,
            &records,
            &options(),
            |p| {
                if p.current == 2 {
                    cancel.store(true, Ordering::SeqCst);
                }
            },
            &cancel,
        )
        .await
        else {
            panic!("expected a finished run");
        };

        assert!(run.summary.cancelled);
        assert_eq!(run.summary.total, 2);
        assert_eq!(scraper.calls().len(), 2);
    }

    #[test]
    fn test_merge_prefers_non_empty_scraped_values() {
        let existing = company(1, "Acme", Some("acme.com"));
        let scraped = ScrapedCompany {
            company_name: Some("  ".to_string()),
            city: Some("austin".to_string()),
            website_url: Some("acme-supply.com".to_string()),
            notes: None,
            ..Default::default()
        };

        let merged = merge_scraped(&existing, scraped, "https://www.acme.com/", "Dana");

        assert_eq!(merged.company_name.as_deref(), Some("Acme"));
        assert_eq!(merged.city.as_deref(), Some("Austin"));
        assert_eq!(merged.state.as_deref(), Some("Texas"));
        assert_eq!(merged.website_url.as_deref(), Some("https://www.acme-supply.com/"));
        assert_eq!(merged.note_text.as_deref(), Some("existing note"));
        assert_eq!(merged.street_address, None);
        assert_eq!(merged.last_updated_by.as_deref(), Some("Dana"));
    }

    #[test]
    fn test_merge_normalizes_numeric_scraped_values() {
        let existing = company(1, "Acme", Some("acme.com"));
        let scraped = directory_scraper::llm_scraper::parse_scraped_json(
            r#"{"company_name":"Acme","state":"OK","postal_code":75701,"phone_number":9035550100}"#,
        )
        .unwrap();

        let merged = merge_scraped(&existing, scraped, "https://www.acme.com/", "Dana");

        assert_eq!(merged.state.as_deref(), Some("Oklahoma"));
        assert_eq!(merged.postal_code.as_deref(), Some("75701"));
        assert_eq!(merged.phone_number.as_deref(), Some("903-555-0100"));
    }

    #[test]
    fn test_merge_keeps_stored_values_over_invalid_scrape() {
        let existing = Company {
            email_address: Some("info@acme.com".to_string()),
            phone_number: Some("903-555-0100".to_string()),
            postal_code: Some("75701".to_string()),
            ..company(1, "Acme", Some("acme.com"))
        };
        let scraped = ScrapedCompany {
            email_address: Some("contact us".to_string()),
            phone_number: Some("555-0199".to_string()),
            state: Some("Atlantis".to_string()),
            postal_code: Some("757".to_string()),
            ..Default::default()
        };

        let merged = merge_scraped(&existing, scraped, "https://www.acme.com/", "Dana");

        assert_eq!(merged.email_address.as_deref(), Some("info@acme.com"));
        assert_eq!(merged.phone_number.as_deref(), Some("903-555-0100"));
        assert_eq!(merged.state.as_deref(), Some("Texas"));
        assert_eq!(merged.postal_code.as_deref(), Some("75701"));
    }
}
