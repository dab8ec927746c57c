use actix_web::{web, HttpResponse, Result as ActixResult};
use directory_scraper::{ModelRegistry, ScrapeClient};
use normalizers::{find_existing_by_website, normalize_website};
use shared_types::{DuplicateMatch, DuplicateReason, ErrorResponse, ScrapeRequest, ScrapeResponse};
use std::sync::Arc;

use crate::database::companies as db;
use crate::database::Database;
use crate::handlers::companies::DUPLICATE_MESSAGE;

#[derive(Clone)]
pub struct ScrapeAppState {
    pub scraper: Arc<dyn ScrapeClient>,
    pub registry: Arc<ModelRegistry>,
}

pub async fn scrape_url(
    state: web::Data<ScrapeAppState>,
    database: web::Data<Arc<Database>>,
    request: web::Json<ScrapeRequest>,
) -> ActixResult<HttpResponse> {
    let raw_url = request.url.trim();
    if raw_url.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Missing 'url' in body".to_string(),
        }));
    }

    let Some(url) = normalize_website(raw_url) else {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Please enter a valid website URL".to_string(),
        }));
    };

    if request.check_duplicate {
        let companies = db::list_companies(database.async_connection.clone())
            .await
            .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

        if let Some(existing) = find_existing_by_website(&companies, &url) {
            return Ok(HttpResponse::Conflict().json(serde_json::json!({
                "error": DUPLICATE_MESSAGE,
                "duplicate": DuplicateMatch {
                    existing: existing.clone(),
                    reason: DuplicateReason::Website,
                },
            })));
        }
    }

    let model_id = state.registry.sanitize_model_id(request.model_id.as_deref());
    tracing::info!("Scraping {} with model {:?}", url, model_id);

    let response = match state.scraper.scrape(&url, model_id.as_deref()).await {
        Ok(output) => ScrapeResponse {
            success: true,
            data: Some(output.data),
            error: None,
            blocked: false,
            normalized_url: Some(url),
            meta: output.meta,
        },
        Err(e) => {
            tracing::warn!("Scrape of {} failed: {}", url, e);
            ScrapeResponse {
                success: false,
                data: None,
                error: Some(e.message().to_string()),
                blocked: e.is_blocked(),
                normalized_url: Some(url),
                meta: None,
            }
        }
    };

    Ok(HttpResponse::Ok().json(response))
}
