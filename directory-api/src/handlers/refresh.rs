use actix_web::{web, HttpResponse, Result as ActixResult};
use shared_types::{ErrorResponse, StartRefreshRequest};
use std::sync::Arc;

use crate::jobs::refresh_manager::{RefreshManager, StartRefresh};

pub async fn start_refresh(
    manager: web::Data<Arc<RefreshManager>>,
    request: Option<web::Json<StartRefreshRequest>>,
) -> ActixResult<HttpResponse> {
    let request = request.map(|r| r.into_inner()).unwrap_or_default();

    let started = manager
        .start(request)
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

    Ok(match started {
        StartRefresh::Started => {
            HttpResponse::Ok().json(serde_json::json!({ "status": "started" }))
        }
        StartRefresh::NothingToRefresh => {
            HttpResponse::Ok().json(serde_json::json!({ "status": "nothing-to-refresh" }))
        }
        StartRefresh::AlreadyRunning => HttpResponse::Conflict().json(ErrorResponse {
            error: "A refresh is already running".to_string(),
        }),
    })
}

pub async fn get_refresh_state(
    manager: web::Data<Arc<RefreshManager>>,
) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(manager.state().await))
}

pub async fn cancel_refresh(
    manager: web::Data<Arc<RefreshManager>>,
) -> ActixResult<HttpResponse> {
    let cancelled = manager.cancel().await;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "cancelled": cancelled })))
}

pub async fn refresh_company(
    manager: web::Data<Arc<RefreshManager>>,
    path: web::Path<i64>,
    request: Option<web::Json<StartRefreshRequest>>,
) -> ActixResult<HttpResponse> {
    let company_id = path.into_inner();
    let request = request.map(|r| r.into_inner()).unwrap_or_default();

    let response = manager
        .refresh_one(company_id, request)
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?
        .ok_or_else(|| actix_web::error::ErrorNotFound("Company not found"))?;

    Ok(HttpResponse::Ok().json(response))
}
