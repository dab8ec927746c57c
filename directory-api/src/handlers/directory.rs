use actix_web::{web, HttpResponse, Result as ActixResult};
use shared_types::{ErrorResponse, StartDirectoryImportRequest};
use std::sync::Arc;

use crate::jobs::directory_import_manager::DirectoryImportManager;

pub async fn start_directory_import(
    manager: web::Data<Arc<DirectoryImportManager>>,
    request: web::Json<StartDirectoryImportRequest>,
) -> ActixResult<HttpResponse> {
    if request.url.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Missing 'url' in body".to_string(),
        }));
    }

    if let Err(e) = manager.start(&request.url).await {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: e.to_string(),
        }));
    }

    Ok(HttpResponse::Ok().json(manager.status().await))
}

pub async fn get_directory_status(
    manager: web::Data<Arc<DirectoryImportManager>>,
) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(manager.status().await))
}

pub async fn cancel_directory_import(
    manager: web::Data<Arc<DirectoryImportManager>>,
) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(manager.cancel().await))
}
