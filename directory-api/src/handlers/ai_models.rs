use actix_web::{web, HttpResponse, Result as ActixResult};

use crate::handlers::scrape::ScrapeAppState;

pub async fn list_ai_models(state: web::Data<ScrapeAppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.registry.describe()))
}
