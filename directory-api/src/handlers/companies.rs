use actix_web::{web, HttpResponse, Result as ActixResult};
use normalizers::{
    build_payload, detect_duplicate, filter_companies, validate_for_submit, SubmitMode,
};
use serde::Deserialize;
use shared_types::{
    BulkDeleteRequest, BulkDeleteResponse, CheckDuplicateRequest, CompaniesResponse, CompanyField,
    CompanyInput, DuplicateResponse, ErrorResponse, ValidationErrorResponse,
};
use std::sync::Arc;

use crate::database::companies as db;
use crate::database::Database;
use crate::helpers::company_create::{create_company as create, CreateOutcome};

pub const DUPLICATE_MESSAGE: &str = "Company already exists";

#[derive(Debug, Deserialize)]
pub struct ListCompaniesQuery {
    pub q: Option<String>,
}

fn validation_failed<K: ToString>(
    fields: impl IntoIterator<Item = (CompanyField, K)>,
) -> HttpResponse {
    HttpResponse::BadRequest().json(ValidationErrorResponse {
        error: "Validation failed".to_string(),
        fields: fields
            .into_iter()
            .map(|(field, message)| (field, message.to_string()))
            .collect(),
    })
}

pub async fn list_companies(
    database: web::Data<Arc<Database>>,
    query: web::Query<ListCompaniesQuery>,
) -> ActixResult<HttpResponse> {
    let companies = db::list_companies(database.async_connection.clone())
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

    let companies = match query.q.as_deref() {
        Some(q) => filter_companies(&companies, q).into_iter().cloned().collect(),
        None => companies,
    };

    Ok(HttpResponse::Ok().json(CompaniesResponse { companies }))
}

pub async fn get_company(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let company_id = path.into_inner();

    let company = db::get_company(database.async_connection.clone(), company_id)
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?
        .ok_or_else(|| actix_web::error::ErrorNotFound("Company not found"))?;

    Ok(HttpResponse::Ok().json(company))
}

pub async fn create_company(
    database: web::Data<Arc<Database>>,
    request: web::Json<CompanyInput>,
) -> ActixResult<HttpResponse> {
    let outcome = create(database.async_connection.clone(), request.into_inner())
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

    Ok(match outcome {
        CreateOutcome::Created(company) => HttpResponse::Created().json(company),
        CreateOutcome::Invalid(fields) => validation_failed(fields),
        CreateOutcome::Duplicate(duplicate) => HttpResponse::Conflict().json(serde_json::json!({
            "error": DUPLICATE_MESSAGE,
            "duplicate": duplicate,
        })),
    })
}

pub async fn update_company(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
    request: web::Json<CompanyInput>,
) -> ActixResult<HttpResponse> {
    let company_id = path.into_inner();
    let payload = build_payload(request.into_inner());

    let errors = validate_for_submit(&payload, SubmitMode::Update);
    if !errors.is_empty() {
        return Ok(validation_failed(errors));
    }

    match db::update_company(database.async_connection.clone(), company_id, &payload).await {
        Ok(Some(company)) => Ok(HttpResponse::Ok().json(company)),
        Ok(None) => Err(actix_web::error::ErrorNotFound("Company not found")),
        Err(e) if db::is_unique_violation(&e) => Ok(HttpResponse::Conflict().json(ErrorResponse {
            error: DUPLICATE_MESSAGE.to_string(),
        })),
        Err(e) => Err(actix_web::error::ErrorInternalServerError(e.to_string())),
    }
}

pub async fn delete_company(
    database: web::Data<Arc<Database>>,
    path: web::Path<i64>,
) -> ActixResult<HttpResponse> {
    let company_id = path.into_inner();

    let deleted = db::delete_company(database.async_connection.clone(), company_id)
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

    if !deleted {
        return Err(actix_web::error::ErrorNotFound("Company not found"));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Company deleted successfully"
    })))
}

pub async fn bulk_delete_companies(
    database: web::Data<Arc<Database>>,
    request: web::Json<BulkDeleteRequest>,
) -> ActixResult<HttpResponse> {
    let (deleted, failed) = db::delete_companies(database.async_connection.clone(), &request.ids)
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

    if !failed.is_empty() {
        tracing::warn!("Bulk delete could not remove ids {:?}", failed);
    }

    Ok(HttpResponse::Ok().json(BulkDeleteResponse { deleted, failed }))
}

pub async fn check_duplicate(
    database: web::Data<Arc<Database>>,
    request: web::Json<CheckDuplicateRequest>,
) -> ActixResult<HttpResponse> {
    let companies = db::list_companies(database.async_connection.clone())
        .await
        .map_err(|e| actix_web::error::ErrorInternalServerError(e.to_string()))?;

    let duplicate = detect_duplicate(
        &companies,
        request.name.as_deref(),
        request.website.as_deref(),
    );

    Ok(HttpResponse::Ok().json(DuplicateResponse { duplicate }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use normalizers::fields::{MSG_INVALID_EMAIL, MSG_INVALID_PHONE};
    use shared_types::Company;

    fn test_database() -> (tempfile::TempDir, Arc<Database>) {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::new(&dir.path().join("db.sqlite")).unwrap();
        (dir, Arc::new(database))
    }

    #[actix_web::test]
    async fn test_create_status_codes() {
        let (_dir, database) = test_database();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(database.clone()))
                .route("/api/companies", web::post().to(create_company)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/companies")
            .set_json(serde_json::json!({ "company_name": "Acme", "website_url": "acme.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let acme: Company = test::read_body_json(resp).await;
        assert_eq!(acme.website_url.as_deref(), Some("https://www.acme.com/"));

        let req = test::TestRequest::post()
            .uri("/api/companies")
            .set_json(serde_json::json!({ "company_name": "Beta", "email_address": "nope" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ValidationErrorResponse = test::read_body_json(resp).await;
        assert_eq!(
            body.fields.get(&CompanyField::EmailAddress).map(String::as_str),
            Some(MSG_INVALID_EMAIL)
        );

        let req = test::TestRequest::post()
            .uri("/api/companies")
            .set_json(serde_json::json!({
                "company_name": "Zeta Traders",
                "website_url": "https://acme.com/"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], DUPLICATE_MESSAGE);
        assert_eq!(body["duplicate"]["reason"], "website");
        assert_eq!(body["duplicate"]["existing"]["id"], acme.id);
    }

    #[actix_web::test]
    async fn test_update_status_codes() {
        let (_dir, database) = test_database();
        let conn = database.async_connection.clone();
        for name in ["Acme", "Beta"] {
            db::insert_company(
                conn.clone(),
                &CompanyInput {
                    company_name: Some(name.to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }
        let beta = db::list_companies(conn)
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.company_name == "Beta")
            .unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(database.clone()))
                .route("/api/companies/{id}", web::put().to(update_company)),
        )
        .await;

        let req = test::TestRequest::put()
            .uri(&format!("/api/companies/{}", beta.id))
            .set_json(serde_json::json!({ "company_name": "ACME" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::put()
            .uri(&format!("/api/companies/{}", beta.id))
            .set_json(serde_json::json!({ "phone_number": "555" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ValidationErrorResponse = test::read_body_json(resp).await;
        assert_eq!(
            body.fields.get(&CompanyField::PhoneNumber).map(String::as_str),
            Some(MSG_INVALID_PHONE)
        );

        let req = test::TestRequest::put()
            .uri("/api/companies/999")
            .set_json(serde_json::json!({ "city": "Tyler" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
