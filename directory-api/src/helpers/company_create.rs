use std::collections::BTreeMap;

use anyhow::Result;
use normalizers::{
    build_payload, detect_duplicate, find_existing_by_name, validate_field, validate_for_submit,
    SubmitMode, VALIDATE_ON_SUBMIT_FIELDS,
};
use shared_types::{Company, CompanyField, CompanyInput, DuplicateMatch, DuplicateReason};

use crate::database::companies as db;
use crate::database::AsyncDbConnection;

#[derive(Debug)]
pub enum CreateOutcome {
    Created(Company),
    Invalid(BTreeMap<CompanyField, String>),
    Duplicate(DuplicateMatch),
}

/// Sanitize, validate, check for an existing record, then insert.
///
/// The duplicate check runs against a fresh listing. Two clients can still
/// race past it; the unique name index catches that case and it is reported
/// as a duplicate as well.
pub async fn create_company(conn: AsyncDbConnection, input: CompanyInput) -> Result<CreateOutcome> {
    let payload = build_payload(input);

    let errors = validate_for_submit(&payload, SubmitMode::Create);
    if !errors.is_empty() {
        let fields = errors
            .into_iter()
            .map(|(field, message)| (field, message.to_string()))
            .collect();
        return Ok(CreateOutcome::Invalid(fields));
    }

    let existing = db::list_companies(conn.clone()).await?;
    if let Some(duplicate) = detect_duplicate(
        &existing,
        payload.company_name.as_deref(),
        payload.website_url.as_deref(),
    ) {
        return Ok(CreateOutcome::Duplicate(duplicate));
    }

    match db::insert_company(conn.clone(), &payload).await {
        Ok(company) => Ok(CreateOutcome::Created(company)),
        Err(e) if db::is_unique_violation(&e) => {
            let name = payload.company_name.as_deref().unwrap_or("");
            let existing = db::list_companies(conn).await?;
            match find_existing_by_name(&existing, name) {
                Some(company) => Ok(CreateOutcome::Duplicate(DuplicateMatch {
                    existing: company.clone(),
                    reason: DuplicateReason::Name,
                })),
                None => Err(e),
            }
        }
        Err(e) => Err(e),
    }
}

/// Sanitizes scraped or imported values and blanks out the optional ones
/// that would still fail validation, so one bad field does not reject the
/// whole record.
pub fn drop_invalid_fields(input: CompanyInput) -> CompanyInput {
    let mut payload = build_payload(input);
    for field in VALIDATE_ON_SUBMIT_FIELDS {
        let invalid = payload
            .get(field)
            .is_some_and(|value| validate_field(field, value).is_some());
        if invalid {
            tracing::debug!("Dropping invalid {} value {:?}", field, payload.get(field));
            payload.set(field, None);
        }
    }
    payload
}
