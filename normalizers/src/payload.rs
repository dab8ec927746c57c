use std::collections::BTreeMap;

use shared_types::{CompanyField, CompanyInput};

use crate::fields::{format_phone, normalize_zip, title_case, validate_field, VALIDATE_ON_SUBMIT_FIELDS};
use crate::states::autocomplete_state;
use crate::website::normalize_website;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// Every submit field is checked and the company name is required.
    Create,
    /// Only fields present in the input are checked.
    Update,
}

/// Cleans a form before it is sent to the store.
///
/// Fields left as `None` stay `None`. A blank email or phone becomes an empty
/// string so a partial update clears the column. A website that fails to
/// normalize is kept as entered and left for validation to reject.
pub fn build_payload(mut input: CompanyInput) -> CompanyInput {
    if let Some(name) = input.company_name.as_mut() {
        *name = name.trim().to_string();
    }
    if let Some(actor) = input.last_updated_by.as_mut() {
        *actor = actor.trim().to_string();
    }
    if let Some(email) = input.email_address.as_mut() {
        *email = email.trim().to_string();
    }
    if let Some(website) = input.website_url.as_mut() {
        let trimmed = website.trim();
        *website = normalize_website(trimmed).unwrap_or_else(|| trimmed.to_string());
    }
    if let Some(state) = input.state.as_mut() {
        *state = autocomplete_state(state);
    }
    if let Some(city) = input.city.as_mut() {
        *city = title_case(city);
    }
    if let Some(zip) = input.postal_code.as_mut() {
        *zip = normalize_zip(zip);
    }
    if let Some(phone) = input.phone_number.as_mut() {
        *phone = format_phone(phone).formatted;
    }
    input
}

/// Field errors for a submit; an empty map means the input may be saved.
pub fn validate_for_submit(
    input: &CompanyInput,
    mode: SubmitMode,
) -> BTreeMap<CompanyField, &'static str> {
    let mut errors = BTreeMap::new();

    let fields = std::iter::once(CompanyField::CompanyName).chain(VALIDATE_ON_SUBMIT_FIELDS);
    for field in fields {
        let value = match (input.get(field), mode) {
            (Some(value), _) => value,
            (None, SubmitMode::Create) => "",
            (None, SubmitMode::Update) => continue,
        };
        if let Some(message) = validate_field(field, value) {
            errors.insert(field, message);
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{MSG_INVALID_PHONE, MSG_INVALID_POSTAL_CODE, MSG_NAME_REQUIRED};

    fn raw_input() -> CompanyInput {
        CompanyInput {
            company_name: Some("  Acme Supply ".to_string()),
            city: Some("tyler".to_string()),
            state: Some("tex".to_string()),
            postal_code: Some("75701-4421".to_string()),
            phone_number: Some("(903) 555 0100".to_string()),
            email_address: Some("  ".to_string()),
            website_url: Some("acme.com".to_string()),
            last_updated_by: Some(" Dana ".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_build_payload_formats_fields() {
        let payload = build_payload(raw_input());

        assert_eq!(payload.company_name.as_deref(), Some("Acme Supply"));
        assert_eq!(payload.city.as_deref(), Some("Tyler"));
        assert_eq!(payload.state.as_deref(), Some("Texas"));
        assert_eq!(payload.postal_code.as_deref(), Some("75701"));
        assert_eq!(payload.phone_number.as_deref(), Some("903-555-0100"));
        assert_eq!(payload.email_address.as_deref(), Some(""));
        assert_eq!(payload.website_url.as_deref(), Some("https://www.acme.com/"));
        assert_eq!(payload.last_updated_by.as_deref(), Some("Dana"));
        assert_eq!(payload.note_text, None);
    }

    #[test]
    fn test_build_payload_keeps_unparsable_website() {
        let payload = build_payload(CompanyInput {
            website_url: Some(" not a url ".to_string()),
            ..Default::default()
        });
        assert_eq!(payload.website_url.as_deref(), Some("not a url"));
    }

    #[test]
    fn test_validate_create_requires_name() {
        let errors = validate_for_submit(&CompanyInput::default(), SubmitMode::Create);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[&CompanyField::CompanyName], MSG_NAME_REQUIRED);
    }

    #[test]
    fn test_validate_update_only_checks_present_fields() {
        let input = CompanyInput {
            postal_code: Some("1234".to_string()),
            ..Default::default()
        };
        let errors = validate_for_submit(&input, SubmitMode::Update);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[&CompanyField::PostalCode], MSG_INVALID_POSTAL_CODE);
    }

    #[test]
    fn test_validate_collects_every_field_error() {
        let input = CompanyInput {
            company_name: Some("Acme".to_string()),
            phone_number: Some("555".to_string()),
            postal_code: Some("123".to_string()),
            ..Default::default()
        };
        let errors = validate_for_submit(&input, SubmitMode::Create);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[&CompanyField::PhoneNumber], MSG_INVALID_PHONE);
    }

    #[test]
    fn test_built_payload_passes_validation() {
        let payload = build_payload(raw_input());
        assert!(validate_for_submit(&payload, SubmitMode::Create).is_empty());
    }
}
