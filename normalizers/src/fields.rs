use lazy_static::lazy_static;
use regex::Regex;
use shared_types::CompanyField;

use crate::states::is_us_state;
use crate::website::is_valid_website;

pub const PHONE_DIGIT_LIMIT: usize = 10;
pub const POSTAL_CODE_DIGITS: usize = 5;

/// Fields checked on submit in addition to the company name.
pub const VALIDATE_ON_SUBMIT_FIELDS: [CompanyField; 5] = [
    CompanyField::WebsiteUrl,
    CompanyField::EmailAddress,
    CompanyField::PhoneNumber,
    CompanyField::State,
    CompanyField::PostalCode,
];

pub const MSG_NAME_REQUIRED: &str = "Company name is required";
pub const MSG_INVALID_WEBSITE: &str = "Please enter a valid website URL";
pub const MSG_INVALID_EMAIL: &str = "Please enter a valid email address";
pub const MSG_INVALID_PHONE: &str = "Enter a 10-digit phone number";
pub const MSG_INVALID_POSTAL_CODE: &str = "Zip code must be 5 digits";
pub const MSG_INVALID_STATE: &str = "Select a valid US state";
pub const MSG_TOO_LONG: &str = "Value is too long";

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"(?i)^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    static ref POSTAL_CODE_RE: Regex = Regex::new(r"^\d{5}$").unwrap();
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedPhone {
    pub formatted: String,
    pub digits: String,
}

/// Maximum character count accepted for a field.
pub fn char_limit(field: CompanyField) -> Option<usize> {
    match field {
        CompanyField::CompanyName
        | CompanyField::WebsiteUrl
        | CompanyField::EmailAddress
        | CompanyField::StreetAddress => Some(200),
        CompanyField::City | CompanyField::State => Some(50),
        CompanyField::NoteText => Some(1000),
        CompanyField::PhoneNumber | CompanyField::PostalCode | CompanyField::AiDescription => None,
    }
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Progressive `XXX`, `XXX-XXX`, `XXX-XXX-XXXX` formatting of up to ten digits.
pub fn format_phone(raw: &str) -> FormattedPhone {
    let digits: String = digits_only(raw).chars().take(PHONE_DIGIT_LIMIT).collect();
    let formatted = match digits.len() {
        0..=3 => digits.clone(),
        4..=6 => format!("{}-{}", &digits[..3], &digits[3..]),
        _ => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
    };
    FormattedPhone { formatted, digits }
}

pub fn normalize_zip(value: &str) -> String {
    digits_only(value).chars().take(POSTAL_CODE_DIGITS).collect()
}

/// Trims, lowercases, then capitalizes every word character that follows a
/// non-word character ("st. louis" becomes "St. Louis").
pub fn title_case(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut prev_is_word = false;
    for c in lowered.chars() {
        let is_word = c.is_alphanumeric() || c == '_';
        if is_word && !prev_is_word {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        prev_is_word = is_word;
    }
    out
}

/// Keystroke-level cleanup of a single field value.
pub fn sanitize_field(field: CompanyField, raw: &str) -> String {
    match field {
        CompanyField::PhoneNumber => format_phone(raw).formatted,
        CompanyField::PostalCode => normalize_zip(raw),
        CompanyField::City | CompanyField::State => title_case(raw),
        CompanyField::EmailAddress | CompanyField::WebsiteUrl => raw.trim().to_string(),
        _ => raw.to_string(),
    }
}

/// Returns the error message for an invalid value, `None` when valid.
/// Empty optional fields are always valid.
pub fn validate_field(field: CompanyField, raw: &str) -> Option<&'static str> {
    let value = raw.trim();

    if field == CompanyField::CompanyName && value.is_empty() {
        return Some(MSG_NAME_REQUIRED);
    }
    if value.is_empty() {
        return None;
    }
    if let Some(limit) = char_limit(field) {
        if value.chars().count() > limit {
            return Some(MSG_TOO_LONG);
        }
    }

    match field {
        CompanyField::WebsiteUrl if !is_valid_website(value) => Some(MSG_INVALID_WEBSITE),
        CompanyField::EmailAddress if !EMAIL_RE.is_match(value) => Some(MSG_INVALID_EMAIL),
        CompanyField::PhoneNumber if digits_only(value).len() != PHONE_DIGIT_LIMIT => {
            Some(MSG_INVALID_PHONE)
        }
        CompanyField::PostalCode if !POSTAL_CODE_RE.is_match(value) => {
            Some(MSG_INVALID_POSTAL_CODE)
        }
        CompanyField::State if !is_us_state(value) => Some(MSG_INVALID_STATE),
        _ => None,
    }
}
