//! Normalizers Crate
//!
//! Pure functions that turn raw company input into canonical form and decide
//! when two company records describe the same business. Nothing here performs
//! I/O, so every function is safe to call before a mutation.
//!
//! # Modules
//!
//! - `website`: display normalization and comparison canonicalization of URLs
//! - `fields`: per-field sanitization and validation for the company forms
//! - `states`: US state table, suggestions and autocomplete
//! - `payload`: whole-form cleanup before a create or update is submitted
//! - `duplicate`: website-then-name duplicate detection
//! - `search`: free-text filtering of company lists
//!
//! # Example
//!
//! ```rust,ignore
//! use normalizers::{canonicalize_url, detect_duplicate};
//!
//! assert_eq!(canonicalize_url("Example.com/"), "https://www.example.com");
//! let conflict = detect_duplicate(&companies, Some("Acme"), Some("acme.com"));
//! ```

pub mod duplicate;
pub mod fields;
pub mod payload;
pub mod search;
pub mod states;
pub mod website;

pub use duplicate::{
    detect_duplicate, find_existing_by_name, find_existing_by_website, normalize_company_name,
};
pub use fields::{
    char_limit, digits_only, format_phone, normalize_zip, sanitize_field, title_case,
    validate_field, FormattedPhone, VALIDATE_ON_SUBMIT_FIELDS,
};
pub use payload::{build_payload, validate_for_submit, SubmitMode};
pub use search::filter_companies;
pub use states::{
    autocomplete_state, expand_state_code, is_us_state, state_suggestions, US_STATES,
};
pub use website::{canonicalize_url, is_valid_website, normalize_website};
