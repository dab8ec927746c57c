use shared_types::{Company, DuplicateMatch, DuplicateReason};

use crate::website::canonicalize_url;

pub fn normalize_company_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// First record, in list order, whose canonical website equals the
/// candidate's. A candidate without a canonical form matches nothing.
pub fn find_existing_by_website<'a>(records: &'a [Company], website: &str) -> Option<&'a Company> {
    let target = canonicalize_url(website);
    if target.is_empty() {
        return None;
    }
    records.iter().find(|company| {
        company
            .website()
            .map(canonicalize_url)
            .is_some_and(|existing| existing == target)
    })
}

pub fn find_existing_by_name<'a>(records: &'a [Company], name: &str) -> Option<&'a Company> {
    let target = normalize_company_name(name);
    if target.is_empty() {
        return None;
    }
    records
        .iter()
        .find(|company| normalize_company_name(&company.company_name) == target)
}

/// Website match first, then name match.
pub fn detect_duplicate(
    records: &[Company],
    name: Option<&str>,
    website: Option<&str>,
) -> Option<DuplicateMatch> {
    if let Some(existing) = website.and_then(|url| find_existing_by_website(records, url)) {
        return Some(DuplicateMatch {
            existing: existing.clone(),
            reason: DuplicateReason::Website,
        });
    }

    name.and_then(|name| find_existing_by_name(records, name))
        .map(|existing| DuplicateMatch {
            existing: existing.clone(),
            reason: DuplicateReason::Name,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(id: i64, name: &str, website: Option<&str>) -> Company {
        Company {
            id,
            company_name: name.to_string(),
            street_address: None,
            city: None,
            state: None,
            postal_code: None,
            email_address: None,
            phone_number: None,
            website_url: website.map(str::to_string),
            note_text: None,
            ai_description: None,
            last_updated_by: None,
            added_at: 0,
            last_updated_at: 0,
        }
    }

    #[test]
    fn test_website_match_takes_priority() {
        let records = vec![
            company(1, "Acme", Some("https://www.acme.com")),
            company(2, "Beta", Some("beta.com")),
        ];

        let found = detect_duplicate(&records, Some("Acme"), Some("BETA.com/")).unwrap();
        assert_eq!(found.existing.id, 2);
        assert_eq!(found.reason, DuplicateReason::Website);
    }

    #[test]
    fn test_name_match_is_case_insensitive() {
        let records = vec![company(1, "Acme Supply", None)];

        let found = detect_duplicate(&records, Some("  ACME supply "), Some("other.com")).unwrap();
        assert_eq!(found.existing.id, 1);
        assert_eq!(found.reason, DuplicateReason::Name);
    }

    #[test]
    fn test_first_record_in_list_order_wins() {
        let records = vec![
            company(5, "Acme", Some("acme.com")),
            company(3, "Acme Two", Some("http://acme.com/")),
        ];
        let found = find_existing_by_website(&records, "www.acme.com").unwrap();
        assert_eq!(found.id, 5);
    }

    #[test]
    fn test_empty_canonical_never_matches() {
        let records = vec![company(1, "", Some("not a url")), company(2, "", None)];

        assert!(find_existing_by_website(&records, "not a url").is_none());
        assert!(find_existing_by_website(&records, "").is_none());
        assert!(find_existing_by_name(&records, "  ").is_none());
        assert!(detect_duplicate(&records, Some(""), Some("")).is_none());
    }

    #[test]
    fn test_no_match() {
        let records = vec![company(1, "Acme", Some("acme.com"))];
        assert!(detect_duplicate(&records, Some("Beta"), Some("beta.com")).is_none());
        assert!(detect_duplicate(&records, None, None).is_none());
    }
}
