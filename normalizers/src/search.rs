use shared_types::Company;

/// Case-insensitive substring search across every text field of a company,
/// including the composed address. A blank query returns every record.
pub fn filter_companies<'a>(records: &'a [Company], query: &str) -> Vec<&'a Company> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|company| matches_query(company, &needle))
        .collect()
}

fn matches_query(company: &Company, needle: &str) -> bool {
    let optional = [
        &company.street_address,
        &company.city,
        &company.state,
        &company.postal_code,
        &company.email_address,
        &company.phone_number,
        &company.website_url,
        &company.note_text,
        &company.ai_description,
    ];

    std::iter::once(company.company_name.as_str())
        .chain(optional.into_iter().filter_map(|value| value.as_deref()))
        .map(str::to_lowercase)
        .chain(std::iter::once(company.address().to_lowercase()))
        .any(|text| text.contains(needle))
}
