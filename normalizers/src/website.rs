use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref HTTP_SCHEME_RE: Regex = Regex::new(r"(?i)^https?://").unwrap();
    static ref WEBSITE_RE: Regex =
        Regex::new(r"(?i)^(https?://)?([\w-]+\.)+([a-z]{2,})([/?#]\S*)?$").unwrap();
}

/// Display form of a website: `https`, exactly one `www.` host prefix, path
/// case preserved. `None` for blank or unparsable input.
pub fn normalize_website(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    let with_scheme = if HTTP_SCHEME_RE.is_match(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let mut url = Url::parse(&with_scheme).ok()?;
    if url.scheme() != "https" {
        url.set_scheme("https").ok()?;
    }

    let host = url.host_str()?.to_ascii_lowercase();
    let mut bare = host.as_str();
    while let Some(rest) = bare.strip_prefix("www.") {
        bare = rest;
    }
    if bare.is_empty() {
        return None;
    }

    url.set_host(Some(&format!("www.{bare}"))).ok()?;
    Some(url.to_string())
}

/// Comparison form of a website: the display form without fragment or
/// trailing slashes, lowercased. Empty when the input has no canonical form;
/// an empty value never matches another record.
pub fn canonicalize_url(value: &str) -> String {
    let Some(normalized) = normalize_website(value) else {
        return String::new();
    };

    let href = match Url::parse(&normalized) {
        Ok(mut url) => {
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => normalized,
    };

    href.trim_end_matches('/').to_lowercase()
}

/// Permissive check used by form validation: looks like a domain and
/// normalizes cleanly.
pub fn is_valid_website(value: &str) -> bool {
    let trimmed = value.trim();
    WEBSITE_RE.is_match(trimmed) && normalize_website(trimmed).is_some()
}
