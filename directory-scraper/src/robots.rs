//! robots.txt policy for the website scraper.
//!
//! Only `User-agent: *` groups are honored. `Disallow: /` blocks the whole
//! site; any other rule blocks the exact path and everything below it.

/// Checks `request_path` against a robots.txt body. `Err` carries the
/// message shown to the user.
pub fn check_robots(robots_txt: &str, request_path: &str) -> Result<(), String> {
    let request_path = request_path.to_lowercase();
    let request_trimmed = request_path.strip_suffix('/').unwrap_or(&request_path);
    let mut universal_agent = false;

    for raw_line in robots_txt.lines() {
        let line = raw_line.trim().to_lowercase();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(agent) = line.strip_prefix("user-agent:") {
            universal_agent = agent.trim() == "*";
            continue;
        }

        if !universal_agent {
            continue;
        }

        let Some(disallowed) = line.strip_prefix("disallow:").map(str::trim) else {
            continue;
        };
        if disallowed.is_empty() {
            continue;
        }
        if disallowed == "/" {
            return Err("This website disallows scraping in robots.txt.".to_string());
        }

        let disallowed_trimmed = disallowed.strip_suffix('/').unwrap_or(disallowed);
        if request_trimmed == disallowed_trimmed
            || request_path.starts_with(disallowed)
            || request_path.starts_with(&format!("{disallowed_trimmed}/"))
        {
            return Err(format!(
                "This website disallows scraping the path \"{request_path}\" in robots.txt."
            ));
        }
    }

    Ok(())
}

/// `scheme://host[:port]/robots.txt` for a page URL.
pub fn robots_url(page: &url::Url) -> Option<String> {
    let host = page.host_str()?;
    match page.port() {
        Some(port) => Some(format!("{}://{}:{}/robots.txt", page.scheme(), host, port)),
        None => Some(format!("{}://{}/robots.txt", page.scheme(), host)),
    }
}
