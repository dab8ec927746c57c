use lazy_static::lazy_static;
use regex::Regex;

pub const DEFAULT_MAX_PAGE_CHARS: usize = 15_000;

lazy_static! {
    static ref SCRIPT_RE: Regex = Regex::new(r"(?is)<script\b.*?</script\s*>").unwrap();
    static ref STYLE_RE: Regex = Regex::new(r"(?is)<style\b.*?</style\s*>").unwrap();
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Readable text of an HTML page, capped at `max_chars` characters with a
/// trailing `...` when cut.
pub fn extract_page_text(html: &str, max_chars: usize) -> String {
    let text = SCRIPT_RE.replace_all(html, "");
    let text = STYLE_RE.replace_all(&text, "");
    let text = TAG_RE.replace_all(&text, " ");

    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let text = WHITESPACE_RE.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() > max_chars {
        let mut capped: String = text.chars().take(max_chars).collect();
        capped.push_str("...");
        capped
    } else {
        text.to_string()
    }
}
