use thiserror::Error;

/// Why a scrape produced no data. `Blocked` means the site's robots.txt
/// forbids the request; everything else is `Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScrapeError {
    #[error("{0}")]
    Blocked(String),
    #[error("{0}")]
    Failed(String),
}

impl ScrapeError {
    pub fn message(&self) -> &str {
        match self {
            ScrapeError::Blocked(message) | ScrapeError::Failed(message) => message,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, ScrapeError::Blocked(_))
    }
}

/// Sorts a raw failure message: anything mentioning `robots.txt` or
/// `disallow` is a block.
pub fn classify_scrape_failure(message: impl Into<String>) -> ScrapeError {
    let message = message.into();
    let lowered = message.to_lowercase();
    if lowered.contains("robots.txt") || lowered.contains("disallow") {
        ScrapeError::Blocked(message)
    } else {
        ScrapeError::Failed(message)
    }
}

#[derive(Debug, Error)]
pub enum DirectoryLayoutError {
    #[error("Unknown or unsupported directory layout")]
    Unsupported,
    #[error("Invalid directory URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid selector '{selector}': {reason}")]
    Selector { selector: String, reason: String },
}
