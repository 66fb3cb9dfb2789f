use thiserror::Error;

/// Errors surfaced by the crawler before or around a crawl.
///
/// Failures while fetching a single page never show up here; the page parser
/// degrades them to an empty result instead.
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Failed to build worker pool: {0}")]
    Pool(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CrawlError>;
