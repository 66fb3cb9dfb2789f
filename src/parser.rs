use crate::config::{compile_patterns, matches_any, CrawlerConfig};
use crate::error::{CrawlError, Result};
use regex::Regex;
use reqwest::blocking::Client;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Words and outbound links found on one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageParseResult {
    pub word_counts: HashMap<String, u64>,
    pub links: Vec<String>,
}

/// Turns a URL into its words and links.
///
/// Implementations are called concurrently from many tasks and may block.
/// A page that cannot be fetched or parsed yields `PageParseResult::default()`
/// rather than an error.
pub trait PageParser: Send + Sync {
    fn parse(&self, url: &str) -> PageParseResult;
}

impl<P: PageParser + ?Sized> PageParser for std::sync::Arc<P> {
    fn parse(&self, url: &str) -> PageParseResult {
        (**self).parse(url)
    }
}

pub struct HttpPageParser {
    client: Client,
    ignored_words: Vec<Regex>,
}

impl HttpPageParser {
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent("webcrawler")
            .build()?;

        Ok(Self {
            client,
            ignored_words: compile_patterns(&config.ignored_words)?,
        })
    }

    fn fetch(&self, url: &Url) -> Result<String> {
        match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| CrawlError::Fetch(format!("not a local path: {}", url)))?;
                Ok(std::fs::read_to_string(path)?)
            }
            "http" | "https" => {
                let response = self.client.get(url.clone()).send()?;
                if !response.status().is_success() {
                    return Err(CrawlError::Fetch(format!("HTTP {}", response.status())));
                }
                Ok(response.text()?)
            }
            other => Err(CrawlError::Fetch(format!("unsupported scheme: {}", other))),
        }
    }
}

impl PageParser for HttpPageParser {
    fn parse(&self, url: &str) -> PageParseResult {
        let base = match Url::parse(url) {
            Ok(base) => base,
            Err(e) => {
                log::debug!("Skipping unparseable URL {}: {}", url, e);
                return PageParseResult::default();
            }
        };

        match self.fetch(&base) {
            Ok(html) => parse_html(&html, &base, &self.ignored_words),
            Err(e) => {
                log::warn!("Failed to fetch {}: {}", url, e);
                PageParseResult::default()
            }
        }
    }
}

/// Extracts lowercased word counts from the page body and absolute links from
/// `a[href]` elements. Words fully matching one of `ignored_words` are dropped.
pub fn parse_html(html: &str, base: &Url, ignored_words: &[Regex]) -> PageParseResult {
    let document = Html::parse_document(html);
    let mut result = PageParseResult::default();

    let root = match Selector::parse("body") {
        Ok(body_selector) => document
            .select(&body_selector)
            .next()
            .unwrap_or_else(|| document.root_element()),
        Err(_) => document.root_element(),
    };

    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        // Script and style bodies are not page text.
        let skipped = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .is_some_and(|el| matches!(el.name(), "script" | "style" | "noscript"));
        if skipped {
            continue;
        }

        let text: &str = text;
        for word in tokenize(text) {
            if matches_any(ignored_words, &word) {
                continue;
            }
            *result.word_counts.entry(word).or_insert(0) += 1;
        }
    }

    if let Ok(link_selector) = Selector::parse("a[href]") {
        for link in document.select(&link_selector) {
            if let Some(href) = link.value().attr("href") {
                if let Some(resolved) = resolve_link(base, href) {
                    result.links.push(resolved);
                }
            }
        }
    }

    result
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|token| {
            token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|token| !token.is_empty())
}

fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let mut resolved = base.join(href.trim()).ok()?;
    resolved.set_fragment(None);

    match resolved.scheme() {
        "http" | "https" | "file" => Some(resolved.into()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/docs/index.html").unwrap()
    }

    #[test]
    fn test_counts_body_words() {
        let html = r#"<html><head><title>Ignored Title</title></head>
            <body><p>The quick fox.</p><p>THE lazy, lazy dog!</p></body></html>"#;

        let result = parse_html(html, &base(), &[]);
        assert_eq!(result.word_counts.get("the"), Some(&2));
        assert_eq!(result.word_counts.get("lazy"), Some(&2));
        assert_eq!(result.word_counts.get("fox"), Some(&1));
        assert_eq!(result.word_counts.get("title"), None);
    }

    #[test]
    fn test_skips_script_text() {
        let html = "<body><script>var hidden = 1;</script><p>shown</p></body>";
        let result = parse_html(html, &base(), &[]);
        assert_eq!(result.word_counts.get("shown"), Some(&1));
        assert_eq!(result.word_counts.get("hidden"), None);
    }

    #[test]
    fn test_drops_ignored_words() {
        let patterns = compile_patterns(&["^.{1,3}$".to_string()]).unwrap();
        let html = "<body><p>the cat sat upon mats</p></body>";
        let result = parse_html(html, &base(), &patterns);
        assert_eq!(result.word_counts.len(), 2);
        assert_eq!(result.word_counts.get("upon"), Some(&1));
        assert_eq!(result.word_counts.get("mats"), Some(&1));
    }

    #[test]
    fn test_resolves_links() {
        let html = r##"<body>
            <a href="guide.html#intro">guide</a>
            <a href="/about">about</a>
            <a href="https://other.org/">other</a>
            <a href="mailto:someone@example.com">mail</a>
            <a href="#top">top</a>
        </body>"##;

        let result = parse_html(html, &base(), &[]);
        assert_eq!(
            result.links,
            vec![
                "https://example.com/docs/guide.html".to_string(),
                "https://example.com/about".to_string(),
                "https://other.org/".to_string(),
                "https://example.com/docs/index.html".to_string(),
            ]
        );
    }

    #[test]
    fn test_reads_file_urls() {
        let dir = tempfile::tempdir().unwrap();
        let page = dir.path().join("page.html");
        std::fs::write(&page, "<body><p>local words</p><a href=\"next.html\">n</a></body>").unwrap();

        let parser = HttpPageParser::new(&CrawlerConfig::default()).unwrap();
        let url = Url::from_file_path(&page).unwrap();
        let result = parser.parse(url.as_str());

        assert_eq!(result.word_counts.get("local"), Some(&1));
        assert_eq!(result.links.len(), 1);
        assert!(result.links[0].ends_with("/next.html"));
    }

    #[test]
    fn test_failures_degrade_to_empty() {
        let parser = HttpPageParser::new(&CrawlerConfig::default()).unwrap();
        assert_eq!(parser.parse("not a url"), PageParseResult::default());
        assert_eq!(parser.parse("ftp://example.com/x"), PageParseResult::default());
        assert_eq!(
            parser.parse("file:///definitely/missing/page.html"),
            PageParseResult::default()
        );
    }
}
