use crate::error::{CrawlError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerConfig {
    #[serde(default)]
    pub start_pages: Vec<String>,

    #[serde(default)]
    pub ignored_urls: Vec<String>,

    #[serde(default)]
    pub ignored_words: Vec<String>,

    /// Requested worker count, capped at the hardware parallelism by the engine
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,

    #[serde(default)]
    pub max_depth: usize,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub popular_word_count: usize,

    #[serde(default)]
    pub profile_output_path: Option<String>,

    #[serde(default)]
    pub result_path: Option<String>,
}

fn default_parallelism() -> usize {
    num_cpus::get()
}

fn default_timeout_seconds() -> u64 {
    1
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            start_pages: Vec::new(),
            ignored_urls: Vec::new(),
            ignored_words: Vec::new(),
            parallelism: default_parallelism(),
            max_depth: 0,
            timeout_seconds: default_timeout_seconds(),
            popular_word_count: 0,
            profile_output_path: None,
            result_path: None,
        }
    }
}

impl CrawlerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let config: CrawlerConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values no crawl could run with. Called again by the engine so a
    /// hand-built config gets the same checks as a loaded one.
    pub fn validate(&self) -> Result<()> {
        if self.parallelism == 0 {
            return Err(CrawlError::Config(
                "parallelism must be at least 1".to_string(),
            ));
        }

        if let Some(index) = self.start_pages.iter().position(|page| page.is_empty()) {
            return Err(CrawlError::Config(format!(
                "start page at index {} is empty",
                index
            )));
        }

        compile_patterns(&self.ignored_urls)?;
        compile_patterns(&self.ignored_words)?;

        Ok(())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds)
    }
}

/// Compiles patterns so that they only match a whole input, never a substring.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| Regex::new(&format!("^(?:{})$", pattern)).map_err(CrawlError::from))
        .collect()
}

pub fn matches_any(patterns: &[Regex], input: &str) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(input))
}
