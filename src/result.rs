use crate::error::Result;
use serde::{Serialize, Serializer};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Word counts in ranking order. Serialises as a JSON object whose keys keep
/// that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedWords(Vec<(String, u64)>);

impl RankedWords {
    pub fn new(ranked: Vec<(String, u64)>) -> Self {
        Self(ranked)
    }

    pub fn as_slice(&self) -> &[(String, u64)] {
        &self.0
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|(candidate, _)| candidate == word)
            .map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for RankedWords {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(word, count)| (word, count)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlResult {
    word_counts: RankedWords,
    urls_visited: usize,
}

impl CrawlResult {
    pub fn new(urls_visited: usize, word_counts: RankedWords) -> Self {
        Self {
            word_counts,
            urls_visited,
        }
    }

    pub fn urls_visited(&self) -> usize {
        self.urls_visited
    }

    pub fn word_counts(&self) -> &RankedWords {
        &self.word_counts
    }
}

pub struct CrawlResultWriter<'a> {
    result: &'a CrawlResult,
}

impl<'a> CrawlResultWriter<'a> {
    pub fn new(result: &'a CrawlResult) -> Self {
        Self { result }
    }

    /// Appends the result to `path`, creating the file if needed.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self.result)?;
        writeln!(writer)?;
        Ok(())
    }
}
