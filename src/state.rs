//! Shared state for a single crawl. Both structures are sharded by key hash,
//! so contention is limited to tasks touching the same URL or word.

use dashmap::{DashMap, DashSet};
use std::collections::HashMap;

/// URLs already claimed by some task.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims `url`. Returns `true` for exactly one caller per URL.
    pub fn claim(&self, url: &str) -> bool {
        if self.urls.contains(url) {
            return false;
        }
        self.urls.insert(url.to_string())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Cumulative word counts across every processed page.
#[derive(Debug, Default)]
pub struct WordTally {
    counts: DashMap<String, u64>,
}

impl WordTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, word: &str, count: u64) {
        if let Some(mut entry) = self.counts.get_mut(word) {
            *entry += count;
            return;
        }
        *self.counts.entry(word.to_string()).or_insert(0) += count;
    }

    pub fn merge(&self, page_counts: &HashMap<String, u64>) {
        for (word, count) in page_counts {
            self.add(word, *count);
        }
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.counts.get(word).map(|entry| *entry)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Copies the current counts out. Only meaningful once every task has joined.
    pub fn snapshot(&self) -> HashMap<String, u64> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_claim_succeeds_once() {
        let visited = VisitedSet::new();
        assert!(visited.is_empty());
        assert!(visited.claim("http://a"));
        assert!(visited.contains("http://a"));
        assert!(!visited.contains("http://A"));
        assert!(!visited.claim("http://a"));
        assert!(visited.claim("http://A"));
        assert_eq!(visited.len(), 2);
    }

    #[test]
    fn test_concurrent_claims_have_one_winner() {
        let visited = Arc::new(VisitedSet::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let visited = Arc::clone(&visited);
                thread::spawn(move || visited.claim("http://shared"))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(visited.len(), 1);
    }

    #[test]
    fn test_concurrent_adds_are_not_lost() {
        let tally = Arc::new(WordTally::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tally = Arc::clone(&tally);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        tally.add("word", 1);
                        tally.add("other", 2);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tally.get("word"), Some(8000));
        assert_eq!(tally.get("other"), Some(16000));
    }

    #[test]
    fn test_merge_creates_and_accumulates() {
        let tally = WordTally::new();
        assert!(tally.is_empty());
        let page: HashMap<String, u64> = [("x".to_string(), 2), ("y".to_string(), 1)].into();
        tally.merge(&page);
        tally.merge(&page);

        let snapshot = tally.snapshot();
        assert_eq!(snapshot.get("x"), Some(&4));
        assert_eq!(snapshot.get("y"), Some(&2));
        assert_eq!(tally.get("z"), None);
        assert!(!tally.is_empty());
        assert_eq!(tally.len(), 2);
    }
}
