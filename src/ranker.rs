use std::cmp::Ordering;
use std::collections::HashMap;

/// Selects the `n` most popular words.
///
/// Ordered by count descending, then word length descending, then the word
/// itself ascending, so identical tallies always rank identically.
pub fn top_n(tally: &HashMap<String, u64>, n: usize) -> Vec<(String, u64)> {
    let mut entries: Vec<(&String, &u64)> = tally.iter().collect();
    entries.sort_by(|a, b| compare(a, b));

    entries
        .into_iter()
        .take(n)
        .map(|(word, count)| (word.clone(), *count))
        .collect()
}

fn compare(a: &(&String, &u64), b: &(&String, &u64)) -> Ordering {
    b.1.cmp(a.1)
        .then_with(|| b.0.len().cmp(&a.0.len()))
        .then_with(|| a.0.cmp(b.0))
}
