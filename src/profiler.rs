use crate::crawler::WebCrawler;
use crate::error::Result;
use crate::parser::{PageParseResult, PageParser};
use crate::result::CrawlResult;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Total time spent per profiled method, keyed by `Type#method`.
#[derive(Debug, Default)]
struct ProfilingState {
    totals: DashMap<String, Duration>,
}

impl ProfilingState {
    fn record(&self, key: String, elapsed: Duration) {
        metrics::histogram!("profiler_call_seconds", "method" => key.clone())
            .record(elapsed.as_secs_f64());
        *self.totals.entry(key).or_insert(Duration::ZERO) += elapsed;
    }

    fn sorted(&self) -> Vec<(String, Duration)> {
        let mut totals: Vec<_> = self
            .totals
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        totals.sort_by(|a, b| a.0.cmp(&b.0));
        totals
    }
}

/// Hands out [`Profiled`] wrappers that all report into one shared state.
pub struct Profiler {
    state: Arc<ProfilingState>,
    started_at: DateTime<Utc>,
}

impl Profiler {
    pub fn new() -> Self {
        Self {
            state: Arc::new(ProfilingState::default()),
            started_at: Utc::now(),
        }
    }

    pub fn wrap<T>(&self, inner: T) -> Profiled<T> {
        Profiled {
            inner,
            component: short_type_name::<T>(),
            state: Arc::clone(&self.state),
        }
    }

    pub fn elapsed(&self, key: &str) -> Option<Duration> {
        self.state.totals.get(key).map(|total| *total)
    }

    /// Appends the report to `path`, creating the file if needed.
    pub fn write_data(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        self.write_report(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_report<W: Write>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "Run at {}", format_run_at(&self.started_at))?;
        for (key, total) in self.state.sorted() {
            writeln!(writer, "{} took {}", key, format_duration(total))?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Forwards every call to the wrapped value and records how long it took.
pub struct Profiled<T> {
    inner: T,
    component: String,
    state: Arc<ProfilingState>,
}

impl<T> Profiled<T> {
    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn time<R>(&self, method: &str, call: impl FnOnce(&T) -> R) -> R {
        let start = Instant::now();
        let result = call(&self.inner);
        self.state
            .record(format!("{}#{}", self.component, method), start.elapsed());
        result
    }
}

impl<P: PageParser> PageParser for Profiled<P> {
    fn parse(&self, url: &str) -> PageParseResult {
        self.time("parse", |parser| parser.parse(url))
    }
}

impl<C: WebCrawler> WebCrawler for Profiled<C> {
    fn crawl(&self, starting_urls: &[String]) -> CrawlResult {
        self.time("crawl", |crawler| crawler.crawl(starting_urls))
    }

    fn max_parallelism(&self) -> usize {
        self.inner.max_parallelism()
    }
}

fn short_type_name<T>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

/// RFC 1123 date with an unpadded day of month, e.g. `Tue, 5 Mar 2024 09:07:02 GMT`.
fn format_run_at(at: &DateTime<Utc>) -> String {
    at.format("%a, %-d %b %Y %H:%M:%S GMT").to_string()
}

fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    format!(
        "{}m {}s {}ms",
        millis / 60_000,
        (millis / 1000) % 60,
        millis % 1000
    )
}
