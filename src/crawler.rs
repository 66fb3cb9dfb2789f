use crate::clock::{Clock, SystemClock};
use crate::config::{compile_patterns, CrawlerConfig};
use crate::error::{CrawlError, Result};
use crate::parser::PageParser;
use crate::ranker;
use crate::result::{CrawlResult, RankedWords};
use crate::state::{VisitedSet, WordTally};
use crate::task::{crawl_task, CrawlContext};
use futures::future::join_all;
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

/// Something that can crawl a list of starting pages.
pub trait WebCrawler {
    fn crawl(&self, starting_urls: &[String]) -> CrawlResult;

    /// The largest worker count this crawler could use on this machine.
    fn max_parallelism(&self) -> usize;
}

/// Crawls starting pages with a fork-join task tree on a bounded worker pool.
///
/// The pool is built once per crawler; visited URLs and word counts are
/// created fresh for every call to [`WebCrawler::crawl`].
///
/// A `ParallelCrawler` owns its own tokio runtime. Build it, call `crawl` and
/// drop it from synchronous code only: blocking on or dropping the runtime
/// from inside another async runtime panics.
pub struct ParallelCrawler {
    runtime: Runtime,
    parser: Arc<dyn PageParser>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    max_depth: usize,
    popular_word_count: usize,
    ignored_urls: Arc<[Regex]>,
    worker_count: usize,
}

impl ParallelCrawler {
    pub fn new(config: &CrawlerConfig, parser: Arc<dyn PageParser>) -> Result<Self> {
        config.validate()?;

        let ignored_urls: Arc<[Regex]> = compile_patterns(&config.ignored_urls)?.into();
        let worker_count = config.parallelism.min(num_cpus::get());

        let runtime = Builder::new_multi_thread()
            .worker_threads(worker_count)
            .max_blocking_threads(worker_count)
            .thread_name("crawl-worker")
            .enable_all()
            .build()
            .map_err(CrawlError::Pool)?;

        log::info!(
            "Crawler ready: {} workers, depth {}, timeout {}s",
            worker_count,
            config.max_depth,
            config.timeout_seconds
        );

        Ok(Self {
            runtime,
            parser,
            clock: Arc::new(SystemClock),
            timeout: config.timeout(),
            max_depth: config.max_depth,
            popular_word_count: config.popular_word_count,
            ignored_urls,
            worker_count,
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of workers actually in the pool.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }
}

impl WebCrawler for ParallelCrawler {
    fn crawl(&self, starting_urls: &[String]) -> CrawlResult {
        let start = std::time::Instant::now();
        let deadline = self.clock.now().checked_add(self.timeout);
        if deadline.is_none() {
            log::warn!("Timeout of {:?} is out of range, crawling without a deadline", self.timeout);
        }

        let ctx = Arc::new(CrawlContext {
            parser: Arc::clone(&self.parser),
            clock: Arc::clone(&self.clock),
            deadline,
            ignored_urls: Arc::clone(&self.ignored_urls),
            visited: VisitedSet::new(),
            tally: WordTally::new(),
        });

        log::info!("Starting crawl from {} page(s)", starting_urls.len());

        self.runtime.block_on(async {
            let roots: Vec<_> = starting_urls
                .iter()
                .map(|url| tokio::spawn(crawl_task(Arc::clone(&ctx), url.clone(), self.max_depth)))
                .collect();

            for joined in join_all(roots).await {
                if let Err(e) = joined {
                    log::error!("Root crawl task failed: {}", e);
                }
            }
        });

        let urls_visited = ctx.visited.len();
        let word_counts = ranker::top_n(&ctx.tally.snapshot(), self.popular_word_count);

        log::info!(
            "Crawl completed in {:?}: {} pages visited, {} distinct words",
            start.elapsed(),
            urls_visited,
            ctx.tally.len()
        );

        CrawlResult::new(urls_visited, RankedWords::new(word_counts))
    }

    fn max_parallelism(&self) -> usize {
        num_cpus::get()
    }
}
