//! The recursive unit of crawl work.
//!
//! A task checks depth, deadline and ignore rules, claims its URL, fetches the
//! page, merges the words into the shared tally and then spawns one child per
//! link. It only completes once every child has completed.

use crate::clock::Clock;
use crate::config::matches_any;
use crate::parser::{PageParseResult, PageParser};
use crate::state::{VisitedSet, WordTally};
use futures::future::{join_all, BoxFuture, FutureExt};
use regex::Regex;
use std::sync::Arc;
use std::time::Instant;

/// Everything a task shares with its ancestors and siblings for one crawl.
pub(crate) struct CrawlContext {
    pub(crate) parser: Arc<dyn PageParser>,
    pub(crate) clock: Arc<dyn Clock>,
    /// `None` when the timeout is too large to represent, i.e. no deadline.
    pub(crate) deadline: Option<Instant>,
    pub(crate) ignored_urls: Arc<[Regex]>,
    pub(crate) visited: VisitedSet,
    pub(crate) tally: WordTally,
}

impl CrawlContext {
    /// Depth, deadline and ignore checks. None of them touch shared state.
    fn should_skip(&self, url: &str, remaining_depth: usize) -> bool {
        if remaining_depth == 0 {
            return true;
        }
        if self.deadline.is_some_and(|deadline| self.clock.now() > deadline) {
            log::debug!("Deadline passed, not visiting {}", url);
            return true;
        }
        matches_any(&self.ignored_urls, url)
    }

    async fn fetch(&self, url: &str) -> PageParseResult {
        let parser = Arc::clone(&self.parser);
        let target = url.to_string();

        // Runs on the runtime's blocking lane so a slow page never parks a worker.
        match tokio::task::spawn_blocking(move || parser.parse(&target)).await {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Parser failed on {}: {}", url, e);
                PageParseResult::default()
            }
        }
    }
}

pub(crate) fn crawl_task(
    ctx: Arc<CrawlContext>,
    url: String,
    remaining_depth: usize,
) -> BoxFuture<'static, ()> {
    async move {
        if ctx.should_skip(&url, remaining_depth) {
            return;
        }

        if !ctx.visited.claim(&url) {
            return;
        }

        log::debug!("Visiting {} (remaining depth {})", url, remaining_depth);
        metrics::counter!("crawler_pages_visited_total").increment(1);

        let page = ctx.fetch(&url).await;
        ctx.tally.merge(&page.word_counts);

        let children: Vec<_> = page
            .links
            .into_iter()
            .map(|link| tokio::spawn(crawl_task(Arc::clone(&ctx), link, remaining_depth - 1)))
            .collect();

        for joined in join_all(children).await {
            if let Err(e) = joined {
                log::error!("Crawl task below {} failed: {}", url, e);
            }
        }
    }
    .boxed()
}
