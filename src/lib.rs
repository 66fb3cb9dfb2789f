//! Bounded, parallel web crawl that tallies word frequencies.
//!
//! [`ParallelCrawler`] starts one task per starting page. Each task visits its
//! page at most once per crawl, merges the page's words into a shared tally and
//! recursively crawls the page's links until the depth budget or deadline runs
//! out. The result holds the number of distinct pages visited and the most
//! popular words.

pub mod clock;
pub mod config;
pub mod crawler;
pub mod error;
pub mod parser;
pub mod profiler;
pub mod ranker;
pub mod result;
pub mod state;
mod task;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CrawlerConfig;
pub use crawler::{ParallelCrawler, WebCrawler};
pub use error::{CrawlError, Result};
pub use parser::{HttpPageParser, PageParseResult, PageParser};
pub use profiler::{Profiled, Profiler};
pub use result::{CrawlResult, CrawlResultWriter, RankedWords};
