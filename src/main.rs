use clap::{Parser, Subcommand};
use env_logger::Env;
use std::sync::Arc;
use std::time::Instant;
use webcrawler::{
    CrawlResultWriter, CrawlerConfig, HttpPageParser, ParallelCrawler, PageParser, Profiler,
    WebCrawler,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the start pages listed in a JSON configuration file
    Crawl {
        #[arg(short, long)]
        config: String,

        /// Dry run: validate config only, don't crawl
        #[arg(short, long, default_value_t = false)]
        dry_run: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let env = Env::default()
        .filter_or("RUST_LOG", "info")
        .write_style_or("RUST_LOG_STYLE", "always");

    env_logger::init_from_env(env);

    match cli.command {
        Commands::Crawl { config, dry_run } => {
            println!("Loading configuration from: {}", config);
            let start = Instant::now();

            let crawler_config = CrawlerConfig::load(&config)
                .map_err(|e| format!("Failed to load config file '{}': {}", config, e))?;

            println!("Crawl configuration:");
            println!("  Start pages: {:?}", crawler_config.start_pages);
            println!("  Max depth: {}", crawler_config.max_depth);
            println!("  Timeout: {}s", crawler_config.timeout_seconds);
            println!("  Parallelism: {}", crawler_config.parallelism);
            println!("  Popular words: {}", crawler_config.popular_word_count);

            if dry_run {
                println!("Dry run completed - configuration is valid");
                return Ok(());
            }

            let profiler = Profiler::new();
            let parser: Arc<dyn PageParser> =
                Arc::new(profiler.wrap(HttpPageParser::new(&crawler_config)?));
            let crawler = profiler.wrap(ParallelCrawler::new(&crawler_config, parser)?);

            log::info!(
                "Starting crawler with up to {} workers...",
                crawler.max_parallelism().min(crawler_config.parallelism)
            );
            let result = crawler.crawl(&crawler_config.start_pages);

            let writer = CrawlResultWriter::new(&result);
            match &crawler_config.result_path {
                Some(path) => writer.write_to_path(path)?,
                None => writer.write_to(&mut std::io::stdout().lock())?,
            }

            match &crawler_config.profile_output_path {
                Some(path) => profiler.write_data(path)?,
                None => profiler.write_report(&mut std::io::stdout().lock())?,
            }

            log::info!("Crawl completed successfully in {:?}", start.elapsed());
            Ok(())
        }
    }
}
