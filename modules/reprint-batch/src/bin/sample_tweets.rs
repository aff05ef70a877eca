//! Tweet sampler: crawl outlet timelines into a CSV, or replay a CSV
//! into the scrape service.

use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use reprint_batch::csvio;
use reprint_batch::feeds::{pick_feed, FeedsClient};
use reprint_batch::scrape::{ScrapeClient, ScrapeRequest};
use reprint_batch::tweets::crawl_feed;
use reprint_common::Config;
use twitter_client::TwitterClient;

/// Pause between scrape submissions so the service is not flooded.
const SUBMIT_PACING: Duration = Duration::from_millis(600);

const FEEDS_LANG: &str = "EL";

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl every active feed's timeline into a dated CSV.
    Crawl {
        /// Only statuses newer than this id.
        #[arg(long)]
        since: Option<u64>,
    },
    /// Submit each CSV row to the scrape service.
    Save {
        #[arg(long)]
        file: PathBuf,
    },
    /// Print a CSV's rows.
    Read {
        #[arg(long)]
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::Crawl { since } => crawl(&config, since).await,
        Command::Save { file } => save(&config, &file).await,
        Command::Read { file } => read(&file),
    }
}

async fn crawl(config: &Config, since: Option<u64>) -> Result<()> {
    let feeds = FeedsClient::new(&config.feeds_api)
        .active_feeds(FEEDS_LANG)
        .await?;
    let twitter = TwitterClient::new(&config.twitter_bearer_token);

    let out = format!("data-{}.csv", chrono::Utc::now().format("%Y-%m-%d"));
    let mut rows = Vec::new();

    info!(feeds = feeds.len(), out = out.as_str(), "crawling timelines");
    for feed in &feeds {
        let feed_rows = crawl_feed(&twitter, &feed.screen_name, since).await?;
        info!(
            screen_name = feed.screen_name.as_str(),
            rows = feed_rows.len(),
            "timeline crawled"
        );
        rows.extend(feed_rows);
    }

    csvio::write_rows(File::create(&out)?, &rows)?;
    info!(rows = rows.len(), out = out.as_str(), "sample written");
    Ok(())
}

async fn save(config: &Config, file: &PathBuf) -> Result<()> {
    let feeds = FeedsClient::new(&config.feeds_api)
        .active_feeds(FEEDS_LANG)
        .await?;
    let scrape = ScrapeClient::new(&config.scrape_api);

    let rows = csvio::read_rows(File::open(file)?)?;
    info!(rows = rows.len(), "submitting scrape requests");

    for (i, row) in rows.iter().enumerate() {
        let Some(feed) = pick_feed(&row.screen_name, &feeds) else {
            warn!(
                screen_name = row.screen_name.as_str(),
                "no active feed for outlet, skipping row"
            );
            continue;
        };

        let tweet_id: i64 = match row.tweet_id.parse() {
            Ok(id) => id,
            Err(_) => {
                warn!(tweet_id = row.tweet_id.as_str(), "bad tweet id, skipping row");
                continue;
            }
        };

        let req = ScrapeRequest::for_feed(feed, &row.url, tweet_id, &row.created_at);
        if let Err(err) = scrape.submit(&req).await {
            warn!(
                url = row.url.as_str(),
                error = format!("{err:#}"),
                "scrape submission failed"
            );
        } else {
            info!(i, screen_name = feed.screen_name.as_str(), "scrape submitted");
        }

        tokio::time::sleep(SUBMIT_PACING).await;
    }

    Ok(())
}

fn read(file: &PathBuf) -> Result<()> {
    for row in csvio::read_rows(File::open(file)?)? {
        println!(
            "{},{},{},{},{}",
            row.order, row.created_at, row.screen_name, row.tweet_id, row.url
        );
    }
    Ok(())
}
