//! Timeline crawling for the tweet sampler: page each outlet's timeline,
//! keep original statuses with usable article links, emit CSV rows.

use anyhow::Result;
use tracing::warn;

use reprint_common::{clean_link, TweetRow};
use twitter_client::{TimelineRequest, Tweet, TwitterClient};

/// Statuses per timeline page.
pub const TIMELINE_PAGE_SIZE: u32 = 200;

/// The timeline endpoint serves at most this many statuses per user.
pub const TIMELINE_QUOTA: u32 = 3200;

/// Turn a page of statuses into CSV rows: original tweets only, one row
/// per cleaned article link. Statuses with an unparsable timestamp are
/// skipped with a warning.
pub fn tweet_rows(tweets: &[Tweet]) -> Vec<TweetRow> {
    let mut rows = Vec::new();
    for tweet in tweets {
        if !tweet.is_original() {
            continue;
        }
        let created = match tweet.created_at_time() {
            Ok(t) => t,
            Err(err) => {
                warn!(
                    tweet_id = tweet.id_str.as_str(),
                    error = %err,
                    "unparsable created_at, skipping status"
                );
                continue;
            }
        };
        for entity in &tweet.entities.urls {
            let Some(link) = clean_link(&entity.expanded_url) else {
                continue;
            };
            rows.push(TweetRow {
                order: created.timestamp(),
                created_at: tweet.created_at.clone(),
                screen_name: tweet.user.screen_name.clone(),
                tweet_id: tweet.id_str.clone(),
                url: link,
            });
        }
    }
    rows
}

/// Page one outlet's timeline back through the serving quota, newest
/// first, resuming below the last status of each page.
pub async fn crawl_feed(
    client: &TwitterClient,
    screen_name: &str,
    since_id: Option<u64>,
) -> Result<Vec<TweetRow>> {
    let mut rows = Vec::new();
    let mut max_id: Option<u64> = None;
    let mut fetched: u32 = 0;

    while fetched < TIMELINE_QUOTA {
        let req = TimelineRequest {
            screen_name: screen_name.to_string(),
            count: TIMELINE_PAGE_SIZE,
            max_id,
            since_id,
        };
        let tweets = client.user_timeline(&req).await?;
        if tweets.is_empty() {
            break;
        }
        fetched += tweets.len() as u32;
        max_id = tweets.last().map(|t| t.id.saturating_sub(1));
        rows.extend(tweet_rows(&tweets));
    }

    Ok(rows)
}
