//! Client for the feeds API: the list of monitored outlets and their
//! scrape meta-classes.

use anyhow::{bail, Result};

use reprint_common::{Feed, Feeds};

pub struct FeedsClient {
    client: reqwest::Client,
    base_url: String,
}

impl FeedsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the active feeds for a language.
    pub async fn active_feeds(&self, lang: &str) -> Result<Vec<Feed>> {
        let url = format!(
            "{}/api/v1/feeds/?status=active&lang={}",
            self.base_url, lang
        );
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            bail!("feeds API returned status {status}");
        }

        let feeds: Feeds = resp.json().await?;
        Ok(feeds.data)
    }
}

/// Find the feed whose screen name matches, case-insensitively.
pub fn pick_feed<'a>(screen_name: &str, feeds: &'a [Feed]) -> Option<&'a Feed> {
    let wanted = screen_name.to_lowercase();
    feeds
        .iter()
        .find(|f| f.screen_name.to_lowercase() == wanted)
}
