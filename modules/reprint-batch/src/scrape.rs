//! Client for the scrape service: submit one article-scrape request per
//! crawled tweet+link pair.

use anyhow::{bail, Result};
use serde::Serialize;

use reprint_common::{Feed, FeedMetaClasses};

/// One scrape submission. The `feed` object carries the outlet's CSS
/// meta-classes so the scraper knows where title, body etc. live.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub feed: serde_json::Value,
    pub url: String,
    pub tweet_id: i64,
    pub lang: String,
    pub screen_name: String,
    pub crawled_at: String,
}

impl ScrapeRequest {
    pub fn for_feed(feed: &Feed, url: &str, tweet_id: i64, crawled_at: &str) -> Self {
        Self {
            feed: feed_meta(&feed.meta_classes),
            url: url.to_string(),
            tweet_id,
            lang: feed.lang.clone(),
            screen_name: feed.screen_name.clone(),
            crawled_at: crawled_at.to_string(),
        }
    }
}

/// Meta-class selectors as the scrape service expects them. The `api`
/// field only travels for JS feeds, where scraping goes through the
/// outlet's JSON endpoint instead of the page markup.
fn feed_meta(meta: &FeedMetaClasses) -> serde_json::Value {
    let mut m = serde_json::json!({
        "title": meta.title,
        "excerpt": meta.excerpt,
        "body": meta.body,
        "authors": meta.authors,
        "sources": meta.sources,
        "tags": meta.tags,
        "categories": meta.categories,
        "publishedAt": meta.published_at,
        "editedAt": meta.edited_at,
    });
    if meta.feed_type == "js" {
        m["api"] = serde_json::Value::String(meta.api.clone());
    }
    m
}

pub struct ScrapeClient {
    client: reqwest::Client,
    base_url: String,
}

impl ScrapeClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn submit(&self, req: &ScrapeRequest) -> Result<()> {
        let url = format!("{}/api/v1/scrape", self.base_url);
        let resp = self.client.post(&url).json(req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            bail!("scrape service returned status {status}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_meta_omits_api_for_markup_feeds() {
        let meta = FeedMetaClasses {
            title: ".headline".to_string(),
            api: "https://example.com/api".to_string(),
            ..Default::default()
        };
        let m = feed_meta(&meta);
        assert_eq!(m["title"], ".headline");
        assert!(m.get("api").is_none());
    }

    #[test]
    fn feed_meta_includes_api_for_js_feeds() {
        let meta = FeedMetaClasses {
            feed_type: "js".to_string(),
            api: "https://example.com/api".to_string(),
            ..Default::default()
        };
        let m = feed_meta(&meta);
        assert_eq!(m["api"], "https://example.com/api");
    }

    #[test]
    fn request_serializes_camel_case() {
        let feed = Feed {
            screen_name: "in_gr".to_string(),
            lang: "EL".to_string(),
            ..Default::default()
        };
        let req = ScrapeRequest::for_feed(&feed, "https://example.com/a", 42, "2019-03-01");
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["tweetId"], 42);
        assert_eq!(v["screenName"], "in_gr");
        assert_eq!(v["crawledAt"], "2019-03-01");
    }
}
