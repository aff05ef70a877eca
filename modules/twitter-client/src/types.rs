use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A status from the user timeline endpoint. Quoted/retweeted payloads are
/// kept opaque; only their presence matters for filtering.
#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    pub id: u64,
    pub id_str: String,
    pub created_at: String,
    pub user: TweetUser,
    #[serde(default)]
    pub entities: TweetEntities,
    #[serde(default)]
    pub in_reply_to_status_id_str: Option<String>,
    #[serde(default)]
    pub in_reply_to_user_id_str: Option<String>,
    #[serde(default)]
    pub retweeted_status: Option<serde_json::Value>,
    #[serde(default)]
    pub quoted_status: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetUser {
    #[serde(default)]
    pub screen_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetEntities {
    #[serde(default)]
    pub urls: Vec<TweetUrl>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TweetUrl {
    pub expanded_url: String,
}

impl Tweet {
    /// True for plain statuses: not a reply, retweet, or quote.
    pub fn is_original(&self) -> bool {
        self.in_reply_to_status_id_str.as_deref().unwrap_or("").is_empty()
            && self.in_reply_to_user_id_str.as_deref().unwrap_or("").is_empty()
            && self.retweeted_status.is_none()
            && self.quoted_status.is_none()
    }

    /// Parse the timeline's `created_at` format
    /// (`Wed Mar 06 09:30:00 +0000 2019`).
    pub fn created_at_time(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_str(&self.created_at, "%a %b %d %H:%M:%S %z %Y")
            .map(|t| t.with_timezone(&Utc))
    }
}
