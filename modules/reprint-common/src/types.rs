use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// --- Search store documents ---

/// A scraped article as stored in the `articles` index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub doc_id: String,
    pub lang: String,
    pub crawled_at: String,
    pub screen_name: String,
    pub url: String,
    pub tweet_id: u64,
    #[serde(default)]
    pub content: Content,
    #[serde(default)]
    pub nlp: Nlp,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub edited_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nlp {
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default)]
    pub stop_words: Vec<String>,
}

impl Document {
    /// Publication timestamp, parsed strictly. An unparsable timestamp is
    /// an error rather than a zero default: a zero default would silently
    /// flip the chronological direction of relationship edges.
    pub fn published_at(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(&self.content.published_at).map(|t| t.with_timezone(&Utc))
    }

    /// Shape this document takes inside the graph store.
    pub fn article_node(&self) -> ArticleNode {
        ArticleNode {
            tweet_id: self.tweet_id,
            doc_id: self.doc_id.clone(),
            title: self.content.title.clone(),
            screen_name: self.screen_name.clone(),
            published_at: self.content.published_at.clone(),
            url: self.url.clone(),
        }
    }
}

/// An Article node, keyed by the stable numeric tweet id.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleNode {
    pub tweet_id: u64,
    pub doc_id: String,
    pub title: String,
    pub screen_name: String,
    pub published_at: String,
    pub url: String,
}

// --- Relationship records (the `relationships` index) ---

/// One side of a stored relationship record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelParty {
    pub doc_id: String,
    pub tweet_id: u64,
    pub screen_name: String,
    #[serde(default)]
    pub published_at: String,
}

/// A detected similarity between two stored documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelRecord {
    pub source: RelParty,
    pub target: RelParty,
    pub score: f64,
}

// --- Feeds API ---

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedMetaClasses {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub sources: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub categories: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub edited_at: String,
    #[serde(default)]
    pub feed_type: String,
    #[serde(default)]
    pub api: String,
}

/// A monitored news outlet, keyed by its twitter screen name.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub screen_name: String,
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub meta_classes: FeedMetaClasses,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feeds {
    #[serde(default)]
    pub data: Vec<Feed>,
}

// --- Tweet sample CSV rows ---

/// One crawled tweet+link pair, as written to the sample CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweetRow {
    pub order: i64,
    pub created_at: String,
    pub screen_name: String,
    pub tweet_id: String,
    pub url: String,
}
