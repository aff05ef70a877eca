use neo4rs::query;
use tracing::debug;

use reprint_common::ArticleNode;

use crate::GraphClient;

/// Write-side wrapper for the graph. All writes are idempotent: nodes
/// MERGE on tweetId, edges MERGE on the ordered endpoint pair.
pub struct GraphWriter {
    client: GraphClient,
}

impl GraphWriter {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Create or update an Article node. Re-running with the same tweetId
    /// overwrites properties and never duplicates the node.
    pub async fn upsert_article(&self, node: &ArticleNode) -> Result<(), neo4rs::Error> {
        let q = query(
            "MERGE (a:Article {tweetId: $tweet_id})
             SET a.title = $title,
                 a.screenName = $screen_name,
                 a.publishedAt = $published_at,
                 a.docId = $doc_id,
                 a.url = $url",
        )
        .param("tweet_id", node.tweet_id as i64)
        .param("title", node.title.as_str())
        .param("screen_name", node.screen_name.as_str())
        .param("published_at", node.published_at.as_str())
        .param("doc_id", node.doc_id.as_str())
        .param("url", node.url.as_str());

        self.client.graph.run(q).await?;
        debug!(tweet_id = node.tweet_id, "upserted article node");
        Ok(())
    }

    /// Create the directed RELATED_WITH edge between two existing Article
    /// nodes, carrying the similarity score. One edge per ordered pair.
    pub async fn relate(
        &self,
        from_tweet_id: u64,
        to_tweet_id: u64,
        score: f64,
    ) -> Result<(), neo4rs::Error> {
        let q = query(
            "MATCH (a:Article {tweetId: $from_id}), (b:Article {tweetId: $to_id})
             MERGE (a)-[r:RELATED_WITH]->(b)
             SET r.score = $score",
        )
        .param("from_id", from_tweet_id as i64)
        .param("to_id", to_tweet_id as i64)
        .param("score", score);

        self.client.graph.run(q).await?;
        Ok(())
    }

    /// Point an existing Article node at its document URL.
    pub async fn set_article_url(&self, tweet_id: u64, url: &str) -> Result<(), neo4rs::Error> {
        let q = query(
            "MATCH (a:Article) WHERE a.tweetId = $tweet_id SET a.url = $url",
        )
        .param("tweet_id", tweet_id as i64)
        .param("url", url);

        self.client.graph.run(q).await?;
        Ok(())
    }
}
