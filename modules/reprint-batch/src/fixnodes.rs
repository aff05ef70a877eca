//! Record handler for the node-repair batch: push every indexed
//! document's URL onto its Article node.

use anyhow::{Context, Result};
use async_trait::async_trait;

use reprint_common::Document;
use reprint_graph::GraphWriter;
use reprint_pipeline::{HandlerError, Record, RecordHandler};

/// Write side: point an Article node at its document URL.
#[async_trait]
pub trait UrlGraph: Send + Sync {
    async fn set_article_url(&self, tweet_id: u64, url: &str) -> Result<()>;
}

#[async_trait]
impl UrlGraph for GraphWriter {
    async fn set_article_url(&self, tweet_id: u64, url: &str) -> Result<()> {
        Ok(GraphWriter::set_article_url(self, tweet_id, url).await?)
    }
}

pub struct FixNodeUrls<G> {
    graph: G,
}

impl<G: UrlGraph> FixNodeUrls<G> {
    pub fn new(graph: G) -> Self {
        Self { graph }
    }
}

#[async_trait]
impl<G: UrlGraph> RecordHandler for FixNodeUrls<G> {
    async fn handle(&self, record: Record) -> Result<(), HandlerError> {
        let doc: Document = serde_json::from_slice(&record.raw).map_err(HandlerError::record)?;

        self.graph
            .set_article_url(doc.tweet_id, &doc.url)
            .await
            .with_context(|| format!("updating url for {:?}", doc.content.title))
            .map_err(HandlerError::Record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use bytes::Bytes;

    #[derive(Default)]
    struct MemUrls(Mutex<HashMap<u64, String>>);

    #[async_trait]
    impl UrlGraph for MemUrls {
        async fn set_article_url(&self, tweet_id: u64, url: &str) -> Result<()> {
            self.0.lock().unwrap().insert(tweet_id, url.to_string());
            Ok(())
        }
    }

    fn doc_bytes(tweet_id: u64, url: &str) -> Bytes {
        let body = serde_json::json!({
            "docId": format!("doc-{tweet_id}"),
            "lang": "EL",
            "crawledAt": "2019-03-01T10:00:00Z",
            "screenName": "outlet",
            "url": url,
            "tweetId": tweet_id,
        });
        Bytes::from(serde_json::to_vec(&body).unwrap())
    }

    #[tokio::test]
    async fn updates_the_node_url() {
        let handler = FixNodeUrls::new(MemUrls::default());
        handler
            .handle(Record {
                raw: doc_bytes(7, "https://example.com/fixed"),
                cursor: None,
            })
            .await
            .unwrap();

        let urls = handler.graph.0.lock().unwrap();
        assert_eq!(urls.get(&7).map(String::as_str), Some("https://example.com/fixed"));
    }

    #[tokio::test]
    async fn malformed_document_is_a_record_error() {
        let handler = FixNodeUrls::new(MemUrls::default());
        let err = handler
            .handle(Record {
                raw: Bytes::from_static(b"{"),
                cursor: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Record(_)));
    }
}
