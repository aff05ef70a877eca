//! Downstream writer for the relationship batch: resolve both referenced
//! articles, upsert their graph nodes, and create the directed
//! RELATED_WITH edge.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use elastic_client::EsClient;
use reprint_common::{Document, RelRecord};
use reprint_graph::GraphWriter;
use reprint_pipeline::{HandlerError, Record, RecordHandler};

/// Index holding the full article documents referenced by relationship
/// records.
const ARTICLES_INDEX: &str = "articles";

/// Which of the two documents the edge starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    AToB,
    BToA,
}

/// Chronological direction rule: the edge runs from the later-published
/// document to the earlier one. Equal timestamps resolve toward the
/// document passed first (a → b).
pub fn edge_direction(a: DateTime<Utc>, b: DateTime<Utc>) -> EdgeDirection {
    if a < b {
        EdgeDirection::BToA
    } else {
        EdgeDirection::AToB
    }
}

/// Read side: resolve a referenced document by id.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// `Ok(None)` means the document does not exist; `Err` means the
    /// store itself is unreachable.
    async fn article(&self, doc_id: &str) -> Result<Option<Document>>;
}

#[async_trait]
impl ArticleStore for EsClient {
    async fn article(&self, doc_id: &str) -> Result<Option<Document>> {
        match self.get_source(ARTICLES_INDEX, doc_id).await? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            None => Ok(None),
        }
    }
}

/// Write side: idempotent node upsert plus directed edge creation.
#[async_trait]
pub trait RelationGraph: Send + Sync {
    async fn upsert_article(&self, node: &reprint_common::ArticleNode) -> Result<()>;
    async fn relate(&self, from_tweet_id: u64, to_tweet_id: u64, score: f64) -> Result<()>;
}

#[async_trait]
impl RelationGraph for GraphWriter {
    async fn upsert_article(&self, node: &reprint_common::ArticleNode) -> Result<()> {
        Ok(GraphWriter::upsert_article(self, node).await?)
    }

    async fn relate(&self, from_tweet_id: u64, to_tweet_id: u64, score: f64) -> Result<()> {
        Ok(GraphWriter::relate(self, from_tweet_id, to_tweet_id, score).await?)
    }
}

/// Record handler for the `relationships` scroll. Store connectivity
/// failures are fatal; everything scoped to a single record (bad payload,
/// missing article, unparsable timestamp, one failed graph write) is a
/// record error.
pub struct RelationWriter<S, G> {
    store: S,
    graph: G,
}

impl<S: ArticleStore, G: RelationGraph> RelationWriter<S, G> {
    pub fn new(store: S, graph: G) -> Self {
        Self { store, graph }
    }

    async fn resolve(&self, doc_id: &str) -> Result<Document, HandlerError> {
        match self.store.article(doc_id).await {
            Ok(Some(doc)) => Ok(doc),
            Ok(None) => Err(HandlerError::record(anyhow!(
                "referenced document {doc_id} not found"
            ))),
            Err(err) => Err(HandlerError::Fatal(
                err.context(format!("fetching document {doc_id}")),
            )),
        }
    }

    async fn write(&self, a: &Document, b: &Document, score: f64) -> Result<()> {
        let ta = a
            .published_at()
            .with_context(|| format!("bad publishedAt on {:?}", a.content.title))?;
        let tb = b
            .published_at()
            .with_context(|| format!("bad publishedAt on {:?}", b.content.title))?;

        self.graph
            .upsert_article(&a.article_node())
            .await
            .with_context(|| format!("upserting node for {:?}", a.content.title))?;
        self.graph
            .upsert_article(&b.article_node())
            .await
            .with_context(|| format!("upserting node for {:?}", b.content.title))?;

        let (from, to) = match edge_direction(ta, tb) {
            EdgeDirection::AToB => (a.tweet_id, b.tweet_id),
            EdgeDirection::BToA => (b.tweet_id, a.tweet_id),
        };
        self.graph
            .relate(from, to, score)
            .await
            .with_context(|| format!("relating {:?} and {:?}", a.content.title, b.content.title))
    }
}

#[async_trait]
impl<S: ArticleStore, G: RelationGraph> RecordHandler for RelationWriter<S, G> {
    async fn handle(&self, record: Record) -> Result<(), HandlerError> {
        let rel: RelRecord = serde_json::from_slice(&record.raw).map_err(HandlerError::record)?;

        let a = self.resolve(&rel.source.doc_id).await?;
        let b = self.resolve(&rel.target.doc_id).await?;

        self.write(&a, &b, rel.score)
            .await
            .map_err(HandlerError::Record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use bytes::Bytes;
    use chrono::TimeZone;

    fn doc(doc_id: &str, tweet_id: u64, published_at: &str) -> Document {
        let mut d = Document {
            doc_id: doc_id.to_string(),
            tweet_id,
            screen_name: "outlet".to_string(),
            url: format!("https://example.com/{doc_id}"),
            ..Default::default()
        };
        d.content.title = format!("title-{doc_id}");
        d.content.published_at = published_at.to_string();
        d
    }

    fn rel_bytes(source_id: &str, target_id: &str, score: f64) -> Bytes {
        let body = serde_json::json!({
            "source": {"docId": source_id, "tweetId": 0, "screenName": "x"},
            "target": {"docId": target_id, "tweetId": 0, "screenName": "y"},
            "score": score,
        });
        Bytes::from(serde_json::to_vec(&body).unwrap())
    }

    fn record(raw: Bytes) -> Record {
        Record { raw, cursor: None }
    }

    struct MemStore(HashMap<String, Document>);

    #[async_trait]
    impl ArticleStore for MemStore {
        async fn article(&self, doc_id: &str) -> Result<Option<Document>> {
            Ok(self.0.get(doc_id).cloned())
        }
    }

    /// Store whose transport is down.
    struct DeadStore;

    #[async_trait]
    impl ArticleStore for DeadStore {
        async fn article(&self, _doc_id: &str) -> Result<Option<Document>> {
            Err(anyhow!("connection refused"))
        }
    }

    /// In-memory graph: one node per key, one scored edge per ordered
    /// pair, exactly like the MERGE semantics of the real writer.
    #[derive(Default)]
    struct MemGraph {
        nodes: Mutex<HashMap<u64, reprint_common::ArticleNode>>,
        edges: Mutex<HashMap<(u64, u64), f64>>,
    }

    #[async_trait]
    impl RelationGraph for MemGraph {
        async fn upsert_article(&self, node: &reprint_common::ArticleNode) -> Result<()> {
            self.nodes
                .lock()
                .unwrap()
                .insert(node.tweet_id, node.clone());
            Ok(())
        }

        async fn relate(&self, from: u64, to: u64, score: f64) -> Result<()> {
            self.edges.lock().unwrap().insert((from, to), score);
            Ok(())
        }
    }

    fn writer(
        docs: Vec<Document>,
    ) -> (RelationWriter<MemStore, Arc<MemGraph>>, Arc<MemGraph>) {
        let graph = Arc::new(MemGraph::default());
        let store = MemStore(docs.into_iter().map(|d| (d.doc_id.clone(), d)).collect());
        (RelationWriter::new(store, Arc::clone(&graph)), graph)
    }

    #[async_trait]
    impl RelationGraph for Arc<MemGraph> {
        async fn upsert_article(&self, node: &reprint_common::ArticleNode) -> Result<()> {
            self.as_ref().upsert_article(node).await
        }

        async fn relate(&self, from: u64, to: u64, score: f64) -> Result<()> {
            self.as_ref().relate(from, to, score).await
        }
    }

    #[test]
    fn direction_later_points_to_earlier() {
        let early = Utc.with_ymd_and_hms(2019, 3, 1, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2019, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(edge_direction(early, late), EdgeDirection::BToA);
        assert_eq!(edge_direction(late, early), EdgeDirection::AToB);
    }

    #[test]
    fn direction_tie_goes_first_to_second() {
        let t = Utc.with_ymd_and_hms(2019, 3, 1, 9, 0, 0).unwrap();
        assert_eq!(edge_direction(t, t), EdgeDirection::AToB);
    }

    #[tokio::test]
    async fn creates_edge_from_later_to_earlier() {
        let (writer, graph) = writer(vec![
            doc("early", 1, "2019-03-01T09:00:00Z"),
            doc("late", 2, "2019-03-01T12:00:00Z"),
        ]);

        writer
            .handle(record(rel_bytes("early", "late", 0.9)))
            .await
            .unwrap();

        assert_eq!(graph.nodes.lock().unwrap().len(), 2);
        let edges = graph.edges.lock().unwrap();
        assert_eq!(edges.len(), 1);
        // source published first, so the edge runs target → source
        assert!((edges[&(2, 1)] - 0.9).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn equal_timestamps_relate_source_to_target() {
        let (writer, graph) = writer(vec![
            doc("a", 1, "2019-03-01T09:00:00Z"),
            doc("b", 2, "2019-03-01T09:00:00Z"),
        ]);

        writer
            .handle(record(rel_bytes("a", "b", 0.5)))
            .await
            .unwrap();

        let edges = graph.edges.lock().unwrap();
        assert!(edges.contains_key(&(1, 2)));
    }

    #[tokio::test]
    async fn rerunning_the_same_record_duplicates_nothing() {
        let (writer, graph) = writer(vec![
            doc("a", 1, "2019-03-01T09:00:00Z"),
            doc("b", 2, "2019-03-01T12:00:00Z"),
        ]);
        let rel = rel_bytes("a", "b", 0.7);

        writer.handle(record(rel.clone())).await.unwrap();
        writer.handle(record(rel)).await.unwrap();

        assert_eq!(graph.nodes.lock().unwrap().len(), 2);
        assert_eq!(graph.edges.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_payload_is_a_record_error() {
        let (writer, _) = writer(vec![]);
        let err = writer
            .handle(record(Bytes::from_static(b"not json")))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Record(_)));
    }

    #[tokio::test]
    async fn missing_article_is_a_record_error() {
        let (writer, graph) = writer(vec![doc("a", 1, "2019-03-01T09:00:00Z")]);
        let err = writer
            .handle(record(rel_bytes("a", "gone", 0.5)))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Record(_)));
        assert!(graph.edges.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unparsable_timestamp_is_a_record_error_and_writes_nothing() {
        let (writer, graph) = writer(vec![
            doc("a", 1, "whenever"),
            doc("b", 2, "2019-03-01T12:00:00Z"),
        ]);

        let err = writer
            .handle(record(rel_bytes("a", "b", 0.5)))
            .await
            .unwrap_err();

        assert!(matches!(err, HandlerError::Record(_)));
        assert!(graph.nodes.lock().unwrap().is_empty());
        assert!(graph.edges.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unreachable_store_is_fatal() {
        let graph = Arc::new(MemGraph::default());
        let writer = RelationWriter::new(DeadStore, graph);
        let err = writer
            .handle(record(rel_bytes("a", "b", 0.5)))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Fatal(_)));
    }
}
