use async_trait::async_trait;
use bytes::Bytes;

use elastic_client::{EsClient, Scroll};
use reprint_pipeline::{Page, ScrollSource};

/// Scroll adapter over the search store: one query, one server-side
/// cursor, pages of raw `_source` payloads. The scroll itself is opened
/// lazily on the first page fetch.
pub struct EsScrollSource {
    client: EsClient,
    index: String,
    query: serde_json::Value,
    page_size: usize,
    scroll: Option<Scroll>,
}

impl EsScrollSource {
    pub fn new(client: EsClient, index: &str, query: serde_json::Value, page_size: usize) -> Self {
        Self {
            client,
            index: index.to_string(),
            query,
            page_size,
            scroll: None,
        }
    }
}

#[async_trait]
impl ScrollSource for EsScrollSource {
    async fn count(&mut self) -> anyhow::Result<u64> {
        Ok(self.client.count(&self.index, &self.query).await?)
    }

    async fn next_page(&mut self) -> anyhow::Result<Option<Page>> {
        let scroll = self.scroll.get_or_insert_with(|| {
            self.client
                .scroll(&self.index, self.query.clone(), self.page_size)
        });

        let hits = match scroll.next_page().await? {
            Some(hits) => hits,
            None => return Ok(None),
        };

        let records = hits
            .into_iter()
            .map(|hit| Bytes::copy_from_slice(hit.source.get().as_bytes()))
            .collect();

        Ok(Some(Page {
            records,
            cursor: scroll.scroll_id().map(str::to_string),
        }))
    }
}
