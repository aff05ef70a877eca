pub mod error;
pub mod types;

pub use error::{EsError, Result};
pub use types::Hit;

use std::time::Duration;

use bytes::Bytes;
use serde_json::json;
use tracing::debug;

use types::{CountResponse, GetResponse, SearchResponse};

/// How long the server keeps an open scroll context alive between pages.
const SCROLL_KEEP_ALIVE: &str = "1m";

/// Startup health-check / request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Minimal Elasticsearch REST client: count, scroll, single-document get.
/// Cheap to clone; safe for concurrent use from multiple workers.
#[derive(Clone)]
pub struct EsClient {
    client: reqwest::Client,
    base_url: String,
    user: String,
    pass: String,
}

impl EsClient {
    /// Build a client and verify the cluster answers a root ping.
    pub async fn connect(base_url: &str, user: &str, pass: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| EsError::Network(e.to_string()))?;

        let es = Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user: user.to_string(),
            pass: pass.to_string(),
        };

        let resp = es.request(es.client.get(&es.base_url)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(EsError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(es)
    }

    /// Number of documents in `index` matching `query`.
    pub async fn count(&self, index: &str, query: &serde_json::Value) -> Result<u64> {
        let url = format!("{}/{}/_count", self.base_url, index);
        let body = json!({ "query": query });

        let resp = self.request(self.client.post(&url)).json(&body).send().await?;
        let resp = Self::check(resp).await?;

        let counted: CountResponse = serde_json::from_slice(&resp.bytes().await?)?;
        Ok(counted.count)
    }

    /// Open a scroll over `index` for `query`, `page_size` hits per page.
    /// No request is made until the first `next_page` call.
    pub fn scroll(&self, index: &str, query: serde_json::Value, page_size: usize) -> Scroll {
        Scroll {
            client: self.clone(),
            index: index.to_string(),
            query,
            page_size,
            state: ScrollState::Start,
        }
    }

    /// Fetch one document's source by id. `None` when the document does
    /// not exist.
    pub async fn get_source(&self, index: &str, id: &str) -> Result<Option<Bytes>> {
        let url = format!("{}/{}/_doc/{}", self.base_url, index, id);

        let resp = self.request(self.client.get(&url)).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = Self::check(resp).await?;

        let got: GetResponse = serde_json::from_slice(&resp.bytes().await?)?;
        match got.source {
            Some(raw) if got.found => Ok(Some(Bytes::copy_from_slice(raw.get().as_bytes()))),
            _ => Ok(None),
        }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.user.is_empty() {
            builder
        } else {
            builder.basic_auth(&self.user, Some(&self.pass))
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(EsError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp)
    }
}

enum ScrollState {
    Start,
    Continue(String),
    Done,
}

/// Server-side cursor over one query. Each page request must carry the
/// scroll id returned by the previous response; an empty page terminates
/// the scroll and clears the server-side context.
pub struct Scroll {
    client: EsClient,
    index: String,
    query: serde_json::Value,
    page_size: usize,
    state: ScrollState,
}

impl Scroll {
    /// Fetch the next page of hits. `None` once the scroll is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Hit>>> {
        let resp = match &self.state {
            ScrollState::Start => {
                let url = format!(
                    "{}/{}/_search?scroll={}",
                    self.client.base_url, self.index, SCROLL_KEEP_ALIVE
                );
                let body = json!({ "size": self.page_size, "query": self.query });
                self.client
                    .request(self.client.client.post(&url))
                    .json(&body)
                    .send()
                    .await?
            }
            ScrollState::Continue(scroll_id) => {
                let url = format!("{}/_search/scroll", self.client.base_url);
                let body = json!({ "scroll": SCROLL_KEEP_ALIVE, "scroll_id": scroll_id });
                self.client
                    .request(self.client.client.post(&url))
                    .json(&body)
                    .send()
                    .await?
            }
            ScrollState::Done => return Ok(None),
        };

        let resp = EsClient::check(resp).await?;
        let search: SearchResponse = serde_json::from_slice(&resp.bytes().await?)?;

        if search.hits.hits.is_empty() {
            self.finish().await;
            return Ok(None);
        }

        match search.scroll_id {
            Some(id) => self.state = ScrollState::Continue(id),
            None => self.state = ScrollState::Done,
        }
        Ok(Some(search.hits.hits))
    }

    /// The scroll id the next page would be fetched with, if any.
    pub fn scroll_id(&self) -> Option<&str> {
        match &self.state {
            ScrollState::Continue(id) => Some(id),
            _ => None,
        }
    }

    /// Clear the server-side scroll context. Best effort: the context
    /// expires on its own after the keep-alive anyway.
    async fn finish(&mut self) {
        if let ScrollState::Continue(scroll_id) = &self.state {
            let url = format!("{}/_search/scroll", self.client.base_url);
            let body = json!({ "scroll_id": [scroll_id] });
            if let Err(err) = self
                .client
                .request(self.client.client.delete(&url))
                .json(&body)
                .send()
                .await
            {
                debug!(error = %err, "failed to clear scroll context");
            }
        }
        self.state = ScrollState::Done;
    }
}
