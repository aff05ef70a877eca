//! Record handler for the model-corpus batch: normalize each article body
//! and append it, one body per line, to the corpus sink.

use std::io::Write;
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;

use reprint_common::clean_body;
use reprint_pipeline::{HandlerError, Record, RecordHandler};

/// Only the body is needed; the rest of the document stays undecoded.
#[derive(Deserialize)]
struct BodyOnly {
    #[serde(default)]
    content: BodyContent,
}

#[derive(Default, Deserialize)]
struct BodyContent {
    #[serde(default)]
    body: String,
}

/// Shared line sink for all workers. Output order is whatever the worker
/// interleaving produces; the corpus is order-insensitive.
pub struct CorpusWriter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> CorpusWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    pub fn flush(&self) -> std::io::Result<()> {
        self.out.lock().unwrap().flush()
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap()
    }
}

#[async_trait]
impl<W: Write + Send> RecordHandler for CorpusWriter<W> {
    async fn handle(&self, record: Record) -> Result<(), HandlerError> {
        let doc: BodyOnly = serde_json::from_slice(&record.raw).map_err(HandlerError::record)?;

        let line = clean_body(&doc.content.body);
        if line.is_empty() {
            return Ok(());
        }

        // The sink is shared by every worker; losing it is fatal.
        let mut out = self.out.lock().unwrap();
        writeln!(out, "{line}")
            .context("writing corpus line")
            .map_err(HandlerError::Fatal)
    }
}
