//! Repair pass: push every indexed article's URL onto its graph node.

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use elastic_client::EsClient;
use reprint_batch::fixnodes::FixNodeUrls;
use reprint_batch::source::EsScrollSource;
use reprint_common::Config;
use reprint_graph::{GraphClient, GraphWriter};
use reprint_pipeline::{PipelineConfig, ScrollPipeline};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let es = EsClient::connect(&config.es_url(), &config.es_user, &config.es_pass).await?;
    let graph =
        GraphClient::connect(&config.neo_uri, &config.neo_user, &config.neo_pass).await?;
    let writer = GraphWriter::new(graph);

    let source = EsScrollSource::new(es, "articles", json!({"match_all": {}}), config.page_size);
    let handler = Arc::new(FixNodeUrls::new(writer));

    let pipeline = ScrollPipeline::new(PipelineConfig {
        workers: config.workers,
        ..Default::default()
    });
    let stats = pipeline.run(source, handler).await?;

    info!(
        records = stats.records,
        record_errors = stats.record_errors,
        "node urls fixed"
    );
    Ok(())
}
