//! Recreate RELATED_WITH edges from the last day of stored relationship
//! records: scroll the `relationships` index, resolve both referenced
//! articles, upsert their nodes and the directed, scored edge.

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use elastic_client::EsClient;
use reprint_batch::relations::RelationWriter;
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

    // Relationships whose source article was published in the last day.
    let query = json!({
        "bool": {
            "must": [
                {"range": {"source.publishedAt": {"gte": "now-1d"}}}
            ]
        }
    });

    let source = EsScrollSource::new(es.clone(), "relationships", query, config.page_size);
    let handler = Arc::new(RelationWriter::new(es, writer));

    let pipeline = ScrollPipeline::new(PipelineConfig {
        workers: config.workers,
        ..Default::default()
    });
    let stats = pipeline.run(source, handler).await?;

    info!(
        records = stats.records,
        record_errors = stats.record_errors,
        "relationship recreation finished"
    );
    Ok(())
}
