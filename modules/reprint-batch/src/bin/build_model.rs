//! Build a model-training corpus: scroll every article and append its
//! cleaned body, one per line, to the output file.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use elastic_client::EsClient;
use reprint_batch::model::CorpusWriter;
use reprint_batch::source::EsScrollSource;
use reprint_common::Config;
use reprint_pipeline::{PipelineConfig, ScrollPipeline};

#[derive(Parser)]
struct Args {
    /// Corpus output file.
    #[arg(long, default_value = "corpus.txt")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    let es = EsClient::connect(&config.es_url(), &config.es_user, &config.es_pass).await?;

    let source = EsScrollSource::new(es, "articles", json!({"match_all": {}}), config.page_size);
    let handler = Arc::new(CorpusWriter::new(BufWriter::new(File::create(&args.out)?)));

    let pipeline = ScrollPipeline::new(PipelineConfig {
        workers: config.workers,
        ..Default::default()
    });
    let stats = pipeline.run(source, Arc::clone(&handler)).await?;
    handler.flush()?;

    info!(
        records = stats.records,
        record_errors = stats.record_errors,
        out = %args.out.display(),
        "corpus written"
    );
    Ok(())
}
