//! The scroll fan-out core: one producer paginating a cursor query, a
//! fixed pool of workers consuming records off a shared channel, and a
//! coordinator that cancels everything on the first hard failure and
//! reports that failure once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::error::{HandlerError, PipelineError};
use crate::shutdown::{shutdown_channel, ShutdownRx};

/// A unit of paginated data. Produced once, consumed by exactly one
/// worker; ownership moves through the channel.
#[derive(Debug, Clone)]
pub struct Record {
    /// Raw source payload, decoded by the use case's handler.
    pub raw: Bytes,
    /// Cursor of the page this record came from, for diagnostics.
    pub cursor: Option<String>,
}

/// One page of raw payloads plus the cursor it was fetched under.
#[derive(Debug, Default)]
pub struct Page {
    pub records: Vec<Bytes>,
    pub cursor: Option<String>,
}

/// A paginated result set. Implementations wrap a store's cursor API;
/// each `next_page` call must resume from the token the previous response
/// returned, and `None` marks exhaustion.
#[async_trait]
pub trait ScrollSource: Send {
    /// Pre-flight count for the query. Zero short-circuits the whole run
    /// before any page is fetched.
    async fn count(&mut self) -> anyhow::Result<u64>;

    /// Fetch the next page, or `None` once the cursor is exhausted.
    async fn next_page(&mut self) -> anyhow::Result<Option<Page>>;
}

/// Per-record work: decode the payload and perform the downstream writes.
/// Shared by all workers; must tolerate arbitrary interleaving.
#[async_trait]
pub trait RecordHandler: Send + Sync {
    async fn handle(&self, record: Record) -> Result<(), HandlerError>;
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of concurrent consumers.
    pub workers: usize,
    /// Record channel capacity. Zero is a rendezvous channel: the
    /// producer blocks until a worker takes each record.
    pub channel_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            channel_capacity: 0,
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunStats {
    /// Records handled to completion.
    pub records: u64,
    /// Records that failed at the record level and were skipped.
    pub record_errors: u64,
}

/// Generic cursor fan-out runner. Each batch utility is a thin
/// configuration of this: a source, a handler, a worker count.
pub struct ScrollPipeline {
    config: PipelineConfig,
}

impl ScrollPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the batch to completion. Returns the first hard error from the
    /// producer or any worker, or run stats after a full drain.
    pub async fn run<S, H>(&self, source: S, handler: Arc<H>) -> Result<RunStats, PipelineError>
    where
        S: ScrollSource + 'static,
        H: RecordHandler + 'static,
    {
        let mut source = source;
        let total = source.count().await.map_err(PipelineError::Source)?;
        if total == 0 {
            info!("nothing to process");
            return Ok(RunStats::default());
        }
        info!(total, workers = self.config.workers, "starting batch");

        let (tx, rx) = flume::bounded::<Record>(self.config.channel_capacity);
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let records = Arc::new(AtomicU64::new(0));
        let record_errors = Arc::new(AtomicU64::new(0));

        let mut tasks: JoinSet<Result<(), PipelineError>> = JoinSet::new();

        tasks.spawn(produce(source, tx, shutdown_rx.clone()));

        for _ in 0..self.config.workers {
            tasks.spawn(consume(
                rx.clone(),
                Arc::clone(&handler),
                shutdown_rx.clone(),
                Arc::clone(&records),
                Arc::clone(&record_errors),
            ));
        }
        drop(rx);

        let mut first_error: Option<PipelineError> = None;
        while let Some(joined) = tasks.join_next().await {
            let result = match joined {
                Ok(result) => result,
                Err(join_err) => Err(PipelineError::Handler(anyhow::anyhow!(
                    "task panicked: {join_err}"
                ))),
            };
            if let Err(err) = result {
                if matches!(err, PipelineError::Cancelled) {
                    continue;
                }
                if first_error.is_none() {
                    first_error = Some(err);
                    shutdown_tx.trigger();
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                let stats = RunStats {
                    records: records.load(Ordering::Relaxed),
                    record_errors: record_errors.load(Ordering::Relaxed),
                };
                info!(
                    records = stats.records,
                    record_errors = stats.record_errors,
                    "batch complete"
                );
                Ok(stats)
            }
        }
    }
}

/// Producer task: drive the cursor, emit every record into the channel.
/// Dropping the sender on return is what signals end-of-stream to the
/// workers.
async fn produce<S: ScrollSource>(
    mut source: S,
    tx: flume::Sender<Record>,
    mut shutdown: ShutdownRx,
) -> Result<(), PipelineError> {
    loop {
        let page = match source.next_page().await {
            Ok(Some(page)) => page,
            Ok(None) => return Ok(()),
            Err(err) => return Err(PipelineError::Source(err)),
        };

        for raw in page.records {
            let record = Record {
                raw,
                cursor: page.cursor.clone(),
            };
            tokio::select! {
                _ = shutdown.triggered() => return Err(PipelineError::Cancelled),
                sent = tx.send_async(record) => {
                    // All receivers gone means the batch is being torn down.
                    if sent.is_err() {
                        return Err(PipelineError::Cancelled);
                    }
                }
            }
        }
    }
}

/// Worker task: pull records until the channel closes (clean exit) or the
/// shutdown signal fires.
async fn consume<H: RecordHandler>(
    rx: flume::Receiver<Record>,
    handler: Arc<H>,
    mut shutdown: ShutdownRx,
    records: Arc<AtomicU64>,
    record_errors: Arc<AtomicU64>,
) -> Result<(), PipelineError> {
    loop {
        if shutdown.is_triggered() {
            return Err(PipelineError::Cancelled);
        }

        let record = tokio::select! {
            _ = shutdown.triggered() => return Err(PipelineError::Cancelled),
            received = rx.recv_async() => match received {
                Ok(record) => record,
                Err(_) => return Ok(()),
            },
        };

        match handler.handle(record).await {
            Ok(()) => {
                records.fetch_add(1, Ordering::Relaxed);
            }
            Err(HandlerError::Record(err)) => {
                warn!(error = format!("{err:#}"), "record failed, skipping");
                record_errors.fetch_add(1, Ordering::Relaxed);
            }
            Err(HandlerError::Fatal(err)) => return Err(PipelineError::Handler(err)),
        }
    }
}
