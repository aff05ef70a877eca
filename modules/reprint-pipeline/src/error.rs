use thiserror::Error;

/// Errors surfaced by a pipeline run. At most one reaches the caller:
/// the first hard failure from the producer or any worker.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("scroll source error: {0}")]
    Source(anyhow::Error),

    #[error("record handler error: {0}")]
    Handler(anyhow::Error),

    /// Observed by tasks after a sibling's hard failure. Never reported
    /// as the run's root cause.
    #[error("batch cancelled")]
    Cancelled,
}

/// Two-tier handler outcome. Record-level failures (bad payload, one
/// failed downstream write) are logged and counted while the batch keeps
/// going; fatal failures (store/transport trouble) cancel the batch.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{0}")]
    Record(anyhow::Error),

    #[error("{0}")]
    Fatal(anyhow::Error),
}

impl HandlerError {
    pub fn record(err: impl Into<anyhow::Error>) -> Self {
        HandlerError::Record(err.into())
    }

    pub fn fatal(err: impl Into<anyhow::Error>) -> Self {
        HandlerError::Fatal(err.into())
    }
}
