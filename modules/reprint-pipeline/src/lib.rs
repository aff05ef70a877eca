pub mod error;
pub mod pipeline;
pub mod shutdown;

pub use error::{HandlerError, PipelineError};
pub use pipeline::{
    Page, PipelineConfig, Record, RecordHandler, RunStats, ScrollPipeline, ScrollSource,
};
pub use shutdown::{shutdown_channel, ShutdownRx, ShutdownTx};
