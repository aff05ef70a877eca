//! One-shot broadcast shutdown signal for batch coordination.
//!
//! A thin wrapper over a watch channel: the coordinator triggers it once
//! on the first hard failure, every task observes it. Carries no payload;
//! the error that caused it travels through the coordinator instead.

use tokio::sync::watch;

/// Trigger side of the shutdown signal. Held by the coordinator.
#[derive(Clone)]
pub struct ShutdownTx(watch::Sender<bool>);

/// Observer side of the shutdown signal. Cloned into every task.
#[derive(Clone)]
pub struct ShutdownRx(watch::Receiver<bool>);

/// Create a shutdown signal in the untriggered state.
pub fn shutdown_channel() -> (ShutdownTx, ShutdownRx) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTx(tx), ShutdownRx(rx))
}

impl ShutdownTx {
    /// Fire the signal. Idempotent; effects are permanent for the batch.
    pub fn trigger(&self) {
        let _ = self.0.send(true);
    }
}

impl ShutdownRx {
    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }

    /// Wait until the signal fires. If the trigger side is gone without
    /// ever firing, waits forever; the select sites racing this against
    /// channel traffic resolve through their other branch.
    pub async fn triggered(&mut self) {
        if self.0.wait_for(|fired| *fired).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
