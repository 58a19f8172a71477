//! User interrupt handling
//!
//! Ctrl+C cancels a shared [`CancellationToken`]. The symbol resolver watches
//! the token while it waits on the external process and the pipeline checks
//! it between steps, so an interrupt aborts the run without writing output.

use log::info;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Cloneable flag that flips once from "running" to "cancelled"
#[derive(Debug, Clone)]
pub struct CancellationToken {
    state: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self { state: Arc::new(state) }
    }

    /// Request cancellation; waking every waiter
    pub fn cancel(&self) {
        self.state.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.state.borrow()
    }

    /// Resolve once the token is cancelled (immediately if it already is)
    pub async fn cancelled(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this only returns once cancelled
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancel `token` when the user presses Ctrl+C
///
/// Must be called from within a tokio runtime.
#[must_use]
pub fn install_interrupt_handler(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling");
            token.cancel();
        }
    })
}
