//! Background expiry sweeper.
//!
//! Lookups already purge expired entries lazily; the sweeper bounds how long
//! an expired entry that is never looked up again keeps occupying capacity.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, warn};

use crossbreed_core::{CrossError, CrossOutcome};

use crate::result_cache::ResultCache;

/// Owns a thread that calls [`ResultCache::purge_expired`] every `interval`.
///
/// Stopped by [`ExpirySweeper::shutdown`] or on drop.
pub struct ExpirySweeper {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ExpirySweeper {
    pub fn spawn(cache: Arc<ResultCache>, interval: Duration) -> CrossOutcome<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = std::thread::Builder::new()
            .name("crossbreed-expiry-sweeper".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let purged = cache.purge_expired();
                        if purged > 0 {
                            debug!(purged, "expiry sweep finished");
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })
            .map_err(|e| CrossError::cache_internal(format!("failed to start expiry sweeper: {e}")))?;

        debug!(interval_ms = interval.as_millis() as u64, "expiry sweeper started");
        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stop the sweeper thread and wait for it to exit. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            // The thread may already have exited; a closed channel is fine.
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("expiry sweeper thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.shutdown();
    }
}
