//! Per-filename quiet-period debouncing.
//!
//! Each filename owns at most one pending timer. A new raw event for the
//! same name aborts the old timer and starts a fresh one, so a name
//! stabilizes only after a full quiet period with no further events.
//!
//! Timers report `(filename, generation)` on an internal channel. An expiry
//! whose generation is no longer the current one for its name is dropped,
//! which covers the window where a timer fired just before it was aborted.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use stockdrop_core::Filename;

/// What [`Debouncer::on_raw_event`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawEventOutcome {
    /// The name carries the transport's temp prefix.
    IgnoredTemp,
    Scheduled,
    /// An earlier timer for the same name was cancelled.
    Rescheduled,
}

struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

pub struct Debouncer {
    quiet: Duration,
    temp_prefix: String,
    pending: HashMap<Filename, PendingTimer>,
    next_generation: u64,
    expired_tx: mpsc::UnboundedSender<(Filename, u64)>,
    expired_rx: mpsc::UnboundedReceiver<(Filename, u64)>,
}

impl Debouncer {
    pub fn new(quiet: Duration, temp_prefix: impl Into<String>) -> Self {
        let (expired_tx, expired_rx) = mpsc::unbounded_channel();
        Self {
            quiet,
            temp_prefix: temp_prefix.into(),
            pending: HashMap::new(),
            next_generation: 0,
            expired_tx,
            expired_rx,
        }
    }

    /// Record one raw event for `filename`. Must be called inside a tokio runtime.
    pub fn on_raw_event(&mut self, filename: Filename) -> RawEventOutcome {
        if filename.is_transport_temp(&self.temp_prefix) {
            tracing::debug!(filename = %filename, prefix = %self.temp_prefix, "ignoring temporary file");
            return RawEventOutcome::IgnoredTemp;
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        let quiet = self.quiet;
        let expired_tx = self.expired_tx.clone();
        let key = filename.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            let _ = expired_tx.send((key, generation));
        });

        match self.pending.insert(filename, PendingTimer { generation, handle }) {
            Some(previous) => {
                previous.handle.abort();
                RawEventOutcome::Rescheduled
            }
            None => RawEventOutcome::Scheduled,
        }
    }

    /// Wait for the next filename whose quiet period elapsed. Its timer entry
    /// is removed before it is returned.
    ///
    /// Cancel-safe. Returns `None` only if the expiry channel closed, which
    /// cannot happen while the debouncer holds its own sender.
    pub async fn next_stabilized(&mut self) -> Option<Filename> {
        loop {
            let (filename, generation) = self.expired_rx.recv().await?;
            let current = matches!(
                self.pending.get(&filename),
                Some(timer) if timer.generation == generation
            );
            if current {
                self.pending.remove(&filename);
                return Some(filename);
            }
        }
    }

    /// Number of filenames with a live timer.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        for timer in self.pending.values() {
            timer.handle.abort();
        }
    }
}
