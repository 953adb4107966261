//! Filesystem change subscription for the watched directory.
//!
//! The notify callback runs on its own thread; events are bridged into a
//! tokio channel and handed out one filename at a time by
//! [`WatchSubscription::next`]. Nothing outside this module and the
//! debouncer knows notify exists.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use notify::event::{AccessKind, AccessMode};
use notify::{recommended_watcher, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::DaemonError;

/// One named change in the watched directory. `filename` is `None` when the
/// platform reported a change without a usable name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub filename: Option<String>,
}

pub struct WatchSubscription {
    // Dropping the watcher ends the subscription.
    _watcher: RecommendedWatcher,
    dir: PathBuf,
    events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    pending: VecDeque<RawEvent>,
}

impl WatchSubscription {
    /// Start a non-recursive watch on `dir`.
    pub fn subscribe(dir: &Path) -> Result<Self, DaemonError> {
        let (event_tx, events) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher = recommended_watcher(move |event| {
            let _ = event_tx.send(event);
        })?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        tracing::debug!(path = %dir.display(), "watch subscription started");

        Ok(Self {
            _watcher: watcher,
            dir: dir.to_path_buf(),
            events,
            pending: VecDeque::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Next raw event, or `None` once the watcher has shut down.
    ///
    /// Cancel-safe: events already pulled from notify stay buffered.
    pub async fn next(&mut self) -> Option<RawEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            match self.events.recv().await? {
                Ok(event) => self.pending.extend(raw_events(&event)),
                Err(err) => tracing::warn!(error = %err, "watcher event error"),
            }
        }
    }
}

/// Split a notify event into one [`RawEvent`] per affected path.
pub fn raw_events(event: &Event) -> Vec<RawEvent> {
    if !is_relevant_event_kind(&event.kind) {
        return Vec::new();
    }
    if event.paths.is_empty() {
        return vec![RawEvent { filename: None }];
    }
    event
        .paths
        .iter()
        .map(|path| RawEvent {
            filename: path
                .file_name()
                .and_then(|name| name.to_str())
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        })
        .collect()
}

fn is_relevant_event_kind(kind: &EventKind) -> bool {
    match kind {
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => true,
        EventKind::Access(_) => false,
        _ => true,
    }
}
