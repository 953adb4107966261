//! Confirms a stabilized filename still names a regular file.

use std::io::ErrorKind;
use std::path::Path;

use stockdrop_core::{Filename, ReadyFile};

/// Look up `dir/filename`. Anything other than an existing regular file is
/// treated as absent; a vanished file is the expected race and is only
/// reported at info level.
pub async fn probe(dir: &Path, filename: &Filename) -> Option<ReadyFile> {
    let path = dir.join(filename.as_str());
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {
            tracing::info!(filename = %filename, size = meta.len(), "detected new file");
            Some(ReadyFile {
                filename: filename.clone(),
                path,
                size: meta.len(),
            })
        }
        Ok(_) => {
            tracing::debug!(filename = %filename, "not a regular file; skipping");
            None
        }
        Err(err) if err.kind() == ErrorKind::NotFound => {
            tracing::info!(filename = %filename, "file was deleted or renamed");
            None
        }
        Err(err) => {
            tracing::error!(filename = %filename, error = %err, "error accessing file");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::{Arc, Mutex};

    use tempfile::TempDir;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    /// Records the level and message of every event.
    #[derive(Clone, Default)]
    struct CapturedEvents(Arc<Mutex<Vec<(Level, String)>>>);

    impl CapturedEvents {
        fn at(&self, level: Level) -> Vec<String> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, message)| message.clone())
                .collect()
        }
    }

    struct MessageVisitor(String);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for CapturedEvents {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.0
                .lock()
                .unwrap()
                .push((*event.metadata().level(), visitor.0));
        }
    }

    fn capture() -> (CapturedEvents, tracing::subscriber::DefaultGuard) {
        let events = CapturedEvents::default();
        let subscriber = tracing_subscriber::registry().with(events.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (events, guard)
    }

    #[tokio::test]
    async fn regular_file_is_ready_with_size() {
        let dir = TempDir::new().expect("dir");
        std::fs::write(dir.path().join("a.csv"), "sku,qty\n").expect("write");

        let ready = probe(dir.path(), &"a.csv".into()).await.expect("ready");
        assert_eq!(ready.filename, Filename::from("a.csv"));
        assert_eq!(ready.path, dir.path().join("a.csv"));
        assert_eq!(ready.size, 8);
    }

    #[tokio::test]
    async fn vanished_file_is_absent() {
        let dir = TempDir::new().expect("dir");
        assert!(probe(dir.path(), &"gone.csv".into()).await.is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn vanished_file_is_logged_as_info_only() {
        let dir = TempDir::new().expect("dir");
        let (events, _guard) = capture();

        assert!(probe(dir.path(), &"gone.csv".into()).await.is_none());

        assert_eq!(events.at(Level::INFO), ["file was deleted or renamed"]);
        assert!(events.at(Level::ERROR).is_empty(), "a vanished file is not a failure");
        assert!(events.at(Level::WARN).is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn other_lookup_failure_is_logged_as_error() {
        let dir = TempDir::new().expect("dir");
        std::fs::write(dir.path().join("file.txt"), "x").expect("write");
        let (events, _guard) = capture();

        // `file.txt/child` fails with "not a directory", not NotFound.
        let ready = probe(&dir.path().join("file.txt"), &"child".into()).await;

        assert!(ready.is_none());
        assert_eq!(events.at(Level::ERROR), ["error accessing file"]);
        assert!(events.at(Level::INFO).is_empty());
    }

    #[tokio::test]
    async fn directory_is_absent() {
        let dir = TempDir::new().expect("dir");
        std::fs::create_dir(dir.path().join("nested")).expect("mkdir");
        assert!(probe(dir.path(), &"nested".into()).await.is_none());
    }
}
