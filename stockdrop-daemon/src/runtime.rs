use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::{broadcast, mpsc};

use stockdrop_core::{secrets, Filename, ReadyFile, Settings};
use stockdrop_upload::{RemoteFiles, ShopifyFiles, UploadContext, UploadOptions};

use crate::debounce::Debouncer;
use crate::error::{io_err, DaemonError};
use crate::probe::probe;
use crate::retention::sweep_at;
use crate::telemetry::init_tracing;
use crate::watch::WatchSubscription;

/// Ready files waiting for the upload processor.
const UPLOAD_QUEUE_CAPACITY: usize = 64;

/// Start the daemon runtime and block the current thread until it exits.
pub fn start_blocking(settings: Settings) -> Result<(), DaemonError> {
    let _telemetry = init_tracing(&settings);
    settings.validate()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(settings))
}

/// Run the daemon: watcher, upload processor, retention sweeper and ctrl-c
/// handler. Any task ending shuts the others down.
pub async fn run(settings: Settings) -> Result<(), DaemonError> {
    ensure_watch_dir(&settings.watch_dir)?;
    let context = UploadContext::new(connect_remote(&settings), UploadOptions::from_settings(&settings));
    run_with_context(settings, context).await
}

/// [`run`] with a caller-supplied upload context.
pub async fn run_with_context<R>(
    settings: Settings,
    context: UploadContext<R>,
) -> Result<(), DaemonError>
where
    R: RemoteFiles + 'static,
{
    let settings = Arc::new(settings);
    let (ready_tx, ready_rx) = mpsc::channel::<ReadyFile>(UPLOAD_QUEUE_CAPACITY);
    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    tracing::info!(
        path = %settings.watch_dir.display(),
        debounce_ms = settings.debounce_ms,
        retention_days = settings.retention_days,
        "stockdrop daemon starting"
    );

    let watcher_handle = {
        let shutdown = shutdown_tx.clone();
        let settings = settings.clone();
        tokio::spawn(async move {
            let result = watcher_task(settings, ready_tx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let upload_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let result = upload_processor_task(context, ready_rx, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let sweeper_handle = {
        let shutdown = shutdown_tx.clone();
        let settings = settings.clone();
        tokio::spawn(async move {
            let result = sweeper_task(settings, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down daemon");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Runtime(format!("ctrl-c handler failed: {err}"))),
                    }
                }
            }
        })
    };

    let (watcher_result, upload_result, sweeper_result, signal_result) =
        tokio::join!(watcher_handle, upload_handle, sweeper_handle, signal_handle);

    handle_join("watcher", watcher_result)?;
    handle_join("upload_processor", upload_result)?;
    handle_join("sweeper", sweeper_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

/// Raw events → debouncer → probe → upload queue.
pub(crate) async fn watcher_task(
    settings: Arc<Settings>,
    ready_tx: mpsc::Sender<ReadyFile>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let mut subscription = WatchSubscription::subscribe(&settings.watch_dir)?;
    let mut debouncer = Debouncer::new(settings.debounce_window(), settings.temp_prefix.clone());
    tracing::info!(path = %subscription.dir().display(), "watching directory");

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            event = subscription.next() => {
                let Some(event) = event else { break };
                match event.filename {
                    Some(name) => {
                        debouncer.on_raw_event(Filename::from(name));
                    }
                    None => tracing::info!("change detected but no filename provided"),
                }
            }
            stabilized = debouncer.next_stabilized() => {
                let Some(filename) = stabilized else { break };
                let Some(ready) = probe(&settings.watch_dir, &filename).await else {
                    continue;
                };
                // The processor only drops the queue on shutdown.
                if ready_tx.send(ready).await.is_err() {
                    tracing::debug!(filename = %filename, "upload queue closed; stopping watcher");
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Sole owner of the upload context; attempts run one at a time in arrival order.
pub(crate) async fn upload_processor_task<R: RemoteFiles>(
    mut context: UploadContext<R>,
    mut ready_rx: mpsc::Receiver<ReadyFile>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            ready = ready_rx.recv() => {
                let Some(ready) = ready else { break };
                let filename = ready.filename.clone();
                let outcome = context.handle(ready).await;
                tracing::debug!(filename = %filename, outcome = ?outcome, "upload attempt finished");
            }
        }
    }
    Ok(())
}

/// Sweep once at startup, then on every interval tick.
async fn sweeper_task(
    settings: Arc<Settings>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    let mut interval = tokio::time::interval(settings.sweep_interval());
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = interval.tick() => {
                tracing::info!("starting periodic cleanup job");
                match sweep_at(&settings.watch_dir, settings.retention_age(), SystemTime::now(), false).await {
                    Ok(report) => tracing::info!(
                        examined = report.examined,
                        deleted = report.deleted.len(),
                        failed = report.failed,
                        "cleanup finished"
                    ),
                    // Retried on the next tick.
                    Err(err) => tracing::error!(error = %err, "cleanup failed"),
                }
            }
        }
    }
    Ok(())
}

/// Build the remote client, or `None` (logged) when credentials are unavailable.
pub fn connect_remote(settings: &Settings) -> Option<ShopifyFiles> {
    let credentials = match secrets::load_credentials(settings) {
        Ok(credentials) => credentials,
        Err(err) => {
            tracing::error!(error = %err, "could not load remote credentials; uploads are disabled");
            return None;
        }
    };
    match ShopifyFiles::new(&credentials, &settings.shopify.api_version) {
        Ok(remote) => {
            tracing::info!(endpoint = %remote.endpoint(), "remote client initialized");
            Some(remote)
        }
        Err(err) => {
            tracing::error!(error = %err, "could not build remote client; uploads are disabled");
            None
        }
    }
}

fn ensure_watch_dir(dir: &Path) -> Result<(), DaemonError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    Ok(())
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Runtime(format!(
            "{task} task join failure: {err}"
        ))),
    }
}
