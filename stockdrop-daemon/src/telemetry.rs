//! Log output and optional Sentry error reporting.
//!
//! Logs go to stderr so one-shot commands keep stdout for their result.
//! When the `sentry_dsn` secret is readable, error-level events are also
//! reported to Sentry and lower levels are kept as breadcrumbs.

use stockdrop_core::{secrets, LogFormat, Settings};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::DaemonError;

const SERVER_NAME: &str = "stockdrop";

/// Holds the Sentry client for the life of the process. Dropping it flushes
/// pending events.
#[must_use = "dropping the guard turns error reporting off"]
pub struct TracingGuard {
    sentry: Option<sentry::ClientInitGuard>,
}

impl TracingGuard {
    pub fn error_reporting_enabled(&self) -> bool {
        self.sentry.as_ref().is_some_and(|guard| guard.is_enabled())
    }
}

/// Install the global tracing subscriber. Safe to call more than once; only
/// the first call installs anything.
pub fn init_tracing(settings: &Settings) -> TracingGuard {
    let reporting = start_error_reporting(settings);
    install_subscriber(settings.log_format, matches!(reporting, Ok(Some(_))));

    let sentry = match reporting {
        Ok(Some(guard)) => {
            tracing::info!("error reporting enabled");
            Some(guard)
        }
        Ok(None) => {
            tracing::info!("no sentry DSN secret configured; error reporting disabled");
            None
        }
        Err(err) => {
            tracing::info!(error = %err, "sentry DSN unavailable; error reporting disabled");
            None
        }
    };
    TracingGuard { sentry }
}

/// Start the Sentry client when the DSN secret is configured and readable.
pub fn start_error_reporting(
    settings: &Settings,
) -> Result<Option<sentry::ClientInitGuard>, DaemonError> {
    let Some(dsn) = secrets::load_sentry_dsn(settings)? else {
        return Ok(None);
    };
    let dsn: sentry::types::Dsn = dsn.parse()?;
    let guard = sentry::init(sentry::ClientOptions {
        dsn: Some(dsn),
        release: sentry::release_name!(),
        server_name: Some(SERVER_NAME.into()),
        ..Default::default()
    });
    Ok(Some(guard))
}

fn install_subscriber(format: LogFormat, report_errors: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (json, text) = match format {
        LogFormat::Json => (
            Some(fmt::layer().json().with_target(false).with_writer(std::io::stderr)),
            None,
        ),
        LogFormat::Text => (
            None,
            Some(fmt::layer().with_target(false).with_writer(std::io::stderr)),
        ),
    };
    let sentry = report_errors.then(|| sentry_tracing::layer());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .with(sentry)
        .try_init();
}
