//! Stockdrop daemon: directory watch, debounce, probe, upload queue and
//! retention sweeps.

pub mod debounce;
mod error;
pub mod probe;
pub mod retention;
mod runtime;
mod telemetry;
pub mod watch;

pub use debounce::{Debouncer, RawEventOutcome};
pub use error::DaemonError;
pub use probe::probe;
pub use retention::{is_expired, sweep_at, SweepReport};
pub use runtime::{connect_remote, run, run_with_context, start_blocking};
pub use telemetry::{init_tracing, start_error_reporting, TracingGuard};
pub use watch::{RawEvent, WatchSubscription};
