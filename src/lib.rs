//! `honeyhive-logger` is a stateless async client for the HoneyHive
//! sessions and events API.
//!
//! Three operations, each one self-contained HTTPS round-trip with retries:
//! - [`start`] opens a session and returns its id
//! - [`log`] records an event and returns its id
//! - [`update`] attaches feedback, metrics or outputs to an event or session
//!
//! Unset options fall back to the `HH_API_KEY`, `HH_PROJECT`, `HH_SOURCE`
//! and `HH_API_URL` environment variables. Failures are logged through
//! `tracing` and reported as an absent result unless
//! `RetryConfig::verbose` is set, in which case they are returned as
//! [`LoggerError`].
//!
//! ```no_run
//! use honeyhive_logger::{log, start, LogOptions, StartOptions};
//!
//! # async fn run() -> honeyhive_logger::Result<()> {
//! let session_id = start(StartOptions {
//!     project: Some("my-project".to_owned()),
//!     ..StartOptions::default()
//! })
//! .await?;
//!
//! log(LogOptions {
//!     session_id,
//!     event_name: Some("retrieve-docs".to_owned()),
//!     ..LogOptions::default()
//! })
//! .await?;
//! # Ok(())
//! # }
//! ```

mod backoff;
mod env;
mod error;
mod executor;
mod logger;
mod options;
mod retry;
mod transport;
mod wire;

pub use backoff::{backoff_delay, with_jitter};
pub use env::Environment;
pub use error::{ErrorKind, LoggerError};
pub use executor::run_attempt;
pub use logger::{
    log, log_with, start, start_with, update, update_with, DEFAULT_DURATION_MS,
    DEFAULT_SERVER_URL, DEFAULT_SOURCE, MANAGED_KEY_PREFIX,
};
pub use options::{EventType, LogOptions, RetryConfig, StartOptions, UpdateOptions};
pub use retry::{execute_with_retry, AttemptOutcome};
pub use transport::{HttpTransport, RequestDescriptor, Transport, TransportResponse};

pub type Result<T> = std::result::Result<T, LoggerError>;
