//! Service layer
//!
//! `gate` guards every backend call behind the version handshake, `rules`
//! is the pure timer ⇄ schedule-rule translation, `schedules` and `streams`
//! orchestrate the two against the backend, and `keepalive` is the
//! background heartbeat over open live streams.

pub mod gate;
pub mod keepalive;
pub mod rules;
pub mod schedules;
pub mod streams;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::backend::BackendError;
use crate::error::{Error, Result};

/// Race one backend call against the caller's cancellation signal.
///
/// Cancellation wins ties, so a cancelled operation aborts before the
/// remote call is acknowledged whenever possible.
pub(crate) async fn backend_call<T>(
    cancel: &CancellationToken,
    call: impl Future<Output = std::result::Result<T, BackendError>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        outcome = call => outcome.map_err(Error::from),
    }
}
