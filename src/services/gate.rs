//! Connection gate
//!
//! Validates configuration and performs the version handshake before any
//! backend call. The availability flag is an advisory cache: a stale
//! "available" costs one failed call before re-verification, a stale
//! "unavailable" costs one extra handshake round-trip. Read-after-write
//! staleness between concurrent operations is acceptable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::backend_call;
use crate::backend::{BackendClient, PingResult};
use crate::config::Config;
use crate::error::{Error, Result};

pub struct ConnectionGate {
    backend: Arc<dyn BackendClient>,
    server_address: String,
    server_port: u16,
    api_version: i32,
    available: AtomicBool,
}

impl ConnectionGate {
    pub fn new(backend: Arc<dyn BackendClient>, config: &Config, api_version: i32) -> Self {
        Self {
            backend,
            server_address: config.server_address.clone(),
            server_port: config.server_port,
            api_version,
            available: AtomicBool::new(false),
        }
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    /// Gate every backend operation.
    ///
    /// Fails fast on missing configuration. With a cached "available" this
    /// performs zero backend calls; otherwise it runs one ping handshake.
    /// A version mismatch is fatal for this call and leaves the bridge
    /// unavailable, so the next operation re-attempts the handshake. A
    /// transport fault during the ping is logged and swallowed: the
    /// operation itself will fail against the unavailable backend. Never
    /// retries.
    pub async fn ensure_connection(&self, cancel: &CancellationToken) -> Result<()> {
        if self.server_address.is_empty() || self.server_port == 0 {
            return Err(Error::Configuration(
                "backend server address and port must be configured".to_string(),
            ));
        }

        if self.available.load(Ordering::Relaxed) {
            return Ok(());
        }

        match backend_call(cancel, self.backend.ping(self.api_version)).await {
            Ok(PingResult::Equal) => {
                debug!("backend handshake ok (API level {})", self.api_version);
                self.available.store(true, Ordering::Relaxed);
                Ok(())
            }
            Ok(PingResult::Older) => {
                self.available.store(false, Ordering::Relaxed);
                error!(
                    "backend API level is older than {}; upgrade the backend",
                    self.api_version
                );
                Err(Error::VersionIncompatible(
                    "backend is older than this bridge".to_string(),
                ))
            }
            Ok(PingResult::Newer) => {
                self.available.store(false, Ordering::Relaxed);
                error!(
                    "backend API level is newer than {}; upgrade this bridge",
                    self.api_version
                );
                Err(Error::VersionIncompatible(
                    "backend is newer than this bridge".to_string(),
                ))
            }
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                // Non-fatal here; the gated operation will surface its own fault
                warn!("backend handshake failed: {}", e);
                Ok(())
            }
        }
    }
}
