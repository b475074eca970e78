//! Live-stream keep-alive loop
//!
//! The backend reclaims idle live streams; this task signals liveness for
//! every currently open stream on a fixed cadence for the lifetime of the
//! bridge. It is a best-effort heartbeat, not a reliability mechanism:
//! faults are logged and the loop carries on without backoff.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::gate::ConnectionGate;
use crate::backend::BackendClient;

/// Configuration for the keep-alive task
pub struct KeepAliveConfig {
    /// Seconds between heartbeats
    pub interval_secs: u64,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

/// Owner handle for the running task; dropping it does not stop the loop,
/// call [`KeepAliveHandle::shutdown`] on bridge teardown.
pub struct KeepAliveHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl KeepAliveHandle {
    pub async fn shutdown(self) {
        self.token.cancel();
        let _ = self.task.await;
    }
}

/// Start the background keep-alive task
///
/// Must be called within a tokio runtime. The loop runs until the returned
/// handle is shut down.
pub fn start_keepalive_task(
    backend: Arc<dyn BackendClient>,
    gate: Arc<ConnectionGate>,
    config: KeepAliveConfig,
) -> KeepAliveHandle {
    let token = CancellationToken::new();
    let loop_token = token.clone();

    let task = tokio::spawn(async move {
        info!(
            "starting keep-alive task (interval: {}s)",
            config.interval_secs
        );

        let mut interval = time::interval(Duration::from_secs(config.interval_secs));

        loop {
            tokio::select! {
                _ = loop_token.cancelled() => {
                    info!("keep-alive task stopped");
                    return;
                }
                _ = interval.tick() => {}
            }

            keepalive_tick(backend.as_ref(), &gate, &loop_token).await;
        }
    });

    KeepAliveHandle { token, task }
}

/// One heartbeat: enumerate open streams and signal each. A fault on one
/// stream does not affect the others.
pub(crate) async fn keepalive_tick(
    backend: &dyn BackendClient,
    gate: &ConnectionGate,
    cancel: &CancellationToken,
) {
    if let Err(e) = gate.ensure_connection(cancel).await {
        warn!("keep-alive skipped: {}", e);
        return;
    }

    let streams = match backend.get_live_streams().await {
        Ok(streams) => streams,
        Err(e) => {
            warn!("keep-alive could not enumerate streams: {}", e);
            return;
        }
    };

    for stream in &streams {
        if let Err(e) = backend.keep_live_stream_alive(stream).await {
            warn!(
                "keep-alive failed for channel {}: {}",
                stream.channel.channel_id, e
            );
        } else {
            debug!("kept channel {} alive", stream.channel.channel_id);
        }
    }
}
