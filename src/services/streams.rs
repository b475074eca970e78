//! Stream session manager
//!
//! Tunes live channel streams, resolves recording playback paths and stops
//! open streams. The backend is the source of truth for "currently open":
//! no client-side registry is kept, so closing looks the stream up by its
//! owning channel id on every call.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::backend_call;
use super::gate::ConnectionGate;
use crate::backend::{BackendClient, TuneResultCode};
use crate::error::{Error, Result};
use crate::models::StreamSession;

pub struct StreamService {
    backend: Arc<dyn BackendClient>,
    gate: Arc<ConnectionGate>,
    streaming_profile: String,
}

impl StreamService {
    pub fn new(
        backend: Arc<dyn BackendClient>,
        gate: Arc<ConnectionGate>,
        streaming_profile: &str,
    ) -> Self {
        Self {
            backend,
            gate,
            streaming_profile: streaming_profile.to_string(),
        }
    }

    /// Tune a live stream for the channel. Any tune failure or non-success
    /// tune result surfaces as [`Error::StreamUnavailable`] naming the
    /// channel; no session is handed out in that case.
    pub async fn open_channel_stream(
        &self,
        channel_id: &str,
        cancel: &CancellationToken,
    ) -> Result<StreamSession> {
        self.gate.ensure_connection(cancel).await?;

        let unavailable = |cause: &str| {
            warn!("channel {} unavailable: {}", channel_id, cause);
            Error::StreamUnavailable(format!("channel {channel_id}: {cause}"))
        };

        let channel = backend_call(cancel, self.backend.get_channel_by_id(channel_id))
            .await
            .map_err(|e| match e {
                Error::Transport(cause) => unavailable(&cause.to_string()),
                other => other,
            })?;

        let tune = backend_call(
            cancel,
            self.backend
                .tune_live_stream(&channel, &self.streaming_profile),
        )
        .await
        .map_err(|e| match e {
            Error::Transport(cause) => unavailable(&cause.to_string()),
            other => other,
        })?;

        match (tune.result, tune.stream) {
            (TuneResultCode::Succeeded, Some(stream)) => {
                info!(
                    "tuned channel {} at {}",
                    channel_id, stream.rtsp_url
                );
                Ok(StreamSession::live(channel_id, stream))
            }
            (code, _) => Err(unavailable(&code.to_string())),
        }
    }

    /// Resolve a completed recording to its local file path
    pub async fn open_recording_stream(
        &self,
        recording_id: &str,
        cancel: &CancellationToken,
    ) -> Result<StreamSession> {
        self.gate.ensure_connection(cancel).await?;

        let recording = backend_call(cancel, self.backend.get_recording_by_id(recording_id))
            .await
            .map_err(|e| match e {
                Error::Transport(cause) => {
                    warn!("recording {} unavailable: {}", recording_id, cause);
                    Error::StreamUnavailable(format!("recording {recording_id}: {cause}"))
                }
                other => other,
            })?;

        match recording.recording_file_name.as_deref() {
            Some(path) => {
                debug!("recording {} resolves to {}", recording_id, path);
                Ok(StreamSession::recorded(recording_id, path))
            }
            None => Err(Error::StreamUnavailable(format!(
                "recording {recording_id}: no file registered yet"
            ))),
        }
    }

    /// Stop the single open stream owned by this channel id. The open-stream
    /// list comes from the backend on every close; zero or multiple matches
    /// fail rather than guessing.
    pub async fn close_stream(&self, channel_id: &str, cancel: &CancellationToken) -> Result<()> {
        self.gate.ensure_connection(cancel).await?;

        let streams = backend_call(cancel, self.backend.get_live_streams())
            .await
            .map_err(|e| match e {
                Error::Transport(cause) => {
                    Error::StreamUnavailable(format!("channel {channel_id}: {cause}"))
                }
                other => other,
            })?;

        let mut matches: Vec<_> = streams
            .into_iter()
            .filter(|s| s.channel.channel_id == channel_id)
            .collect();

        match matches.len() {
            1 => {
                let stream = matches.remove(0);
                info!("stopping stream for channel {}", channel_id);
                backend_call(cancel, self.backend.stop_live_stream(&stream))
                    .await
                    .map_err(|e| match e {
                        Error::Transport(cause) => {
                            Error::StreamUnavailable(format!("channel {channel_id}: {cause}"))
                        }
                        other => other,
                    })
            }
            n => Err(Error::StreamUnavailable(format!(
                "channel {channel_id}: {n} open streams"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::backend::types::{Recording, TuneResult};
    use crate::config::Config;
    use crate::models::StreamTransport;

    fn service(backend: Arc<MockBackend>) -> StreamService {
        let config = Config {
            server_address: "recorder.local".to_string(),
            ..Config::default()
        };
        let gate = Arc::new(ConnectionGate::new(backend.clone(), &config, 66));
        StreamService::new(backend, gate, &config.streaming_profile)
    }

    #[tokio::test]
    async fn test_open_channel_stream_returns_rtsp_session() {
        let backend = Arc::new(MockBackend::new());
        backend
            .channels
            .lock()
            .unwrap()
            .push(MockBackend::channel("ch-7", "Seven"));
        let service = service(backend);

        let session = service
            .open_channel_stream("ch-7", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(session.source_id, "ch-7");
        assert!(matches!(
            session.transport,
            StreamTransport::Rtsp { ref url } if url == "rtsp://recorder/stream/ch-7"
        ));
        assert!(session.handle.is_some());
    }

    #[tokio::test]
    async fn test_failed_tune_names_the_channel() {
        let backend = Arc::new(MockBackend::new());
        backend
            .channels
            .lock()
            .unwrap()
            .push(MockBackend::channel("ch-7", "Seven"));
        *backend.tune_response.lock().unwrap() = Some(TuneResult {
            result: TuneResultCode::ChannelTuneFailed,
            stream: None,
        });
        let service = service(backend);

        let err = service
            .open_channel_stream("ch-7", &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            Error::StreamUnavailable(what) => assert!(what.contains("ch-7")),
            other => panic!("expected StreamUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tune_success_without_stream_is_unavailable() {
        let backend = Arc::new(MockBackend::new());
        backend
            .channels
            .lock()
            .unwrap()
            .push(MockBackend::channel("ch-7", "Seven"));
        *backend.tune_response.lock().unwrap() = Some(TuneResult {
            result: TuneResultCode::Succeeded,
            stream: None,
        });
        let service = service(backend);

        let err = service
            .open_channel_stream("ch-7", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_open_recording_stream_uses_file_path() {
        let backend = Arc::new(MockBackend::new());
        backend.recordings.lock().unwrap().push(Recording {
            recording_id: "rec-1".to_string(),
            channel_id: "ch-7".to_string(),
            title: "Evening News".to_string(),
            schedule_id: None,
            sub_title: None,
            description: None,
            recording_file_name: Some("/store/news.ts".to_string()),
            recording_start_time: MockBackend::at(19),
            recording_stop_time: Some(MockBackend::at(20)),
        });
        let service = service(backend);

        let session = service
            .open_recording_stream("rec-1", &CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(
            session.transport,
            StreamTransport::File { ref path, ref container }
                if path == "/store/news.ts" && container == "ts"
        ));
        assert!(session.handle.is_none());
    }

    #[tokio::test]
    async fn test_unresolvable_recording_is_unavailable() {
        let backend = Arc::new(MockBackend::new());
        let service = service(backend);

        let err = service
            .open_recording_stream("rec-missing", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_close_stream_stops_single_match() {
        let backend = Arc::new(MockBackend::new());
        backend
            .live_streams
            .lock()
            .unwrap()
            .extend([MockBackend::live_stream("ch-7"), MockBackend::live_stream("ch-9")]);
        let service = service(backend.clone());

        service
            .close_stream("ch-7", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(*backend.stopped.lock().unwrap(), vec!["ch-7".to_string()]);
    }

    #[tokio::test]
    async fn test_close_stream_rejects_zero_and_multiple_matches() {
        let backend = Arc::new(MockBackend::new());
        let service = service(backend.clone());
        let cancel = CancellationToken::new();

        let err = service.close_stream("ch-7", &cancel).await.unwrap_err();
        assert!(matches!(err, Error::StreamUnavailable(_)));

        backend
            .live_streams
            .lock()
            .unwrap()
            .extend([MockBackend::live_stream("ch-7"), MockBackend::live_stream("ch-7")]);
        let err = service.close_stream("ch-7", &cancel).await.unwrap_err();
        assert!(matches!(err, Error::StreamUnavailable(_)));
        assert!(backend.stopped.lock().unwrap().is_empty());
    }
}
