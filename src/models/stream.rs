use crate::backend::types::LiveStream;

/// How the host should open the stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamTransport {
    Rtsp { url: String },
    File { path: String, container: String },
}

/// One tuned live or recording stream.
///
/// The backend owns the stream's lifetime; this bridge only signals
/// liveness through the keep-alive loop and requests stop. `handle` is the
/// token those two operations need, present only for live streams.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSession {
    /// Owning channel or recording identifier
    pub source_id: String,
    pub transport: StreamTransport,
    pub handle: Option<LiveStream>,
}

impl StreamSession {
    pub fn live(channel_id: &str, stream: LiveStream) -> Self {
        Self {
            source_id: channel_id.to_string(),
            transport: StreamTransport::Rtsp {
                url: stream.rtsp_url.clone(),
            },
            handle: Some(stream),
        }
    }

    pub fn recorded(recording_id: &str, path: &str) -> Self {
        Self {
            source_id: recording_id.to_string(),
            transport: StreamTransport::File {
                path: path.to_string(),
                container: "ts".to_string(),
            },
            handle: None,
        }
    }
}
