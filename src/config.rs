use std::env;

/// API level this bridge speaks. The backend must answer the handshake
/// with the same level.
pub const SUPPORTED_API_VERSION: i32 = 66;

/// Bridge configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Backend endpoint
    pub server_address: String,
    pub server_port: u16,

    // Transport
    pub request_timeout_secs: u64,

    // Scheduling defaults (seconds)
    pub default_pre_padding_secs: u32,
    pub default_post_padding_secs: u32,

    // Streaming
    pub streaming_profile: String,
    pub keepalive_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            server_address: env::var("LIVETV_SERVER_ADDRESS").unwrap_or_default(),
            server_port: env::var("LIVETV_SERVER_PORT")
                .unwrap_or_else(|_| "49943".to_string())
                .parse()
                .unwrap_or(49943),

            request_timeout_secs: env::var("LIVETV_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),

            default_pre_padding_secs: env::var("LIVETV_PRE_PADDING_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
            default_post_padding_secs: env::var("LIVETV_POST_PADDING_SECS")
                .unwrap_or_else(|_| "600".to_string())
                .parse()
                .unwrap_or(600),

            streaming_profile: env::var("LIVETV_STREAMING_PROFILE")
                .unwrap_or_else(|_| "High Quality".to_string()),
            keepalive_interval_secs: env::var("LIVETV_KEEPALIVE_INTERVAL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
        }
    }

    /// Base URL of the backend REST API (e.g., "http://recorder:49943")
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.server_address, self.server_port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_address: String::new(),
            server_port: 49943,
            request_timeout_secs: 30,
            default_pre_padding_secs: 60,
            default_post_padding_secs: 600,
            streaming_profile: "High Quality".to_string(),
            keepalive_interval_secs: 30,
        }
    }
}
