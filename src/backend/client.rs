//! REST implementation of [`BackendClient`]
//!
//! Thin HTTP client over the recorder's JSON API. One generic helper per
//! verb; every trait method is a single round-trip.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};

use super::types::*;
use super::{BackendClient, BackendError};
use crate::config::Config;

/// REST client for the recorder backend
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct TuneRequest<'a> {
    channel: &'a Channel,
    profile: &'a str,
}

impl HttpBackend {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - Backend base URL (e.g., "http://recorder:49943")
    /// * `timeout_secs` - Per-request timeout
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_url(), config.request_timeout_secs)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        let url = format!("{}/{}", self.base_url, path);

        debug!("backend GET {}", path);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Http(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if text.is_empty() {
            return Err(BackendError::EmptyResponse);
        }

        serde_json::from_str(&text).map_err(|e| {
            error!("failed to parse backend response for '{}': {}", path, e);
            debug!("response text: {}", &text[..text.len().min(500)]);
            BackendError::Parse(e.to_string())
        })
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);

        debug!("backend POST {}", path);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Http(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if text.is_empty() {
            return Err(BackendError::EmptyResponse);
        }

        serde_json::from_str(&text).map_err(|e| {
            error!("failed to parse backend response for '{}': {}", path, e);
            BackendError::Parse(e.to_string())
        })
    }

    /// POST where only the status matters
    async fn post_unit<B>(&self, path: &str, body: &B) -> Result<(), BackendError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{}/{}", self.base_url, path);

        debug!("backend POST {}", path);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Http(status.as_u16()));
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), BackendError> {
        let url = format!("{}/{}", self.base_url, path);

        debug!("backend DELETE {}", path);

        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Http(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait]
impl BackendClient for HttpBackend {
    // ------------------------------------------------------------------
    // Core
    // ------------------------------------------------------------------

    async fn ping(&self, api_version: i32) -> Result<PingResult, BackendError> {
        // The backend answers signum(its level - ours)
        let result: i32 = self.get_json(&format!("core/ping/{}", api_version)).await?;
        Ok(match result {
            0 => PingResult::Equal,
            r if r < 0 => PingResult::Older,
            _ => PingResult::Newer,
        })
    }

    async fn server_version(&self) -> Result<String, BackendError> {
        self.get_json("core/version").await
    }

    async fn newer_version_available(&self) -> Result<Option<String>, BackendError> {
        self.get_json("core/newer-version").await
    }

    // ------------------------------------------------------------------
    // Scheduler
    // ------------------------------------------------------------------

    async fn get_all_channels(
        &self,
        channel_type: ChannelType,
    ) -> Result<Vec<Channel>, BackendError> {
        self.get_json(&format!("scheduler/channels/{}", channel_type.as_path()))
            .await
    }

    async fn get_channel_by_id(&self, channel_id: &str) -> Result<Channel, BackendError> {
        self.get_json(&format!(
            "scheduler/channel/{}",
            urlencoding::encode(channel_id)
        ))
        .await
    }

    async fn create_new_schedule(
        &self,
        channel_type: ChannelType,
        schedule_type: ScheduleType,
    ) -> Result<Schedule, BackendError> {
        self.get_json(&format!(
            "scheduler/schedule/new/{}/{}",
            channel_type.as_path(),
            schedule_type.as_path()
        ))
        .await
    }

    async fn save_schedule(&self, schedule: &Schedule) -> Result<(), BackendError> {
        self.post_unit("scheduler/schedule", schedule).await
    }

    async fn get_schedule_by_id(&self, schedule_id: &str) -> Result<Schedule, BackendError> {
        self.get_json(&format!(
            "scheduler/schedule/{}",
            urlencoding::encode(schedule_id)
        ))
        .await
    }

    async fn delete_schedule(&self, schedule_id: &str) -> Result<(), BackendError> {
        self.delete(&format!(
            "scheduler/schedule/{}",
            urlencoding::encode(schedule_id)
        ))
        .await
    }

    // ------------------------------------------------------------------
    // Guide
    // ------------------------------------------------------------------

    async fn get_channel_programs_between(
        &self,
        guide_channel_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<GuideProgram>, BackendError> {
        self.get_json(&format!(
            "guide/programs/{}?start={}&stop={}",
            urlencoding::encode(guide_channel_id),
            start.timestamp(),
            end.timestamp()
        ))
        .await
    }

    async fn get_program_by_id(&self, program_id: &str) -> Result<GuideProgram, BackendError> {
        self.get_json(&format!("guide/program/{}", urlencoding::encode(program_id)))
            .await
    }

    // ------------------------------------------------------------------
    // Control
    // ------------------------------------------------------------------

    async fn get_recording_groups(
        &self,
        channel_type: ChannelType,
        mode: RecordingGroupMode,
    ) -> Result<Vec<RecordingGroup>, BackendError> {
        self.get_json(&format!(
            "control/recording-groups/{}/{}",
            channel_type.as_path(),
            mode.as_path()
        ))
        .await
    }

    async fn get_full_recordings(
        &self,
        channel_type: ChannelType,
        program_title: Option<&str>,
        channel_id: Option<&str>,
    ) -> Result<Vec<Recording>, BackendError> {
        let mut path = format!("control/recordings/{}", channel_type.as_path());
        let mut sep = '?';
        if let Some(title) = program_title {
            path.push(sep);
            path.push_str(&format!("title={}", urlencoding::encode(title)));
            sep = '&';
        }
        if let Some(id) = channel_id {
            path.push(sep);
            path.push_str(&format!("channel={}", urlencoding::encode(id)));
        }
        self.get_json(&path).await
    }

    async fn get_recording_by_id(&self, recording_id: &str) -> Result<Recording, BackendError> {
        self.get_json(&format!(
            "control/recording/{}",
            urlencoding::encode(recording_id)
        ))
        .await
    }

    async fn delete_recording_by_id(&self, recording_id: &str) -> Result<(), BackendError> {
        self.delete(&format!(
            "control/recording/{}",
            urlencoding::encode(recording_id)
        ))
        .await
    }

    async fn get_all_upcoming_recordings(
        &self,
        filter: UpcomingFilter,
    ) -> Result<Vec<UpcomingRecording>, BackendError> {
        self.get_json(&format!("control/upcoming/{}", filter.as_path()))
            .await
    }

    async fn tune_live_stream(
        &self,
        channel: &Channel,
        profile: &str,
    ) -> Result<TuneResult, BackendError> {
        self.post_json("control/tune", &TuneRequest { channel, profile })
            .await
    }

    async fn get_live_streams(&self) -> Result<Vec<LiveStream>, BackendError> {
        self.get_json("control/streams").await
    }

    async fn keep_live_stream_alive(&self, stream: &LiveStream) -> Result<(), BackendError> {
        self.post_unit("control/stream/keepalive", stream).await
    }

    async fn stop_live_stream(&self, stream: &LiveStream) -> Result<(), BackendError> {
        self.post_unit("control/stream/stop", stream).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HttpBackend::new("http://recorder:49943/", 30);
        assert_eq!(client.base_url, "http://recorder:49943");
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            server_address: "recorder.local".to_string(),
            server_port: 49943,
            ..Config::default()
        };
        let client = HttpBackend::from_config(&config);
        assert_eq!(client.base_url, "http://recorder.local:49943");
    }
}
