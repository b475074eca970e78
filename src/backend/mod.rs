//! Recorder backend integration
//!
//! The recorder exposes four logical services over one blocking
//! request/response transport:
//!
//! - **Core**: version handshake
//! - **Scheduler**: channels and rule-based schedules
//! - **Guide**: program guide data
//! - **Control**: recordings and live-stream tuning/keep-alive/stop
//!
//! [`BackendClient`] is the seam the rest of the crate talks through;
//! [`client::HttpBackend`] is the shipped REST implementation.

pub mod client;
pub mod rules;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

pub use client::HttpBackend;
pub use rules::{DaysOfWeek, ScheduleRule};
pub use types::{
    Channel, ChannelType, GuideProgram, LiveStream, PingResult, Recording, RecordingGroup,
    RecordingGroupMode, Schedule, ScheduleType, TuneResult, TuneResultCode, UpcomingFilter,
    UpcomingRecording,
};

/// Transport-level backend error
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("empty response")]
    EmptyResponse,
}

/// RPC surface of the recorder. All calls are single round-trips; the
/// transport owns timeouts.
#[async_trait]
pub trait BackendClient: Send + Sync {
    // ------------------------------------------------------------------
    // Core
    // ------------------------------------------------------------------

    /// Version handshake: compares `api_version` against the backend's own
    async fn ping(&self, api_version: i32) -> Result<PingResult, BackendError>;

    async fn server_version(&self) -> Result<String, BackendError>;

    /// Some, with a version descriptor, when the backend vendor published
    /// a newer release than the one running
    async fn newer_version_available(&self) -> Result<Option<String>, BackendError>;

    // ------------------------------------------------------------------
    // Scheduler
    // ------------------------------------------------------------------

    async fn get_all_channels(&self, channel_type: ChannelType)
        -> Result<Vec<Channel>, BackendError>;

    async fn get_channel_by_id(&self, channel_id: &str) -> Result<Channel, BackendError>;

    /// Fresh schedule template with backend-required scalar fields populated
    async fn create_new_schedule(
        &self,
        channel_type: ChannelType,
        schedule_type: ScheduleType,
    ) -> Result<Schedule, BackendError>;

    async fn save_schedule(&self, schedule: &Schedule) -> Result<(), BackendError>;

    async fn get_schedule_by_id(&self, schedule_id: &str) -> Result<Schedule, BackendError>;

    async fn delete_schedule(&self, schedule_id: &str) -> Result<(), BackendError>;

    // ------------------------------------------------------------------
    // Guide
    // ------------------------------------------------------------------

    async fn get_channel_programs_between(
        &self,
        guide_channel_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<GuideProgram>, BackendError>;

    async fn get_program_by_id(&self, program_id: &str) -> Result<GuideProgram, BackendError>;

    // ------------------------------------------------------------------
    // Control
    // ------------------------------------------------------------------

    async fn get_recording_groups(
        &self,
        channel_type: ChannelType,
        mode: RecordingGroupMode,
    ) -> Result<Vec<RecordingGroup>, BackendError>;

    async fn get_full_recordings(
        &self,
        channel_type: ChannelType,
        program_title: Option<&str>,
        channel_id: Option<&str>,
    ) -> Result<Vec<Recording>, BackendError>;

    async fn get_recording_by_id(&self, recording_id: &str) -> Result<Recording, BackendError>;

    async fn delete_recording_by_id(&self, recording_id: &str) -> Result<(), BackendError>;

    async fn get_all_upcoming_recordings(
        &self,
        filter: UpcomingFilter,
    ) -> Result<Vec<UpcomingRecording>, BackendError>;

    async fn tune_live_stream(
        &self,
        channel: &Channel,
        profile: &str,
    ) -> Result<TuneResult, BackendError>;

    /// All streams the backend currently has open, bridge-initiated or not
    async fn get_live_streams(&self) -> Result<Vec<LiveStream>, BackendError>;

    async fn keep_live_stream_alive(&self, stream: &LiveStream) -> Result<(), BackendError>;

    async fn stop_live_stream(&self, stream: &LiveStream) -> Result<(), BackendError>;
}
