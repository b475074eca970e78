//! Backend wire types
//!
//! Type definitions for the recorder's REST API entities. Identifiers are
//! opaque tokens; timestamps are UTC unless noted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::rules::ScheduleRule;

/// Outcome of the version handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingResult {
    /// Backend speaks the same API level
    Equal,
    /// Backend API level is lower than ours
    Older,
    /// Backend API level is higher than ours
    Newer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelType {
    Television,
    Radio,
}

impl ChannelType {
    pub fn as_path(&self) -> &'static str {
        match self {
            ChannelType::Television => "television",
            ChannelType::Radio => "radio",
        }
    }
}

/// What kind of schedule a rule set drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleType {
    Recording,
    Suggestion,
    Alert,
}

impl ScheduleType {
    pub fn as_path(&self) -> &'static str {
        match self {
            ScheduleType::Recording => "recording",
            ScheduleType::Suggestion => "suggestion",
            ScheduleType::Alert => "alert",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Channel {
    pub channel_id: String,
    pub display_name: String,
    pub channel_type: ChannelType,
    /// Links the channel to the program guide; channels without one
    /// have no guide data.
    #[serde(default)]
    pub guide_channel_id: Option<String>,
    #[serde(default)]
    pub logical_channel_number: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GuideProgram {
    pub guide_program_id: String,
    pub title: String,
    #[serde(default)]
    pub sub_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub stop_time: DateTime<Utc>,
    #[serde(default)]
    pub is_part_of_series: bool,
    #[serde(default)]
    pub is_repeat: bool,
    #[serde(default)]
    pub season_number: Option<i32>,
    #[serde(default)]
    pub episode_number: Option<i32>,
}

/// Persisted recording rule set, one per timer or series timer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Schedule {
    pub schedule_id: String,
    pub name: String,
    pub channel_type: ChannelType,
    pub schedule_type: ScheduleType,
    /// None means "use the recorder's default"
    #[serde(default)]
    pub pre_record_minutes: Option<u32>,
    #[serde(default)]
    pub post_record_minutes: Option<u32>,
    #[serde(default)]
    pub rules: Vec<ScheduleRule>,
}

/// One entry of the recorder's upcoming-recordings queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpcomingRecording {
    pub upcoming_program_id: String,
    pub schedule_id: String,
    pub title: String,
    pub channel: Channel,
    pub start_time: DateTime<Utc>,
    pub stop_time: DateTime<Utc>,
    #[serde(default)]
    pub guide_program_id: Option<String>,
    #[serde(default)]
    pub pre_record_seconds: Option<u32>,
    #[serde(default)]
    pub post_record_seconds: Option<u32>,
    #[serde(default)]
    pub is_cancelled: bool,
}

/// Which slice of the upcoming queue to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpcomingFilter {
    /// Only entries that will actually record
    Recordings,
    /// Everything, including cancelled entries
    All,
}

impl UpcomingFilter {
    pub fn as_path(&self) -> &'static str {
        match self {
            UpcomingFilter::Recordings => "recordings",
            UpcomingFilter::All => "all",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Recording {
    pub recording_id: String,
    pub channel_id: String,
    pub title: String,
    #[serde(default)]
    pub schedule_id: Option<String>,
    #[serde(default)]
    pub sub_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Local path of the recorded file; absent while the backend is
    /// still moving it into place.
    #[serde(default)]
    pub recording_file_name: Option<String>,
    pub recording_start_time: DateTime<Utc>,
    #[serde(default)]
    pub recording_stop_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingGroupMode {
    GroupByProgramTitle,
    GroupByChannel,
    GroupBySchedule,
}

impl RecordingGroupMode {
    pub fn as_path(&self) -> &'static str {
        match self {
            RecordingGroupMode::GroupByProgramTitle => "by-title",
            RecordingGroupMode::GroupByChannel => "by-channel",
            RecordingGroupMode::GroupBySchedule => "by-schedule",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordingGroup {
    pub program_title: String,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub schedule_id: Option<String>,
    #[serde(default)]
    pub recordings_count: u32,
}

/// Handle to a tuned live stream. Owned by the backend; the bridge only
/// signals liveness and requests stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LiveStream {
    pub rtsp_url: String,
    pub channel: Channel,
    #[serde(default)]
    pub stream_last_used_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TuneResultCode {
    Succeeded,
    NoFreeCardFound,
    ChannelTuneFailed,
    IsScrambled,
    Unknown,
}

impl std::fmt::Display for TuneResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TuneResultCode::Succeeded => "succeeded",
            TuneResultCode::NoFreeCardFound => "no free card found",
            TuneResultCode::ChannelTuneFailed => "channel tune failed",
            TuneResultCode::IsScrambled => "channel is scrambled",
            TuneResultCode::Unknown => "unknown error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TuneResult {
    pub result: TuneResultCode,
    #[serde(default)]
    pub stream: Option<LiveStream>,
}
