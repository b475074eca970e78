use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
    pub number: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramInfo {
    pub id: String,
    pub channel_id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub overview: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_series: bool,
    pub is_repeat: bool,
    pub season_number: Option<i32>,
    pub episode_number: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordingInfo {
    pub id: String,
    pub channel_id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub overview: Option<String>,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// Local path of the recorded file, when the backend has finished
    /// moving it into place
    pub path: Option<String>,
}
