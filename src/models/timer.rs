use chrono::{DateTime, Utc, Weekday};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Scheduled,
    InProgress,
    Cancelled,
}

/// A single scheduled recording as the host sees it.
///
/// Padding is in seconds; the backend counts minutes, and the translation
/// floors the sub-minute remainder away.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerRequest {
    pub id: String,
    pub channel_id: String,
    pub program_id: Option<String>,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub pre_padding_secs: u32,
    pub post_padding_secs: u32,
    pub status: TimerStatus,
}

/// A recurring scheduled recording as the host sees it.
///
/// `record_any_time` and `record_any_channel` are encoded toward the
/// backend purely by the absence of the corresponding rule.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTimerRequest {
    pub id: String,
    pub channel_id: String,
    pub program_id: Option<String>,
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub pre_padding_secs: u32,
    pub post_padding_secs: u32,
    pub days: Vec<Weekday>,
    pub record_new_only: bool,
    pub record_any_time: bool,
    pub record_any_channel: bool,
}
