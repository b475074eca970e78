//! Scriptable in-memory backend for unit tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use super::types::*;
use super::{BackendClient, BackendError};

fn fault() -> BackendError {
    BackendError::Network("connection refused".to_string())
}

/// Backend stand-in with scripted responses and call recording
pub(crate) struct MockBackend {
    /// Fail every call with a transport fault
    pub fail_all: AtomicBool,
    /// Fail only `get_live_streams`
    pub fail_streams: AtomicBool,

    pub ping_response: Mutex<Result<PingResult, ()>>,
    pub ping_calls: AtomicUsize,

    pub channels: Mutex<Vec<Channel>>,
    pub schedules: Mutex<Vec<Schedule>>,
    pub saved_schedules: Mutex<Vec<Schedule>>,
    pub deleted_schedules: Mutex<Vec<String>>,
    pub new_schedule_calls: AtomicUsize,

    pub programs: Mutex<Vec<GuideProgram>>,
    pub upcoming: Mutex<Vec<UpcomingRecording>>,

    pub recordings: Mutex<Vec<Recording>>,
    pub recording_groups: Mutex<Vec<RecordingGroup>>,
    pub deleted_recordings: Mutex<Vec<String>>,

    pub tune_response: Mutex<Option<TuneResult>>,
    pub live_streams: Mutex<Vec<LiveStream>>,
    pub kept_alive: Mutex<Vec<String>>,
    pub stopped: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            fail_all: AtomicBool::new(false),
            fail_streams: AtomicBool::new(false),
            ping_response: Mutex::new(Ok(PingResult::Equal)),
            ping_calls: AtomicUsize::new(0),
            channels: Mutex::new(Vec::new()),
            schedules: Mutex::new(Vec::new()),
            saved_schedules: Mutex::new(Vec::new()),
            deleted_schedules: Mutex::new(Vec::new()),
            new_schedule_calls: AtomicUsize::new(0),
            programs: Mutex::new(Vec::new()),
            upcoming: Mutex::new(Vec::new()),
            recordings: Mutex::new(Vec::new()),
            recording_groups: Mutex::new(Vec::new()),
            deleted_recordings: Mutex::new(Vec::new()),
            tune_response: Mutex::new(None),
            live_streams: Mutex::new(Vec::new()),
            kept_alive: Mutex::new(Vec::new()),
            stopped: Mutex::new(Vec::new()),
        }
    }

    fn check(&self) -> Result<(), BackendError> {
        if self.fail_all.load(Ordering::SeqCst) {
            Err(fault())
        } else {
            Ok(())
        }
    }

    // ------------------------------------------------------------------
    // Fixture helpers
    // ------------------------------------------------------------------

    pub fn channel(id: &str, name: &str) -> Channel {
        Channel {
            channel_id: id.to_string(),
            display_name: name.to_string(),
            channel_type: ChannelType::Television,
            guide_channel_id: Some(format!("guide-{id}")),
            logical_channel_number: None,
        }
    }

    pub fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, h, 0, 0).unwrap()
    }

    pub fn upcoming_recording(id: &str, schedule_id: &str, channel_id: &str) -> UpcomingRecording {
        UpcomingRecording {
            upcoming_program_id: id.to_string(),
            schedule_id: schedule_id.to_string(),
            title: format!("Program {id}"),
            channel: Self::channel(channel_id, "Channel"),
            start_time: Self::at(20),
            stop_time: Self::at(21),
            guide_program_id: Some(format!("prog-{id}")),
            pre_record_seconds: Some(60),
            post_record_seconds: Some(120),
            is_cancelled: false,
        }
    }

    pub fn series_program(id: &str) -> GuideProgram {
        GuideProgram {
            guide_program_id: id.to_string(),
            title: format!("Program {id}"),
            sub_title: None,
            description: None,
            start_time: Self::at(20),
            stop_time: Self::at(21),
            is_part_of_series: true,
            is_repeat: false,
            season_number: None,
            episode_number: None,
        }
    }

    pub fn live_stream(channel_id: &str) -> LiveStream {
        LiveStream {
            rtsp_url: format!("rtsp://recorder/stream/{channel_id}"),
            channel: Self::channel(channel_id, "Channel"),
            stream_last_used_time: None,
        }
    }
}

#[async_trait]
impl BackendClient for MockBackend {
    async fn ping(&self, _api_version: i32) -> Result<PingResult, BackendError> {
        self.ping_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let response = *self.ping_response.lock().unwrap();
        response.map_err(|_| fault())
    }

    async fn server_version(&self) -> Result<String, BackendError> {
        self.check()?;
        Ok("2.4.1".to_string())
    }

    async fn newer_version_available(&self) -> Result<Option<String>, BackendError> {
        self.check()?;
        Ok(None)
    }

    async fn get_all_channels(
        &self,
        channel_type: ChannelType,
    ) -> Result<Vec<Channel>, BackendError> {
        self.check()?;
        Ok(self
            .channels
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.channel_type == channel_type)
            .cloned()
            .collect())
    }

    async fn get_channel_by_id(&self, channel_id: &str) -> Result<Channel, BackendError> {
        self.check()?;
        self.channels
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.channel_id == channel_id)
            .cloned()
            .ok_or(BackendError::Http(404))
    }

    async fn create_new_schedule(
        &self,
        channel_type: ChannelType,
        schedule_type: ScheduleType,
    ) -> Result<Schedule, BackendError> {
        self.new_schedule_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(Schedule {
            schedule_id: "fresh-schedule".to_string(),
            name: String::new(),
            channel_type,
            schedule_type,
            pre_record_minutes: None,
            post_record_minutes: None,
            rules: Vec::new(),
        })
    }

    async fn save_schedule(&self, schedule: &Schedule) -> Result<(), BackendError> {
        self.check()?;
        self.saved_schedules.lock().unwrap().push(schedule.clone());
        Ok(())
    }

    async fn get_schedule_by_id(&self, schedule_id: &str) -> Result<Schedule, BackendError> {
        self.check()?;
        self.schedules
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.schedule_id == schedule_id)
            .cloned()
            .ok_or(BackendError::Http(404))
    }

    async fn delete_schedule(&self, schedule_id: &str) -> Result<(), BackendError> {
        self.check()?;
        self.deleted_schedules
            .lock()
            .unwrap()
            .push(schedule_id.to_string());
        Ok(())
    }

    async fn get_channel_programs_between(
        &self,
        _guide_channel_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<GuideProgram>, BackendError> {
        self.check()?;
        Ok(self
            .programs
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.stop_time > start && p.start_time < end)
            .cloned()
            .collect())
    }

    async fn get_program_by_id(&self, program_id: &str) -> Result<GuideProgram, BackendError> {
        self.check()?;
        self.programs
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.guide_program_id == program_id)
            .cloned()
            .ok_or(BackendError::Http(404))
    }

    async fn get_recording_groups(
        &self,
        _channel_type: ChannelType,
        _mode: RecordingGroupMode,
    ) -> Result<Vec<RecordingGroup>, BackendError> {
        self.check()?;
        Ok(self.recording_groups.lock().unwrap().clone())
    }

    async fn get_full_recordings(
        &self,
        _channel_type: ChannelType,
        program_title: Option<&str>,
        _channel_id: Option<&str>,
    ) -> Result<Vec<Recording>, BackendError> {
        self.check()?;
        Ok(self
            .recordings
            .lock()
            .unwrap()
            .iter()
            .filter(|r| program_title.map_or(true, |t| r.title == t))
            .cloned()
            .collect())
    }

    async fn get_recording_by_id(&self, recording_id: &str) -> Result<Recording, BackendError> {
        self.check()?;
        self.recordings
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.recording_id == recording_id)
            .cloned()
            .ok_or(BackendError::Http(404))
    }

    async fn delete_recording_by_id(&self, recording_id: &str) -> Result<(), BackendError> {
        self.check()?;
        self.deleted_recordings
            .lock()
            .unwrap()
            .push(recording_id.to_string());
        Ok(())
    }

    async fn get_all_upcoming_recordings(
        &self,
        filter: UpcomingFilter,
    ) -> Result<Vec<UpcomingRecording>, BackendError> {
        self.check()?;
        Ok(self
            .upcoming
            .lock()
            .unwrap()
            .iter()
            .filter(|u| filter == UpcomingFilter::All || !u.is_cancelled)
            .cloned()
            .collect())
    }

    async fn tune_live_stream(
        &self,
        channel: &Channel,
        _profile: &str,
    ) -> Result<TuneResult, BackendError> {
        self.check()?;
        match self.tune_response.lock().unwrap().clone() {
            Some(scripted) => Ok(scripted),
            None => Ok(TuneResult {
                result: TuneResultCode::Succeeded,
                stream: Some(Self::live_stream(&channel.channel_id)),
            }),
        }
    }

    async fn get_live_streams(&self) -> Result<Vec<LiveStream>, BackendError> {
        self.check()?;
        if self.fail_streams.load(Ordering::SeqCst) {
            return Err(fault());
        }
        Ok(self.live_streams.lock().unwrap().clone())
    }

    async fn keep_live_stream_alive(&self, stream: &LiveStream) -> Result<(), BackendError> {
        self.check()?;
        self.kept_alive
            .lock()
            .unwrap()
            .push(stream.channel.channel_id.clone());
        Ok(())
    }

    async fn stop_live_stream(&self, stream: &LiveStream) -> Result<(), BackendError> {
        self.check()?;
        self.stopped
            .lock()
            .unwrap()
            .push(stream.channel.channel_id.clone());
        Ok(())
    }
}
