//! LiveTV facade
//!
//! The public contract consumed by the host media application. Composes
//! the connection gate, the schedule service and the stream session
//! manager over one backend client, and owns the background keep-alive
//! task for the lifetime of the bridge.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::backend::{BackendClient, ChannelType, RecordingGroupMode};
use crate::config::{Config, SUPPORTED_API_VERSION};
use crate::error::{Error, Result};
use crate::models::{
    ChannelInfo, ProgramInfo, RecordingInfo, SeriesTimerRequest, StreamSession, TimerRequest,
};
use crate::services::backend_call;
use crate::services::gate::ConnectionGate;
use crate::services::keepalive::{start_keepalive_task, KeepAliveConfig, KeepAliveHandle};
use crate::services::schedules::ScheduleService;
use crate::services::streams::StreamService;

const BRIDGE_NAME: &str = "LiveTV Bridge";
const HOME_PAGE: &str = "https://github.com/livetv-bridge/livetv-bridge";

#[derive(Debug, Clone, PartialEq)]
pub struct BridgeStatus {
    pub available: bool,
    pub server_version: Option<String>,
    /// Version descriptor when the backend vendor published a newer release
    pub newer_version: Option<String>,
}

pub struct LiveTvBridge {
    backend: Arc<dyn BackendClient>,
    gate: Arc<ConnectionGate>,
    schedules: ScheduleService,
    streams: StreamService,
    keepalive: KeepAliveHandle,
    changes: broadcast::Sender<()>,
}

impl LiveTvBridge {
    /// Build the bridge and start its keep-alive task. Must be called
    /// within a tokio runtime.
    pub fn new(config: &Config, backend: Arc<dyn BackendClient>) -> Self {
        let gate = Arc::new(ConnectionGate::new(
            backend.clone(),
            config,
            SUPPORTED_API_VERSION,
        ));

        let schedules = ScheduleService::new(backend.clone(), gate.clone(), config);
        let streams = StreamService::new(backend.clone(), gate.clone(), &config.streaming_profile);

        let keepalive = start_keepalive_task(
            backend.clone(),
            gate.clone(),
            KeepAliveConfig {
                interval_secs: config.keepalive_interval_secs,
            },
        );

        let (changes, _) = broadcast::channel(16);

        info!("bridge initialized for {}", config.base_url());

        Self {
            backend,
            gate,
            schedules,
            streams,
            keepalive,
            changes,
        }
    }

    /// Stop the keep-alive task and tear the bridge down
    pub async fn shutdown(self) {
        self.keepalive.shutdown().await;
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    pub fn name(&self) -> &'static str {
        BRIDGE_NAME
    }

    pub fn home_page(&self) -> &'static str {
        HOME_PAGE
    }

    /// Fires when the bridge's view of its data sources changes. Never
    /// raised by this core today; retained for the host contract.
    pub fn subscribe_data_changes(&self) -> broadcast::Receiver<()> {
        self.changes.subscribe()
    }

    // ------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------

    pub async fn status(&self, cancel: &CancellationToken) -> Result<BridgeStatus> {
        let unavailable = BridgeStatus {
            available: false,
            server_version: None,
            newer_version: None,
        };

        match self.gate.ensure_connection(cancel).await {
            Ok(()) => {}
            Err(Error::VersionIncompatible(_)) => return Ok(unavailable),
            Err(e) => return Err(e),
        }
        if !self.gate.is_available() {
            return Ok(unavailable);
        }

        let server_version = match backend_call(cancel, self.backend.server_version()).await {
            Ok(version) => Some(version),
            Err(Error::Transport(cause)) => {
                warn!("could not read backend version: {}", cause);
                None
            }
            Err(other) => return Err(other),
        };

        let newer_version = match backend_call(cancel, self.backend.newer_version_available()).await
        {
            Ok(newer) => newer,
            Err(Error::Transport(cause)) => {
                warn!("could not check for newer backend: {}", cause);
                None
            }
            Err(other) => return Err(other),
        };

        Ok(BridgeStatus {
            available: true,
            server_version,
            newer_version,
        })
    }

    // ------------------------------------------------------------------
    // Channels & guide
    // ------------------------------------------------------------------

    /// Television channels only. Degrades to an empty list on a transport
    /// fault.
    pub async fn get_channels(&self, cancel: &CancellationToken) -> Result<Vec<ChannelInfo>> {
        self.gate.ensure_connection(cancel).await?;

        match backend_call(cancel, self.backend.get_all_channels(ChannelType::Television)).await {
            Ok(channels) => Ok(channels
                .into_iter()
                .map(|c| ChannelInfo {
                    id: c.channel_id,
                    name: c.display_name,
                    number: c.logical_channel_number,
                })
                .collect()),
            Err(Error::Transport(cause)) => {
                warn!("listing channels failed: {}", cause);
                Ok(Vec::new())
            }
            Err(other) => Err(other),
        }
    }

    /// Guide programs for one channel in a time window. Channels without a
    /// guide link yield an empty list, as does any transport fault.
    pub async fn get_programs(
        &self,
        channel_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<Vec<ProgramInfo>> {
        self.gate.ensure_connection(cancel).await?;

        let listing = async {
            let channel = backend_call(cancel, self.backend.get_channel_by_id(channel_id)).await?;

            let Some(guide_channel_id) = channel.guide_channel_id.as_deref() else {
                return Ok(Vec::new());
            };

            let programs = backend_call(
                cancel,
                self.backend
                    .get_channel_programs_between(guide_channel_id, start, end),
            )
            .await?;

            Ok(programs
                .into_iter()
                .map(|p| ProgramInfo {
                    id: p.guide_program_id,
                    channel_id: channel_id.to_string(),
                    title: p.title,
                    subtitle: p.sub_title,
                    overview: p.description,
                    start: p.start_time,
                    end: p.stop_time,
                    is_series: p.is_part_of_series,
                    is_repeat: p.is_repeat,
                    season_number: p.season_number,
                    episode_number: p.episode_number,
                })
                .collect())
        }
        .await;

        match listing {
            Ok(programs) => Ok(programs),
            Err(Error::Transport(cause)) => {
                warn!("guide listing for channel {} failed: {}", channel_id, cause);
                Ok(Vec::new())
            }
            Err(other) => Err(other),
        }
    }

    // ------------------------------------------------------------------
    // Recordings
    // ------------------------------------------------------------------

    /// All finished recordings, one backend round-trip per recording group.
    /// Degrades to an empty list on a transport fault.
    pub async fn get_recordings(&self, cancel: &CancellationToken) -> Result<Vec<RecordingInfo>> {
        self.gate.ensure_connection(cancel).await?;

        let listing = async {
            let groups = backend_call(
                cancel,
                self.backend
                    .get_recording_groups(ChannelType::Television, RecordingGroupMode::GroupByProgramTitle),
            )
            .await?;

            let mut recordings = Vec::new();
            for group in groups {
                let entries = backend_call(
                    cancel,
                    self.backend.get_full_recordings(
                        ChannelType::Television,
                        Some(&group.program_title),
                        None,
                    ),
                )
                .await?;

                recordings.extend(entries.into_iter().map(|r| RecordingInfo {
                    id: r.recording_id,
                    channel_id: r.channel_id,
                    title: r.title,
                    subtitle: r.sub_title,
                    overview: r.description,
                    start: r.recording_start_time,
                    end: r.recording_stop_time,
                    path: r.recording_file_name,
                }));
            }
            Ok(recordings)
        }
        .await;

        match listing {
            Ok(recordings) => Ok(recordings),
            Err(Error::Transport(cause)) => {
                warn!("listing recordings failed: {}", cause);
                Ok(Vec::new())
            }
            Err(other) => Err(other),
        }
    }

    pub async fn delete_recording(
        &self,
        recording_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.gate.ensure_connection(cancel).await?;

        backend_call(cancel, self.backend.delete_recording_by_id(recording_id))
            .await
            .map_err(|e| match e {
                Error::Transport(cause) => {
                    warn!("deleting recording {} failed: {}", recording_id, cause);
                    Error::SchedulingConflict(format!("recording {recording_id}: {cause}"))
                }
                other => other,
            })
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    pub async fn create_timer(&self, timer: &TimerRequest, cancel: &CancellationToken) -> Result<()> {
        self.schedules.create_timer(timer, cancel).await
    }

    pub async fn update_timer(&self, timer: &TimerRequest, cancel: &CancellationToken) -> Result<()> {
        self.schedules.update_timer(timer, cancel).await
    }

    pub async fn cancel_timer(&self, timer_id: &str, cancel: &CancellationToken) -> Result<()> {
        self.schedules.cancel_timer(timer_id, cancel).await
    }

    pub async fn create_series_timer(
        &self,
        series: &SeriesTimerRequest,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.schedules.create_series_timer(series, cancel).await
    }

    pub async fn update_series_timer(
        &self,
        series: &SeriesTimerRequest,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.schedules.update_series_timer(series, cancel).await
    }

    pub async fn cancel_series_timer(
        &self,
        series_timer_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.schedules.cancel_series_timer(series_timer_id, cancel).await
    }

    pub async fn list_timers(&self, cancel: &CancellationToken) -> Result<Vec<TimerRequest>> {
        self.schedules.list_timers(cancel).await
    }

    pub async fn list_series_timers(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<SeriesTimerRequest>> {
        self.schedules.list_series_timers(cancel).await
    }

    pub fn new_timer_defaults(&self) -> SeriesTimerRequest {
        self.schedules.new_timer_defaults()
    }

    // ------------------------------------------------------------------
    // Streams
    // ------------------------------------------------------------------

    pub async fn open_channel_stream(
        &self,
        channel_id: &str,
        cancel: &CancellationToken,
    ) -> Result<StreamSession> {
        self.streams.open_channel_stream(channel_id, cancel).await
    }

    pub async fn open_recording_stream(
        &self,
        recording_id: &str,
        cancel: &CancellationToken,
    ) -> Result<StreamSession> {
        self.streams.open_recording_stream(recording_id, cancel).await
    }

    pub async fn close_stream(&self, channel_id: &str, cancel: &CancellationToken) -> Result<()> {
        self.streams.close_stream(channel_id, cancel).await
    }

    /// Not built for this backend; distinct from a failed operation
    pub async fn reset_tuner(&self, _channel_id: &str) -> Result<()> {
        Err(Error::Unsupported("reset_tuner"))
    }
}
