//! Schedule service facade
//!
//! Implements the host's timer and series-timer operations on top of the
//! backend's rule-based schedule model. Create and update share one shape:
//! fetch a fresh schedule template, overwrite name, padding and rules, then
//! save. An update is therefore indistinguishable from a create at the
//! backend-call level.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::gate::ConnectionGate;
use super::{backend_call, rules};
use crate::backend::{
    BackendClient, ChannelType, ScheduleRule, ScheduleType, UpcomingFilter, UpcomingRecording,
};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{SeriesTimerRequest, TimerRequest, TimerStatus};

/// Transport faults on write paths become scheduling conflicts the host
/// can surface to the user; cancellation stays cancellation.
fn into_conflict(err: Error) -> Error {
    match err {
        Error::Transport(cause) => Error::SchedulingConflict(cause.to_string()),
        other => other,
    }
}

pub struct ScheduleService {
    backend: Arc<dyn BackendClient>,
    gate: Arc<ConnectionGate>,
    default_pre_padding_secs: u32,
    default_post_padding_secs: u32,
}

impl ScheduleService {
    pub fn new(backend: Arc<dyn BackendClient>, gate: Arc<ConnectionGate>, config: &Config) -> Self {
        Self {
            backend,
            gate,
            default_pre_padding_secs: config.default_pre_padding_secs,
            default_post_padding_secs: config.default_post_padding_secs,
        }
    }

    // ------------------------------------------------------------------
    // Create / update
    // ------------------------------------------------------------------

    pub async fn create_timer(
        &self,
        timer: &TimerRequest,
        cancel: &CancellationToken,
    ) -> Result<()> {
        debug!("creating timer '{}' on channel {}", timer.name, timer.channel_id);
        self.save_as_schedule(
            &timer.name,
            timer.pre_padding_secs,
            timer.post_padding_secs,
            rules::timer_to_rules(timer),
            cancel,
        )
        .await
    }

    /// Full-overwrite save, not a patch
    pub async fn update_timer(
        &self,
        timer: &TimerRequest,
        cancel: &CancellationToken,
    ) -> Result<()> {
        debug!("updating timer '{}'", timer.name);
        self.save_as_schedule(
            &timer.name,
            timer.pre_padding_secs,
            timer.post_padding_secs,
            rules::timer_to_rules(timer),
            cancel,
        )
        .await
    }

    pub async fn create_series_timer(
        &self,
        series: &SeriesTimerRequest,
        cancel: &CancellationToken,
    ) -> Result<()> {
        debug!("creating series timer '{}'", series.name);
        self.save_as_schedule(
            &series.name,
            series.pre_padding_secs,
            series.post_padding_secs,
            rules::series_timer_to_rules(series),
            cancel,
        )
        .await
    }

    pub async fn update_series_timer(
        &self,
        series: &SeriesTimerRequest,
        cancel: &CancellationToken,
    ) -> Result<()> {
        debug!("updating series timer '{}'", series.name);
        self.save_as_schedule(
            &series.name,
            series.pre_padding_secs,
            series.post_padding_secs,
            rules::series_timer_to_rules(series),
            cancel,
        )
        .await
    }

    async fn save_as_schedule(
        &self,
        name: &str,
        pre_padding_secs: u32,
        post_padding_secs: u32,
        rule_list: Vec<ScheduleRule>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.gate.ensure_connection(cancel).await?;

        // The fresh template carries the backend-required scalar fields
        let mut schedule = backend_call(
            cancel,
            self.backend
                .create_new_schedule(ChannelType::Television, ScheduleType::Recording),
        )
        .await
        .map_err(into_conflict)?;

        schedule.name = name.to_string();
        schedule.pre_record_minutes = Some(rules::padding_minutes(pre_padding_secs));
        schedule.post_record_minutes = Some(rules::padding_minutes(post_padding_secs));
        schedule.rules = rule_list;

        backend_call(cancel, self.backend.save_schedule(&schedule))
            .await
            .map_err(into_conflict)
    }

    // ------------------------------------------------------------------
    // Cancel
    // ------------------------------------------------------------------

    pub async fn cancel_timer(&self, timer_id: &str, cancel: &CancellationToken) -> Result<()> {
        self.delete_schedule(timer_id, cancel).await
    }

    /// Same backend call as [`Self::cancel_timer`]: both delete by id
    pub async fn cancel_series_timer(
        &self,
        series_timer_id: &str,
        cancel: &CancellationToken,
    ) -> Result<()> {
        self.delete_schedule(series_timer_id, cancel).await
    }

    async fn delete_schedule(&self, schedule_id: &str, cancel: &CancellationToken) -> Result<()> {
        self.gate.ensure_connection(cancel).await?;
        debug!("deleting schedule {}", schedule_id);

        backend_call(cancel, self.backend.delete_schedule(schedule_id))
            .await
            .map_err(into_conflict)
    }

    // ------------------------------------------------------------------
    // List
    // ------------------------------------------------------------------

    /// One timer per upcoming recording, no grouping. Degrades to an empty
    /// list on a transport fault.
    pub async fn list_timers(&self, cancel: &CancellationToken) -> Result<Vec<TimerRequest>> {
        self.gate.ensure_connection(cancel).await?;

        match backend_call(
            cancel,
            self.backend
                .get_all_upcoming_recordings(UpcomingFilter::Recordings),
        )
        .await
        {
            Ok(upcoming) => Ok(upcoming
                .into_iter()
                .map(|u| self.timer_from_upcoming(u))
                .collect()),
            Err(Error::Transport(cause)) => {
                warn!("listing timers failed: {}", cause);
                Ok(Vec::new())
            }
            Err(other) => Err(other),
        }
    }

    /// One series timer per distinct schedule id among the upcoming
    /// recordings, derived from the first-seen entry of each group and
    /// filtered to programs that belong to a series. Unlike plain timer
    /// listing, any fault aborts the whole listing: a partial list would
    /// silently drop series.
    pub async fn list_series_timers(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<SeriesTimerRequest>> {
        self.gate.ensure_connection(cancel).await?;

        let upcoming = backend_call(
            cancel,
            self.backend
                .get_all_upcoming_recordings(UpcomingFilter::Recordings),
        )
        .await
        .map_err(into_conflict)?;

        // First-seen entry represents its schedule; a heuristic for "one
        // entry per series", not authoritative series metadata.
        let mut seen = HashSet::new();
        let mut representatives = Vec::new();
        for entry in upcoming {
            if seen.insert(entry.schedule_id.clone()) {
                representatives.push(entry);
            }
        }

        let mut series_timers = Vec::new();
        for representative in representatives {
            let Some(program_id) = representative.guide_program_id.as_deref() else {
                continue;
            };

            let program = backend_call(cancel, self.backend.get_program_by_id(program_id))
                .await
                .map_err(into_conflict)?;
            if !program.is_part_of_series {
                continue;
            }

            let schedule = backend_call(
                cancel,
                self.backend.get_schedule_by_id(&representative.schedule_id),
            )
            .await
            .map_err(into_conflict)?;

            let flags = rules::series_flags_from_rules(&schedule.rules);

            series_timers.push(SeriesTimerRequest {
                id: schedule.schedule_id,
                channel_id: representative.channel.channel_id,
                program_id: representative.guide_program_id,
                name: schedule.name,
                start: representative.start_time,
                end: representative.stop_time,
                pre_padding_secs: schedule
                    .pre_record_minutes
                    .map(|m| m * 60)
                    .unwrap_or(self.default_pre_padding_secs),
                post_padding_secs: schedule
                    .post_record_minutes
                    .map(|m| m * 60)
                    .unwrap_or(self.default_post_padding_secs),
                days: flags.days,
                record_new_only: flags.record_new_only,
                // Not recoverable from rule absence; reads back as false
                record_any_time: false,
                record_any_channel: false,
            });
        }

        Ok(series_timers)
    }

    /// Padding defaults only; every other field is left for the host
    pub fn new_timer_defaults(&self) -> SeriesTimerRequest {
        SeriesTimerRequest {
            id: String::new(),
            channel_id: String::new(),
            program_id: None,
            name: String::new(),
            start: DateTime::<Utc>::UNIX_EPOCH,
            end: DateTime::<Utc>::UNIX_EPOCH,
            pre_padding_secs: self.default_pre_padding_secs,
            post_padding_secs: self.default_post_padding_secs,
            days: Vec::new(),
            record_new_only: false,
            record_any_time: false,
            record_any_channel: false,
        }
    }

    fn timer_from_upcoming(&self, upcoming: UpcomingRecording) -> TimerRequest {
        let now = Utc::now();
        let status = if upcoming.is_cancelled {
            TimerStatus::Cancelled
        } else if upcoming.start_time <= now && now < upcoming.stop_time {
            TimerStatus::InProgress
        } else {
            TimerStatus::Scheduled
        };

        TimerRequest {
            id: upcoming.upcoming_program_id,
            channel_id: upcoming.channel.channel_id,
            program_id: upcoming.guide_program_id,
            name: upcoming.title,
            start: upcoming.start_time,
            end: upcoming.stop_time,
            pre_padding_secs: upcoming
                .pre_record_seconds
                .unwrap_or(self.default_pre_padding_secs),
            post_padding_secs: upcoming
                .post_record_seconds
                .unwrap_or(self.default_post_padding_secs),
            status,
        }
    }
}
