//! Timer ⇄ schedule-rule translation
//!
//! Pure functions, no backend I/O. The backend thinks in rule lists; the
//! host thinks in flat timers and flagged series timers. Rule order is
//! fixed here even though the backend does not care, so saved schedules
//! stay byte-comparable across updates.
//!
//! Dates and times inside rules are backend-local; the host contract is
//! UTC, so both directions convert at this boundary.

use chrono::{Local, Weekday};

use crate::backend::rules::{DaysOfWeek, ScheduleRule};
use crate::models::{SeriesTimerRequest, TimerRequest};

/// Seconds to whole minutes, flooring the remainder away. The backend
/// cannot express sub-minute padding, so 59 s of padding becomes none.
pub fn padding_minutes(seconds: u32) -> u32 {
    seconds / 60
}

/// Rules for a single-occurrence recording.
///
/// Always exactly four rules: title, the one channel (exclusive), a
/// day-rule with an empty day mask pinning the date, and the start time.
pub fn timer_to_rules(timer: &TimerRequest) -> Vec<ScheduleRule> {
    let local_start = timer.start.with_timezone(&Local);

    vec![
        ScheduleRule::Title(timer.name.clone()),
        ScheduleRule::Channels {
            channel_ids: vec![timer.channel_id.clone()],
            exclusive: true,
        },
        ScheduleRule::OnDateAndDaysOfWeek {
            days: DaysOfWeek::NONE,
            date: Some(local_start.date_naive()),
        },
        ScheduleRule::AroundTime(local_start.time()),
    ]
}

/// Rules for a recurring recording.
///
/// "Record at any time" and "record on any channel" have no rule of their
/// own: the AroundTime and Channels rules are simply left out. The reverse
/// translation relies on exactly this absence.
pub fn series_timer_to_rules(series: &SeriesTimerRequest) -> Vec<ScheduleRule> {
    let local_start = series.start.with_timezone(&Local);

    let mut rules = vec![
        ScheduleRule::Title(series.name.clone()),
        ScheduleRule::OnDateAndDaysOfWeek {
            days: DaysOfWeek::from_weekdays(&series.days),
            date: Some(local_start.date_naive()),
        },
        ScheduleRule::NewEpisodesOnly(series.record_new_only),
    ];

    if !series.record_any_time {
        rules.push(ScheduleRule::AroundTime(local_start.time()));
    }
    if !series.record_any_channel {
        rules.push(ScheduleRule::Channels {
            channel_ids: vec![series.channel_id.clone()],
            exclusive: true,
        });
    }

    rules
}

/// Series-timer fields recovered from a schedule's rule list
#[derive(Debug, Default, PartialEq)]
pub struct SeriesRuleFlags {
    pub days: Vec<Weekday>,
    pub record_new_only: bool,
}

/// Decode the recurring fields out of a rule list.
///
/// At most one day rule is expected; with none present the day set stays
/// empty. record_any_time / record_any_channel are NOT reconstructed from
/// rule absence here, so they read back as false even for a series saved
/// with them set (known one-directional loss).
pub fn series_flags_from_rules(rules: &[ScheduleRule]) -> SeriesRuleFlags {
    let mut flags = SeriesRuleFlags::default();

    for rule in rules {
        match rule {
            ScheduleRule::OnDateAndDaysOfWeek { days, .. } => {
                flags.days = days.to_weekdays();
            }
            ScheduleRule::NewEpisodesOnly(value) => {
                flags.record_new_only = *value;
            }
            _ => {}
        }
    }

    flags
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn timer() -> TimerRequest {
        TimerRequest {
            id: "timer-1".to_string(),
            channel_id: "ch-7".to_string(),
            program_id: None,
            name: "Evening News".to_string(),
            start: Utc.with_ymd_and_hms(2024, 3, 15, 19, 58, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 15, 20, 32, 0).unwrap(),
            pre_padding_secs: 120,
            post_padding_secs: 300,
            status: crate::models::TimerStatus::Scheduled,
        }
    }

    fn series_timer() -> SeriesTimerRequest {
        SeriesTimerRequest {
            id: "series-1".to_string(),
            channel_id: "ch-7".to_string(),
            program_id: None,
            name: "Evening News".to_string(),
            start: Utc.with_ymd_and_hms(2024, 3, 15, 19, 58, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 15, 20, 32, 0).unwrap(),
            pre_padding_secs: 120,
            post_padding_secs: 300,
            days: vec![Weekday::Mon, Weekday::Wed],
            record_new_only: true,
            record_any_time: false,
            record_any_channel: false,
        }
    }

    #[test]
    fn test_padding_floors_toward_zero() {
        assert_eq!(padding_minutes(125), 2);
        assert_eq!(padding_minutes(59), 0);
        assert_eq!(padding_minutes(60), 1);
        assert_eq!(padding_minutes(0), 0);
    }

    #[test]
    fn test_timer_rules_fixed_order() {
        let rules = timer_to_rules(&timer());
        assert_eq!(rules.len(), 4);

        assert_eq!(rules[0], ScheduleRule::Title("Evening News".to_string()));
        match &rules[1] {
            ScheduleRule::Channels {
                channel_ids,
                exclusive,
            } => {
                assert_eq!(channel_ids, &["ch-7".to_string()]);
                assert!(exclusive);
            }
            other => panic!("expected Channels, got {other:?}"),
        }
        match &rules[2] {
            ScheduleRule::OnDateAndDaysOfWeek { days, date } => {
                assert!(days.is_empty(), "single occurrence must carry no days");
                assert!(date.is_some());
            }
            other => panic!("expected OnDateAndDaysOfWeek, got {other:?}"),
        }
        assert!(matches!(rules[3], ScheduleRule::AroundTime(_)));
    }

    #[test]
    fn test_series_rules_with_both_flags_false() {
        let rules = series_timer_to_rules(&series_timer());
        assert_eq!(rules.len(), 5);

        let types: Vec<&str> = rules.iter().map(|r| r.rule_type()).collect();
        assert_eq!(
            types,
            vec![
                "TitleEquals",
                "OnDateAndDaysOfWeek",
                "NewEpisodesOnly",
                "AroundTime",
                "Channels",
            ]
        );
    }

    #[test]
    fn test_any_time_drops_around_time_rule() {
        let mut series = series_timer();
        series.record_any_time = true;

        let rules = series_timer_to_rules(&series);
        assert_eq!(rules.len(), 4);
        assert!(!rules.iter().any(|r| r.rule_type() == "AroundTime"));
        assert!(rules.iter().any(|r| r.rule_type() == "Channels"));
    }

    #[test]
    fn test_any_channel_drops_channels_rule() {
        let mut series = series_timer();
        series.record_any_channel = true;

        let rules = series_timer_to_rules(&series);
        assert_eq!(rules.len(), 4);
        assert!(rules.iter().any(|r| r.rule_type() == "AroundTime"));
        assert!(!rules.iter().any(|r| r.rule_type() == "Channels"));
    }

    #[test]
    fn test_both_flags_drop_both_rules() {
        let mut series = series_timer();
        series.record_any_time = true;
        series.record_any_channel = true;

        let rules = series_timer_to_rules(&series);
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn test_day_set_survives_translation_round_trip() {
        let rules = series_timer_to_rules(&series_timer());
        let flags = series_flags_from_rules(&rules);

        assert_eq!(flags.days, vec![Weekday::Mon, Weekday::Wed]);
        assert!(flags.record_new_only);
    }

    #[test]
    fn test_missing_day_rule_defaults_to_empty() {
        let rules = vec![ScheduleRule::Title("X".to_string())];
        let flags = series_flags_from_rules(&rules);
        assert!(flags.days.is_empty());
        assert!(!flags.record_new_only);
    }
}
