//! Typed schedule rules
//!
//! The recorder persists each schedule as an ordered list of rules, where a
//! rule on the wire is a type string plus a positional argument array. This
//! module keeps the typed [`ScheduleRule`] shape for the rest of the crate
//! and converts to/from the positional form only at the serde boundary, so
//! illegal rule shapes are unrepresentable in code.

use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const RULE_TYPE_TITLE: &str = "TitleEquals";
pub const RULE_TYPE_CHANNELS: &str = "Channels";
pub const RULE_TYPE_ON_DATE_AND_DAYS: &str = "OnDateAndDaysOfWeek";
pub const RULE_TYPE_AROUND_TIME: &str = "AroundTime";
pub const RULE_TYPE_NEW_EPISODES_ONLY: &str = "NewEpisodesOnly";

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Day-of-week bitmask as the recorder encodes it: Monday = 0x01 through
/// Sunday = 0x40, zero meaning "no recurrence" (single occurrence).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DaysOfWeek(u8);

impl DaysOfWeek {
    pub const NONE: DaysOfWeek = DaysOfWeek(0);

    fn bit(day: Weekday) -> u8 {
        match day {
            Weekday::Mon => 0x01,
            Weekday::Tue => 0x02,
            Weekday::Wed => 0x04,
            Weekday::Thu => 0x08,
            Weekday::Fri => 0x10,
            Weekday::Sat => 0x20,
            Weekday::Sun => 0x40,
        }
    }

    pub fn from_weekdays(days: &[Weekday]) -> Self {
        DaysOfWeek(days.iter().fold(0, |mask, d| mask | Self::bit(*d)))
    }

    /// Decode to weekdays in Monday-first order
    pub fn to_weekdays(self) -> Vec<Weekday> {
        [
            Weekday::Mon,
            Weekday::Tue,
            Weekday::Wed,
            Weekday::Thu,
            Weekday::Fri,
            Weekday::Sat,
            Weekday::Sun,
        ]
        .into_iter()
        .filter(|d| self.0 & Self::bit(*d) != 0)
        .collect()
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn from_bits(bits: u8) -> Self {
        DaysOfWeek(bits & 0x7F)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// One typed constraint within a schedule.
///
/// In this bridge's usage each variant appears at most once per schedule.
/// `Other` passes through rule types this bridge does not produce, so a
/// schedule edited elsewhere survives a read-modify-write cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireRule", try_from = "WireRule")]
pub enum ScheduleRule {
    Title(String),
    Channels {
        channel_ids: Vec<String>,
        /// true restricts recording to exactly these channels
        exclusive: bool,
    },
    OnDateAndDaysOfWeek {
        days: DaysOfWeek,
        /// Local-time date; None lets the recurrence float
        date: Option<NaiveDate>,
    },
    /// Local time of day the recording window is anchored around
    AroundTime(NaiveTime),
    NewEpisodesOnly(bool),
    Other {
        rule_type: String,
        arguments: Vec<Value>,
    },
}

impl ScheduleRule {
    pub fn rule_type(&self) -> &str {
        match self {
            ScheduleRule::Title(_) => RULE_TYPE_TITLE,
            ScheduleRule::Channels { .. } => RULE_TYPE_CHANNELS,
            ScheduleRule::OnDateAndDaysOfWeek { .. } => RULE_TYPE_ON_DATE_AND_DAYS,
            ScheduleRule::AroundTime(_) => RULE_TYPE_AROUND_TIME,
            ScheduleRule::NewEpisodesOnly(_) => RULE_TYPE_NEW_EPISODES_ONLY,
            ScheduleRule::Other { rule_type, .. } => rule_type.as_str(),
        }
    }
}

/// Positional wire form: `{"Type": "...", "Arguments": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRule {
    #[serde(rename = "Type")]
    pub rule_type: String,
    #[serde(rename = "Arguments", default)]
    pub arguments: Vec<Value>,
}

impl From<ScheduleRule> for WireRule {
    fn from(rule: ScheduleRule) -> Self {
        match rule {
            ScheduleRule::Title(title) => WireRule {
                rule_type: RULE_TYPE_TITLE.to_string(),
                arguments: vec![json!(title)],
            },
            ScheduleRule::Channels {
                channel_ids,
                exclusive,
            } => {
                // Position 0 is the exclusivity flag, the channel ids follow
                let mut arguments = vec![json!(exclusive)];
                arguments.extend(channel_ids.into_iter().map(|id| json!(id)));
                WireRule {
                    rule_type: RULE_TYPE_CHANNELS.to_string(),
                    arguments,
                }
            }
            ScheduleRule::OnDateAndDaysOfWeek { days, date } => WireRule {
                rule_type: RULE_TYPE_ON_DATE_AND_DAYS.to_string(),
                // Position 0 is the day bitmask, position 1 the date
                arguments: vec![
                    json!(days.bits()),
                    match date {
                        Some(d) => json!(d.format(DATE_FORMAT).to_string()),
                        None => Value::Null,
                    },
                ],
            },
            ScheduleRule::AroundTime(time) => WireRule {
                rule_type: RULE_TYPE_AROUND_TIME.to_string(),
                arguments: vec![json!(time.format(TIME_FORMAT).to_string())],
            },
            ScheduleRule::NewEpisodesOnly(flag) => WireRule {
                rule_type: RULE_TYPE_NEW_EPISODES_ONLY.to_string(),
                arguments: vec![json!(flag)],
            },
            ScheduleRule::Other {
                rule_type,
                arguments,
            } => WireRule {
                rule_type,
                arguments,
            },
        }
    }
}

impl TryFrom<WireRule> for ScheduleRule {
    type Error = String;

    fn try_from(wire: WireRule) -> Result<Self, Self::Error> {
        let WireRule {
            rule_type,
            arguments,
        } = wire;

        let bad = |what: &str| format!("malformed {rule_type} rule: {what}");

        match rule_type.as_str() {
            RULE_TYPE_TITLE => {
                let title = arguments
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| bad("missing title argument"))?;
                Ok(ScheduleRule::Title(title.to_string()))
            }
            RULE_TYPE_CHANNELS => {
                let exclusive = arguments
                    .first()
                    .and_then(Value::as_bool)
                    .ok_or_else(|| bad("missing exclusivity flag"))?;
                let channel_ids = arguments[1..]
                    .iter()
                    .map(|v| {
                        v.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| bad("non-string channel id"))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ScheduleRule::Channels {
                    channel_ids,
                    exclusive,
                })
            }
            RULE_TYPE_ON_DATE_AND_DAYS => {
                let bits = arguments
                    .first()
                    .and_then(Value::as_u64)
                    .ok_or_else(|| bad("missing day bitmask"))?;
                let date = match arguments.get(1) {
                    None | Some(Value::Null) => None,
                    Some(v) => {
                        let s = v.as_str().ok_or_else(|| bad("non-string date"))?;
                        Some(
                            NaiveDate::parse_from_str(s, DATE_FORMAT)
                                .map_err(|e| bad(&e.to_string()))?,
                        )
                    }
                };
                Ok(ScheduleRule::OnDateAndDaysOfWeek {
                    days: DaysOfWeek::from_bits(bits as u8),
                    date,
                })
            }
            RULE_TYPE_AROUND_TIME => {
                let s = arguments
                    .first()
                    .and_then(Value::as_str)
                    .ok_or_else(|| bad("missing time argument"))?;
                let time =
                    NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|e| bad(&e.to_string()))?;
                Ok(ScheduleRule::AroundTime(time))
            }
            RULE_TYPE_NEW_EPISODES_ONLY => {
                let flag = arguments
                    .first()
                    .and_then(Value::as_bool)
                    .ok_or_else(|| bad("missing flag argument"))?;
                Ok(ScheduleRule::NewEpisodesOnly(flag))
            }
            _ => Ok(ScheduleRule::Other {
                rule_type,
                arguments,
            }),
        }
    }
}
