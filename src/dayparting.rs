//! Time-of-day and day-of-week activity windows.
//!
//! A campaign is gated by its active windows for the current UTC weekday. A
//! day without any runs around the clock; on a day with at least one, the
//! campaign may only run inside one of them.

use crate::campaign::CampaignId;
use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Errors raised when a schedule window is rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    #[error("day_of_week must be 0 (Monday) through 6 (Sunday), got {0}")]
    InvalidDay(u8),

    #[error("start time {start} must be before end time {end}")]
    EmptyWindow { start: NaiveTime, end: NaiveTime },

    #[error("invalid time of day '{0}', expected HH:MM or HH:MM:SS")]
    InvalidTime(String),

    #[error("window {start}-{end} overlaps an existing window on day {day_of_week}")]
    Overlap {
        day_of_week: u8,
        start: NaiveTime,
        end: NaiveTime,
    },
}

/// One allowed window for a campaign on a given weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaypartingSchedule {
    pub campaign_id: CampaignId,
    /// 0 = Monday ... 6 = Sunday
    pub day_of_week: u8,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_active: bool,
}

impl DaypartingSchedule {
    /// Build a validated window. Windows that span midnight are rejected.
    pub fn new(
        campaign_id: CampaignId,
        day_of_week: u8,
        start_time: NaiveTime,
        end_time: NaiveTime,
        is_active: bool,
    ) -> Result<Self, ScheduleError> {
        if day_of_week > 6 {
            return Err(ScheduleError::InvalidDay(day_of_week));
        }
        if start_time >= end_time {
            return Err(ScheduleError::EmptyWindow {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            campaign_id,
            day_of_week,
            start_time,
            end_time,
            is_active,
        })
    }

    /// Whether two windows on the same campaign and day share any instant.
    pub fn overlaps(&self, other: &DaypartingSchedule) -> bool {
        self.campaign_id == other.campaign_id
            && self.day_of_week == other.day_of_week
            && self.start_time <= other.end_time
            && other.start_time <= self.end_time
    }

    fn applies_on(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.day_of_week == weekday_index(now)
    }

    fn contains(&self, now: DateTime<Utc>) -> bool {
        let time = now.time();
        // Sub-second precision is dropped so an end bound of 17:00:00 still
        // admits 17:00:00.5.
        let time = time.with_nanosecond(0).unwrap_or(time);
        self.applies_on(now) && self.start_time <= time && time <= self.end_time
    }
}

/// UTC weekday of `now`, Monday = 0.
pub fn weekday_index(now: DateTime<Utc>) -> u8 {
    now.weekday().num_days_from_monday() as u8
}

/// Decide whether a campaign with `schedules` may run at `now`.
///
/// Empty means unrestricted. Otherwise at least one active window for the
/// current weekday must contain `now`, bounds inclusive.
pub fn is_allowed(schedules: &[DaypartingSchedule], now: DateTime<Utc>) -> bool {
    schedules.is_empty() || schedules.iter().any(|s| s.contains(now))
}

/// The windows that gate a campaign at `now`: active ones on today's weekday.
/// Feed the result to [`is_allowed`].
pub fn gating_windows(
    schedules: Vec<DaypartingSchedule>,
    now: DateTime<Utc>,
) -> Vec<DaypartingSchedule> {
    schedules.into_iter().filter(|s| s.applies_on(now)).collect()
}

/// Parse `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime, ScheduleError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| ScheduleError::InvalidTime(raw.to_string()))
}
