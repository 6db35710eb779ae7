//! Clock-time values: minutes since midnight, and their placement on a real date.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, ValidationError};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A minute of the day in `0..1440`.
///
/// Formatting to `HH:MM` happens only through `Display`; the calculator works
/// on the integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

impl ClockTime {
    pub const MIDNIGHT: ClockTime = ClockTime(0);

    pub fn from_minutes(minutes: u32) -> Result<Self> {
        if minutes >= MINUTES_PER_DAY {
            return Err(ValidationError::time(
                minutes.to_string(),
                "minute of day must be below 1440",
            ));
        }
        Ok(Self(minutes as u16))
    }

    pub fn from_hm(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 {
            return Err(ValidationError::time(
                format!("{hour:02}:{minute:02}"),
                "hour must be 0-23",
            ));
        }
        if minute > 59 {
            return Err(ValidationError::time(
                format!("{hour:02}:{minute:02}"),
                "minute must be 0-59",
            ));
        }
        Ok(Self((hour * 60 + minute) as u16))
    }

    /// Parse `H:MM` or `HH:MM` (24-hour). Surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Result<Self> {
        let s = input.trim();
        let (h, m) = s
            .split_once(':')
            .ok_or_else(|| ValidationError::time(input, "expected HH:MM"))?;

        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !digits(h) || !digits(m) || h.len() > 2 || m.len() != 2 {
            return Err(ValidationError::time(input, "expected HH:MM"));
        }

        let hour: u32 = h
            .parse()
            .map_err(|_| ValidationError::time(input, "hour is not a number"))?;
        let minute: u32 = m
            .parse()
            .map_err(|_| ValidationError::time(input, "minute is not a number"))?;

        Self::from_hm(hour, minute).map_err(|e| match e {
            ValidationError::InvalidTimeFormat { reason, .. } => ValidationError::time(input, reason),
            other => other,
        })
    }

    /// Wrap a signed minute count onto the clock.
    ///
    /// Returns the clock time plus the day offset (0 = same day, -1 = the day before).
    pub fn wrapping(minutes: i64) -> (Self, i64) {
        let day = i64::from(MINUTES_PER_DAY);
        // rem_euclid keeps the minute in 0..1440, so it always fits.
        let minute = minutes.rem_euclid(day) as u16;
        (Self(minute), minutes.div_euclid(day))
    }

    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }

    pub fn hour(self) -> u32 {
        self.minutes() / 60
    }

    pub fn minute(self) -> u32 {
        self.minutes() % 60
    }

    pub fn to_naive_time(self) -> NaiveTime {
        // Always in range: hour < 24, minute < 60.
        NaiveTime::from_hms_opt(self.hour(), self.minute(), 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Resolve a schedule position (`day_offset` days from `date`, at `time`) in
/// an IANA timezone, returning UTC.
///
/// Returns `None` when the local time does not exist or is ambiguous (DST).
pub fn local_to_utc(date: NaiveDate, day_offset: i64, time: ClockTime, tz: Tz) -> Option<DateTime<Utc>> {
    let day = date.checked_add_signed(Duration::try_days(day_offset)?)?;
    let ndt = day.and_time(time.to_naive_time());
    let local = tz.from_local_datetime(&ndt).single()?;
    Some(local.with_timezone(&Utc))
}
