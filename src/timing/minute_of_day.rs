use std::{fmt, str::FromStr, sync::OnceLock};

use chrono::{DateTime, NaiveTime, TimeZone, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Local time of day with minute resolution, always in `[0, 1440)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub const MIDNIGHT: MinuteOfDay = MinuteOfDay(0);

    pub fn new(minutes: u32) -> Result<Self, ConfigError> {
        if minutes >= MINUTES_PER_DAY as u32 {
            return Err(ConfigError::MinuteOutOfRange(minutes));
        }
        Ok(Self(minutes as u16))
    }

    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, ConfigError> {
        if hour >= 24 || minute >= 60 {
            return Err(ConfigError::InvalidTime(format!("{:02}:{:02}", hour, minute)));
        }
        Self::new(hour * 60 + minute)
    }

    /// For compile-time constants. Callers guarantee the range.
    pub(crate) const fn from_hm_const(hour: u16, minute: u16) -> Self {
        Self(hour * 60 + minute)
    }

    pub fn of<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> Self {
        Self((timestamp.hour() * 60 + timestamp.minute()) as u16)
    }

    pub fn minutes(&self) -> u16 {
        self.0
    }

    pub fn hour(&self) -> u16 {
        self.0 / 60
    }

    pub fn minute(&self) -> u16 {
        self.0 % 60
    }

    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_num_seconds_from_midnight_opt(self.0 as u32 * 60, 0)
            .unwrap_or(NaiveTime::MIN)
    }
}

fn time_regex() -> &'static Regex {
    static TIME_REGEX: OnceLock<Regex> = OnceLock::new();
    TIME_REGEX.get_or_init(|| Regex::new(r"^\s*(\d{1,2}):(\d{2})\s*$").expect("valid regex"))
}

impl FromStr for MinuteOfDay {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidTime(s.to_string());
        let captures = time_regex().captures(s).ok_or_else(invalid)?;
        let hour: u32 = captures[1].parse().map_err(|_| invalid())?;
        let minute: u32 = captures[2].parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for MinuteOfDay {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MinuteOfDay> for String {
    fn from(value: MinuteOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}
