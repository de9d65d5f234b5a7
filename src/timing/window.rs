use chrono::Weekday;
use serde::Serialize;

use super::minute_of_day::MinuteOfDay;
use crate::error::ConfigError;

/// Weekly closure from Friday at `start` until Saturday at `end`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SabbathWindow {
    start: MinuteOfDay,
    end: MinuteOfDay,
}

impl SabbathWindow {
    pub const OPENING_DAY: Weekday = Weekday::Fri;
    pub const CLOSING_DAY: Weekday = Weekday::Sat;

    pub fn new(start: MinuteOfDay, end: MinuteOfDay) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> MinuteOfDay {
        self.start
    }

    pub fn end(&self) -> MinuteOfDay {
        self.end
    }

    pub fn contains(&self, weekday: Weekday, minute: MinuteOfDay) -> bool {
        (weekday == Self::OPENING_DAY && minute >= self.start)
            || (weekday == Self::CLOSING_DAY && minute < self.end)
    }
}

impl Default for SabbathWindow {
    /// Friday 18:00 through Saturday 18:00.
    fn default() -> Self {
        Self {
            start: MinuteOfDay::from_hm_const(18, 0),
            end: MinuteOfDay::from_hm_const(18, 0),
        }
    }
}

/// Nightly closure `[start, end)`. Spans midnight when `start > end`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NightWindow {
    start: MinuteOfDay,
    end: MinuteOfDay,
}

impl NightWindow {
    /// 23:30 until 06:00 the next morning.
    pub const LATE_NIGHT: NightWindow = NightWindow {
        start: MinuteOfDay::from_hm_const(23, 30),
        end: MinuteOfDay::from_hm_const(6, 0),
    };

    /// 01:00 until 06:00.
    pub const SMALL_HOURS: NightWindow = NightWindow {
        start: MinuteOfDay::from_hm_const(1, 0),
        end: MinuteOfDay::from_hm_const(6, 0),
    };

    pub fn new(start: MinuteOfDay, end: MinuteOfDay) -> Result<Self, ConfigError> {
        if start == end {
            return Err(ConfigError::EmptyNightWindow(start.to_string()));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> MinuteOfDay {
        self.start
    }

    pub fn end(&self) -> MinuteOfDay {
        self.end
    }

    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, minute: MinuteOfDay) -> bool {
        if self.wraps_midnight() {
            minute >= self.start || minute < self.end
        } else {
            self.start <= minute && minute < self.end
        }
    }
}
