use std::sync::Mutex;

use chrono::{DateTime, Duration, Local};
use chrono_tz::Tz;

use crate::error::ConfigError;

/// Source of the current wall-clock time, already in the store's timezone.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Tz>;
}

pub fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.parse::<Tz>()
        .map_err(|_| ConfigError::UnknownTimezone(name.to_string()))
}

/// Reads the system clock and converts it into the configured timezone.
#[derive(Copy, Clone, Debug)]
pub struct SystemClock {
    timezone: Tz,
}

impl SystemClock {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Local::now().with_timezone(&self.timezone)
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Tz>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Tz>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Tz>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Tz> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::America::Sao_Paulo;

    use super::*;

    #[test]
    fn unknown_timezone_is_a_config_error() {
        assert!(parse_timezone("America/Sao_Paulo").is_ok());
        assert!(matches!(
            parse_timezone("Mars/Olympus_Mons"),
            Err(ConfigError::UnknownTimezone(_))
        ));
    }

    #[test]
    fn system_clock_reports_in_configured_zone() {
        let clock = SystemClock::new(Sao_Paulo);
        assert_eq!(clock.now().timezone(), Sao_Paulo);
    }

    #[test]
    fn manual_clock_moves_only_when_told() {
        let start = Sao_Paulo.with_ymd_and_hms(2025, 1, 3, 17, 59, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(Duration::minutes(1));
        assert_eq!(clock.now(), start + Duration::minutes(1));
    }
}
