use std::{path::Path, time::Duration};

use chrono_tz::Tz;
use serde::Deserialize;

use crate::{
    error::ConfigError,
    timing::{
        clock::parse_timezone,
        minute_of_day::MinuteOfDay,
        schedule::Schedule,
        window::{NightWindow, SabbathWindow},
    },
};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 60_000;
pub const DEFAULT_TIMEZONE: &str = "America/Sao_Paulo";

/// Gate settings. Times are `"HH:MM"` in the store's local timezone.
///
/// The night window has no default: both `23:30-06:00` and `01:00-06:00` are
/// in use and the integrator has to pick one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_sabbath_bound")]
    pub sabbath_start: MinuteOfDay,
    #[serde(default = "default_sabbath_bound")]
    pub sabbath_end: MinuteOfDay,
    pub night_start: MinuteOfDay,
    pub night_end: MinuteOfDay,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_sabbath_bound() -> MinuteOfDay {
    SabbathWindow::default().start()
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

impl GateConfig {
    /// Default Sabbath, poll interval and timezone around the given night window.
    pub fn new(night: NightWindow) -> Self {
        let sabbath = SabbathWindow::default();
        Self {
            sabbath_start: sabbath.start(),
            sabbath_end: sabbath.end(),
            night_start: night.start(),
            night_end: night.end(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timezone: default_timezone(),
        }
    }

    pub fn from_config(config: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(config)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_config(&contents)
    }

    /// Reads `FADVENDAS_CONFIG` (a JSON file) if set, otherwise the individual
    /// `FADVENDAS_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("FADVENDAS_CONFIG") {
            return Self::from_file(path);
        }
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let time = |name: &'static str| -> Result<Option<MinuteOfDay>, ConfigError> {
            var(name).map(|value| value.parse()).transpose()
        };
        let config = Self {
            sabbath_start: time("FADVENDAS_SABBATH_START")?.unwrap_or_else(default_sabbath_bound),
            sabbath_end: time("FADVENDAS_SABBATH_END")?.unwrap_or_else(default_sabbath_bound),
            night_start: time("FADVENDAS_NIGHT_START")?
                .ok_or(ConfigError::Missing("FADVENDAS_NIGHT_START"))?,
            night_end: time("FADVENDAS_NIGHT_END")?
                .ok_or(ConfigError::Missing("FADVENDAS_NIGHT_END"))?,
            poll_interval_ms: match var("FADVENDAS_POLL_INTERVAL_MS") {
                None => DEFAULT_POLL_INTERVAL_MS,
                Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                    name: "FADVENDAS_POLL_INTERVAL_MS",
                    value,
                })?,
            },
            timezone: var("FADVENDAS_TIMEZONE").unwrap_or_else(default_timezone),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.schedule()?;
        self.poll_interval()?;
        self.timezone()?;
        Ok(())
    }

    pub fn schedule(&self) -> Result<Schedule, ConfigError> {
        let night = NightWindow::new(self.night_start, self.night_end)?;
        let sabbath = SabbathWindow::new(self.sabbath_start, self.sabbath_end);
        Ok(Schedule::new(sabbath, night))
    }

    pub fn poll_interval(&self) -> Result<Duration, ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(Duration::from_millis(self.poll_interval_ms))
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        parse_timezone(&self.timezone)
    }
}
