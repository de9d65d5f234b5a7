use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;

use super::{
    minute_of_day::MinuteOfDay,
    status::OperatingStatus,
    window::{NightWindow, SabbathWindow},
};

/// Upper bound on closure-to-closure hops when looking for the real reopening.
const MAX_REOPENING_HOPS: usize = 4;

/// The store's weekly operating rules.
///
/// Rules are a priority chain: the Sabbath window is checked first, then the
/// night window, otherwise the store is open.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Schedule {
    sabbath: SabbathWindow,
    night: NightWindow,
}

impl Schedule {
    pub fn new(sabbath: SabbathWindow, night: NightWindow) -> Self {
        Self { sabbath, night }
    }

    pub fn sabbath(&self) -> &SabbathWindow {
        &self.sabbath
    }

    pub fn night(&self) -> &NightWindow {
        &self.night
    }

    pub fn compute_status(&self, timestamp: &DateTime<Tz>) -> OperatingStatus {
        let weekday = timestamp.weekday();
        let minute = MinuteOfDay::of(timestamp);
        if self.sabbath.contains(weekday, minute) {
            return OperatingStatus::SabbathClosed;
        }
        if self.night.contains(minute) {
            return OperatingStatus::NightClosed;
        }
        OperatingStatus::Open
    }

    /// When the closure described by `status` ends, as seen from `now`.
    ///
    /// `None` when `status` is `Open`.
    pub fn next_open_time(
        &self,
        status: OperatingStatus,
        now: &DateTime<Tz>,
    ) -> Option<DateTime<Tz>> {
        let today = now.date_naive();
        match status {
            OperatingStatus::Open => None,
            OperatingStatus::SabbathClosed => {
                let closing_day = SabbathWindow::CLOSING_DAY.num_days_from_monday();
                let days_ahead = (closing_day + 7 - now.weekday().num_days_from_monday()) % 7;
                let date = today.checked_add_days(Days::new(days_ahead as u64))?;
                Some(local_instant(&now.timezone(), date, self.sabbath.end()))
            }
            OperatingStatus::NightClosed => {
                let end = self.night.end();
                let date = if MinuteOfDay::of(now) < end {
                    today
                } else {
                    today.checked_add_days(Days::new(1))?
                };
                Some(local_instant(&now.timezone(), date, end))
            }
        }
    }

    /// The first instant after `now` at which the store is actually open.
    ///
    /// Differs from `next_open_time` only when one closure ends inside another,
    /// e.g. a night window ending after the Sabbath has started.
    pub fn next_reopening(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let mut candidate = self.next_open_time(self.compute_status(now), now)?;
        for _ in 0..MAX_REOPENING_HOPS {
            let status = self.compute_status(&candidate);
            match self.next_open_time(status, &candidate) {
                None => return Some(candidate),
                Some(next) => candidate = next,
            }
        }
        Some(candidate)
    }
}

/// Resolves a local date and time of day in `timezone`.
///
/// Ambiguous times take the earlier instant; times skipped by a DST jump move
/// forward to the first valid local minute.
fn local_instant(timezone: &Tz, date: NaiveDate, minute: MinuteOfDay) -> DateTime<Tz> {
    let naive = date.and_time(minute.to_naive_time());
    if let Some(instant) = timezone.from_local_datetime(&naive).earliest() {
        return instant;
    }
    (1..=180)
        .find_map(|offset| {
            timezone
                .from_local_datetime(&(naive + Duration::minutes(offset)))
                .earliest()
        })
        .unwrap_or_else(|| timezone.from_utc_datetime(&naive))
}
