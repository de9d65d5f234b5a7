use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

use crate::gate::{
    message::{status_message, StatusMessage},
    status::OperatingStatus,
};

/// Body of `/api/status/at`: what the gate would say at an arbitrary local time.
///
/// Pure preview, it does not touch the gate's cached state.
#[derive(Serialize, Clone, Debug)]
pub struct StatusPreview {
    time: DateTime<Tz>,
    status: OperatingStatus,
    message: StatusMessage,
    next_open_time: Option<DateTime<Tz>>,
}

impl StatusPreview {
    pub fn new(
        time: DateTime<Tz>,
        status: OperatingStatus,
        next_open_time: Option<DateTime<Tz>>,
    ) -> Self {
        Self {
            time,
            status,
            message: status_message(status),
            next_open_time,
        }
    }
}
