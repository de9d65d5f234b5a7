use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingStatus {
    Open,
    NightClosed,
    SabbathClosed,
}

impl OperatingStatus {
    pub const ALL: [OperatingStatus; 3] = [
        OperatingStatus::Open,
        OperatingStatus::NightClosed,
        OperatingStatus::SabbathClosed,
    ];

    pub fn is_open(&self) -> bool {
        matches!(self, OperatingStatus::Open)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingStatus::Open => "open",
            OperatingStatus::NightClosed => "night_closed",
            OperatingStatus::SabbathClosed => "sabbath_closed",
        }
    }
}

impl fmt::Display for OperatingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
