//! Store-hours gate for the FadVendas marketplace.
//!
//! Works out whether the store is open, closed for the night or closed for the
//! Sabbath, and whether the cart and checkout may be used right now.

pub mod cart;
pub mod error;
pub mod gate;
pub mod server;
pub mod timing;

pub use error::{ConfigError, GateError, GatedOperation};
pub use gate::{
    config::GateConfig,
    gate::{GateSnapshot, StatusChange, StoreHoursGate},
    message::{status_message, StatusMessage},
    status::OperatingStatus,
};
pub use timing::{
    clock::{Clock, ManualClock, SystemClock},
    minute_of_day::MinuteOfDay,
    schedule::Schedule,
    window::{NightWindow, SabbathWindow},
};
