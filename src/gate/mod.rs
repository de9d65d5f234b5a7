pub mod config;
pub mod gate;
pub mod message;
pub mod overlay;
pub mod poller;

pub use crate::timing::status;
