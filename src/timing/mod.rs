pub mod clock;
pub mod minute_of_day;
pub mod schedule;
pub mod status;
pub mod window;
