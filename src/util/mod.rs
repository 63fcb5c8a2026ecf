//! Utility functions module
//! 
//! Contains helpers for Unix-time conversion, calendar arithmetic,
//! rounding and great-circle distances.

pub mod numeric;
pub mod time;

// Re-export commonly used functions
pub use numeric::{haversine, haversine_many, round_to_base, DistanceUnit};
pub use time::{from_unixtime, month_delta, to_unixtime, to_unixtime_in};
