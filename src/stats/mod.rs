//! Error statistics module
//!
//! Goodness-of-fit measures comparing a forecast against observed values.

pub mod error_stats;

// Re-export commonly used functions
pub use error_stats::{pearson_coefficient, r_squared, wmape, ErrorSummary};
