//! Utility functions for display formatting.

pub mod format;

pub use format::{format_date, format_number, format_percent, percentage_change, truncate_string};
