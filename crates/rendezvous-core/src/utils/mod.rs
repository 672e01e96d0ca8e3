//! Utility functions for display formatting and input parsing.

pub mod format;

// Re-export commonly used functions at module level
pub use format::{format_meeting_time, format_relative, parse_interests, truncate};
