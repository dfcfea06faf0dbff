//! Utility functions for display formatting.

pub mod format;

pub use format::{format_amount, format_date, format_optional, format_signed_amount, truncate_string};
