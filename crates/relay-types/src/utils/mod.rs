//! Utility functions for common conversions and string formatting.

pub mod conversion;
pub mod formatting;

pub use conversion::parse_address;
pub use formatting::{truncate_id, with_0x_prefix, without_0x_prefix};
