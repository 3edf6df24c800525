//! Formatting helpers for log output.

/// Truncates a hex identifier for display, keeping the first 8 characters.
pub fn truncate_id(id: &str) -> String {
	if id.len() <= 8 {
		id.to_string()
	} else {
		format!("{}..", &id[..8])
	}
}

/// Adds a `0x` prefix unless one is already present.
pub fn with_0x_prefix(hex: &str) -> String {
	if hex.starts_with("0x") {
		hex.to_string()
	} else {
		format!("0x{}", hex)
	}
}

/// Strips a leading `0x` if present.
pub fn without_0x_prefix(hex: &str) -> &str {
	hex.strip_prefix("0x").unwrap_or(hex)
}
