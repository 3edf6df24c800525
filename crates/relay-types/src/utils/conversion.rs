//! Conversions from configuration strings to typed values.

use alloy_primitives::Address;
use std::str::FromStr;

/// Parses a hex address, with or without `0x` prefix.
pub fn parse_address(value: &str) -> Result<Address, String> {
	let hex = super::with_0x_prefix(value.trim());
	Address::from_str(&hex).map_err(|e| format!("Invalid address '{}': {}", value, e))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_address() {
		let a = parse_address("0x5FbDB2315678afecb367f032d93F642f64180aa3").unwrap();
		let b = parse_address("5fbdb2315678afecb367f032d93f642f64180aa3").unwrap();
		assert_eq!(a, b);
		assert!(parse_address("0x1234").is_err());
	}
}
