//! Replay-protection policy selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Strategy used to reject replayed authorizations.
///
/// The two policies are mutually exclusive; a store is bound to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayPolicy {
	/// One counter per signer. An authorization is accepted only when its
	/// nonce equals the counter, which then advances by one.
	#[default]
	SequentialNonce,
	/// Set of consumed digests per signer. Any nonce value is usable and
	/// authorizations may be executed in any order.
	DigestSet,
}

impl ReplayPolicy {
	/// Returns the configuration name of the policy.
	pub fn as_str(&self) -> &'static str {
		match self {
			ReplayPolicy::SequentialNonce => "sequential_nonce",
			ReplayPolicy::DigestSet => "digest_set",
		}
	}
}

impl fmt::Display for ReplayPolicy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for ReplayPolicy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"sequential_nonce" => Ok(Self::SequentialNonce),
			"digest_set" => Ok(Self::DigestSet),
			other => Err(format!("Unknown replay policy: {}", other)),
		}
	}
}
