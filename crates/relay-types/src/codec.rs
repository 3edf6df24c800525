//! Canonical encoding of transfer authorizations.
//!
//! The layout matches Solidity's `abi.encodePacked(sender, amount, recipient,
//! asset, nonce)` for `(address, uint256, address, address, uint256)`:
//!
//! ```text
//! offset  size  field
//!      0    20  sender
//!     20    32  amount     (big-endian)
//!     52    20  recipient
//!     72    20  asset
//!     92    32  nonce      (big-endian)
//! ```
//!
//! Every field is fixed width, so two distinct authorizations can never share
//! an encoding. The digest is keccak256 over these 124 bytes.

use crate::authorization::{Authorization, Digest};
use alloy_primitives::{keccak256, Address, U256};

/// Total length of an encoded authorization.
pub const ENCODED_LEN: usize = 20 + 32 + 20 + 20 + 32;

/// Minimal packed encoder for the static field types of an authorization.
pub struct PackedEncoder {
	buf: Vec<u8>,
}

impl Default for PackedEncoder {
	fn default() -> Self {
		Self::new()
	}
}

impl PackedEncoder {
	pub fn new() -> Self {
		Self {
			buf: Vec::with_capacity(ENCODED_LEN),
		}
	}

	pub fn push_address(&mut self, addr: &Address) {
		self.buf.extend_from_slice(addr.as_slice());
	}

	pub fn push_u256(&mut self, v: U256) {
		let word: [u8; 32] = v.to_be_bytes::<32>();
		self.buf.extend_from_slice(&word);
	}

	pub fn finish(self) -> Vec<u8> {
		self.buf
	}
}

/// Encodes authorizations and computes their digests.
pub struct MessageCodec;

impl MessageCodec {
	/// Returns the canonical byte encoding of an authorization.
	pub fn encode(authorization: &Authorization) -> Vec<u8> {
		let mut enc = PackedEncoder::new();
		enc.push_address(&authorization.sender);
		enc.push_u256(authorization.amount);
		enc.push_address(&authorization.recipient);
		enc.push_address(&authorization.asset);
		enc.push_u256(authorization.nonce);
		enc.finish()
	}

	/// Returns keccak256 of the canonical encoding.
	pub fn digest(authorization: &Authorization) -> Digest {
		keccak256(Self::encode(authorization))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;
	use std::collections::HashSet;

	fn sample() -> Authorization {
		Authorization::new(
			address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"),
			U256::from(10u64),
			address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"),
			address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
			U256::ZERO,
		)
	}

	#[test]
	fn test_encoding_layout() {
		let auth = sample();
		let encoded = MessageCodec::encode(&auth);

		assert_eq!(encoded.len(), ENCODED_LEN);
		assert_eq!(&encoded[0..20], auth.sender.as_slice());
		assert_eq!(&encoded[20..52], &U256::from(10u64).to_be_bytes::<32>());
		assert_eq!(encoded[51], 10);
		assert_eq!(&encoded[52..72], auth.recipient.as_slice());
		assert_eq!(&encoded[72..92], auth.asset.as_slice());
		assert!(encoded[92..124].iter().all(|b| *b == 0));
	}

	#[test]
	fn test_digest_is_keccak_of_encoding() {
		let auth = sample();
		assert_eq!(
			MessageCodec::digest(&auth),
			keccak256(MessageCodec::encode(&auth))
		);
	}

	#[test]
	fn test_digest_is_deterministic() {
		let auth = sample();
		let first = MessageCodec::digest(&auth);
		for _ in 0..10 {
			assert_eq!(MessageCodec::digest(&auth), first);
		}
	}

	#[test]
	fn test_every_field_changes_digest() {
		let base = sample();
		let other = address!("90F79bf6EB2c4f870365E785982E1f101E93b906");

		let variants = [
			Authorization { sender: other, ..base },
			Authorization {
				amount: U256::from(11u64),
				..base
			},
			Authorization {
				recipient: other,
				..base
			},
			Authorization { asset: other, ..base },
			Authorization {
				nonce: U256::from(1u64),
				..base
			},
		];

		let mut digests = HashSet::new();
		digests.insert(MessageCodec::digest(&base));
		for variant in &variants {
			assert!(digests.insert(MessageCodec::digest(variant)));
		}
		assert_eq!(digests.len(), 6);
	}

	#[test]
	fn test_no_collisions_across_nonce_range() {
		let base = sample();
		let digests: HashSet<_> = (0u64..512)
			.map(|n| {
				MessageCodec::digest(&Authorization {
					nonce: U256::from(n),
					..base
				})
			})
			.collect();
		assert_eq!(digests.len(), 512);
	}

	#[test]
	fn test_swapping_sender_and_recipient_changes_digest() {
		let base = sample();
		let swapped = Authorization {
			sender: base.recipient,
			recipient: base.sender,
			..base
		};
		assert_ne!(MessageCodec::digest(&base), MessageCodec::digest(&swapped));
	}
}
