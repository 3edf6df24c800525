//! Authorization types for signed token transfers.
//!
//! An [`Authorization`] is the tuple a token owner signs off-chain. It is
//! immutable once built and only ever exists as call input; the relayer never
//! persists it, only the consumption state derived from it.

use crate::api::u256_serde;
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-width account identifier.
pub type Identity = Address;

/// 32-byte hash of an authorization's canonical encoding.
pub type Digest = B256;

/// Length in bytes of a recoverable secp256k1 signature (`r || s || v`).
pub const SIGNATURE_LEN: usize = 65;

/// A transfer authorization signed by `sender`.
///
/// Two authorizations are equivalent iff all five fields match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Authorization {
	/// Owner of the funds and expected signer.
	pub sender: Address,
	/// Amount of `asset` to move, in the asset's base units.
	#[serde(with = "u256_serde")]
	pub amount: U256,
	/// Account receiving the funds.
	pub recipient: Address,
	/// Token contract the amount is denominated in.
	pub asset: Address,
	/// Per-signer tag distinguishing this authorization from earlier ones.
	#[serde(with = "u256_serde")]
	pub nonce: U256,
}

impl Authorization {
	/// Creates a new authorization.
	pub fn new(
		sender: Address,
		amount: U256,
		recipient: Address,
		asset: Address,
		nonce: U256,
	) -> Self {
		Self {
			sender,
			amount,
			recipient,
			asset,
			nonce,
		}
	}
}

/// Raw signature bytes as received from a relayer.
///
/// The bytes are not validated on construction; structural checks happen at
/// verification time so malformed input can be reported precisely.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(pub Bytes);

impl Signature {
	/// Returns the signature bytes.
	pub fn as_slice(&self) -> &[u8] {
		self.0.as_ref()
	}

	/// Returns the number of bytes in the signature.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true if the signature carries no bytes.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl From<[u8; SIGNATURE_LEN]> for Signature {
	fn from(bytes: [u8; SIGNATURE_LEN]) -> Self {
		Self(Bytes::copy_from_slice(&bytes))
	}
}

impl From<Vec<u8>> for Signature {
	fn from(bytes: Vec<u8>) -> Self {
		Self(Bytes::from(bytes))
	}
}

impl fmt::Debug for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Signature({})", self.0)
	}
}

/// Record of a relayed transfer returned to the relayer on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
	/// Digest of the consumed authorization.
	pub digest: B256,
	/// Account the funds were taken from.
	pub sender: Address,
	/// Account the funds were sent to.
	pub recipient: Address,
	/// Token contract that moved the funds.
	pub asset: Address,
	/// Amount transferred.
	#[serde(with = "u256_serde")]
	pub amount: U256,
	/// Nonce of the consumed authorization.
	#[serde(with = "u256_serde")]
	pub nonce: U256,
	/// Identity of the executor that acted as spender.
	pub relayer: Address,
}

impl TransferReceipt {
	/// Builds a receipt for an executed authorization.
	pub fn new(authorization: &Authorization, digest: B256, relayer: Address) -> Self {
		Self {
			digest,
			sender: authorization.sender,
			recipient: authorization.recipient,
			asset: authorization.asset,
			amount: authorization.amount,
			nonce: authorization.nonce,
			relayer,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	#[test]
	fn test_authorization_json_uses_decimal_amounts() {
		let auth = Authorization::new(
			address!("70997970C51812dc3A010C7d01b50e0d17dc79C8"),
			U256::from(10_000_000_000_000_000_000u128),
			address!("3C44CdDdB6a900fa2b585dd299e03d12FA4293BC"),
			address!("5FbDB2315678afecb367f032d93F642f64180aa3"),
			U256::from(7u64),
		);

		let json = serde_json::to_value(auth).unwrap();
		assert_eq!(json["amount"], "10000000000000000000");
		assert_eq!(json["nonce"], "7");

		let parsed: Authorization = serde_json::from_value(json).unwrap();
		assert_eq!(parsed, auth);
	}

	#[test]
	fn test_signature_serializes_as_hex() {
		let sig = Signature::from(vec![0xab, 0xcd]);
		let json = serde_json::to_string(&sig).unwrap();
		assert_eq!(json, "\"0xabcd\"");
		assert_eq!(sig.len(), 2);
	}
}
