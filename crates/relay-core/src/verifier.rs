//! Signature recovery and verification.
//!
//! Signatures are 65-byte secp256k1 `r || s || v` values over the EIP-191
//! personal-message hash of an authorization digest, the form produced by
//! `eth_sign`/`personal_sign` wallets when asked to sign the raw 32 digest
//! bytes. Only the canonical low-`s` form is accepted.

use alloy_primitives::{eip191_hash_message, hex, Address, Signature as EcdsaSignature, U256};
use relay_types::{Digest, Signature, SIGNATURE_LEN};
use thiserror::Error;

/// Errors produced while recovering a signer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
	/// The signature bytes are structurally invalid.
	#[error("Malformed signature: {0}")]
	Malformed(String),
	/// The signature is well formed but no public key can be derived from it.
	#[error("Signature recovery failed: {0}")]
	RecoveryFailure(String),
}

/// secp256k1 group order `n`.
fn curve_order() -> U256 {
	U256::from_be_bytes(hex!(
		"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141"
	))
}

/// Recovers and checks the identity behind authorization signatures.
#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureVerifier;

impl SignatureVerifier {
	pub fn new() -> Self {
		Self
	}

	/// Recovers the address that signed `digest`.
	pub fn recover(&self, digest: &Digest, signature: &Signature) -> Result<Address, SignatureError> {
		let parsed = parse_signature(signature.as_slice())?;
		let prehash = eip191_hash_message(digest.as_slice());
		parsed
			.recover_address_from_prehash(&prehash)
			.map_err(|e| SignatureError::RecoveryFailure(e.to_string()))
	}

	/// Returns true iff `signature` recovers to `claimed_signer`.
	///
	/// A signature that cannot be recovered is treated as not matching.
	/// Structurally malformed signatures are still reported as errors so
	/// callers can distinguish bad input from a forged authorization.
	pub fn verify(
		&self,
		digest: &Digest,
		signature: &Signature,
		claimed_signer: Address,
	) -> Result<bool, SignatureError> {
		match self.recover(digest, signature) {
			Ok(recovered) => Ok(recovered == claimed_signer),
			Err(SignatureError::RecoveryFailure(reason)) => {
				tracing::debug!(reason = %reason, "Signature recovery failed");
				Ok(false)
			},
			Err(e) => Err(e),
		}
	}
}

/// Validates the raw layout and component ranges, then builds the ECDSA value.
fn parse_signature(bytes: &[u8]) -> Result<EcdsaSignature, SignatureError> {
	if bytes.len() != SIGNATURE_LEN {
		return Err(SignatureError::Malformed(format!(
			"expected {} bytes, got {}",
			SIGNATURE_LEN,
			bytes.len()
		)));
	}

	let v = bytes[64];
	if !matches!(v, 0 | 1 | 27 | 28) {
		return Err(SignatureError::Malformed(format!("invalid recovery id {}", v)));
	}

	let order = curve_order();
	let r = U256::from_be_slice(&bytes[0..32]);
	let s = U256::from_be_slice(&bytes[32..64]);
	if r.is_zero() || r >= order {
		return Err(SignatureError::Malformed("r out of range".to_string()));
	}
	if s.is_zero() || s >= order {
		return Err(SignatureError::Malformed("s out of range".to_string()));
	}
	// High-s values are the malleable twin of a valid signature
	if s > order >> 1 {
		return Err(SignatureError::Malformed("s in upper half of curve order".to_string()));
	}

	EcdsaSignature::try_from(bytes).map_err(|e| SignatureError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use relay_account::{implementations::local::LocalAccount, AccountService};
	use relay_types::{Authorization, MessageCodec};

	fn authorization(sender: Address, recipient: Address) -> Authorization {
		Authorization::new(
			sender,
			U256::from(10u64),
			recipient,
			Address::repeat_byte(0xaa),
			U256::ZERO,
		)
	}

	async fn signed(auth: &Authorization, account: &AccountService) -> Signature {
		account
			.sign_digest(&MessageCodec::digest(auth))
			.await
			.unwrap()
	}

	fn new_account() -> (AccountService, Address) {
		let local = LocalAccount::random();
		let address = local.signer_address();
		(AccountService::new(Box::new(local)), address)
	}

	#[tokio::test]
	async fn test_recovers_signer() {
		let (account, address) = new_account();
		let auth = authorization(address, Address::repeat_byte(0x02));
		let signature = signed(&auth, &account).await;

		let verifier = SignatureVerifier::new();
		let digest = MessageCodec::digest(&auth);
		assert_eq!(verifier.recover(&digest, &signature).unwrap(), address);
		assert!(verifier.verify(&digest, &signature, address).unwrap());
	}

	#[tokio::test]
	async fn test_rejects_other_claimed_signer() {
		let (account, address) = new_account();
		let auth = authorization(address, Address::repeat_byte(0x02));
		let signature = signed(&auth, &account).await;

		let digest = MessageCodec::digest(&auth);
		assert!(!SignatureVerifier::new()
			.verify(&digest, &signature, Address::repeat_byte(0x03))
			.unwrap());
	}

	#[tokio::test]
	async fn test_tampered_recipient_does_not_verify() {
		let (account, address) = new_account();
		let signed_auth = authorization(address, Address::repeat_byte(0x02));
		let signature = signed(&signed_auth, &account).await;

		let tampered = Authorization {
			recipient: Address::repeat_byte(0x04),
			..signed_auth
		};
		assert!(!SignatureVerifier::new()
			.verify(&MessageCodec::digest(&tampered), &signature, address)
			.unwrap());
	}

	#[tokio::test]
	async fn test_legacy_and_raw_v_both_accepted() {
		let (account, address) = new_account();
		let auth = authorization(address, Address::repeat_byte(0x02));
		let digest = MessageCodec::digest(&auth);
		let mut bytes = signed(&auth, &account).await.as_slice().to_vec();

		let verifier = SignatureVerifier::new();
		bytes[64] = if bytes[64] >= 27 { bytes[64] - 27 } else { bytes[64] };
		assert!(verifier
			.verify(&digest, &Signature::from(bytes.clone()), address)
			.unwrap());
		bytes[64] += 27;
		assert!(verifier
			.verify(&digest, &Signature::from(bytes), address)
			.unwrap());
	}

	#[test]
	fn test_wrong_length_is_malformed() {
		let verifier = SignatureVerifier::new();
		for len in [0usize, 64, 66] {
			let err = verifier
				.recover(&Digest::ZERO, &Signature::from(vec![1u8; len]))
				.unwrap_err();
			assert!(matches!(err, SignatureError::Malformed(_)));
		}
	}

	#[test]
	fn test_bad_recovery_id_is_malformed() {
		let mut bytes = vec![0u8; 65];
		bytes[31] = 1;
		bytes[63] = 1;
		bytes[64] = 29;
		assert!(matches!(
			SignatureVerifier::new().recover(&Digest::ZERO, &Signature::from(bytes)),
			Err(SignatureError::Malformed(_))
		));
	}

	#[test]
	fn test_out_of_range_components_are_malformed() {
		let order = curve_order().to_be_bytes::<32>();
		let one = U256::from(1u64).to_be_bytes::<32>();
		let verifier = SignatureVerifier::new();

		let cases: [([u8; 32], [u8; 32]); 3] = [([0u8; 32], one), (order, one), (one, order)];
		for (r, s) in cases {
			let mut bytes = Vec::with_capacity(65);
			bytes.extend_from_slice(&r);
			bytes.extend_from_slice(&s);
			bytes.push(27);
			assert!(matches!(
				verifier.recover(&Digest::ZERO, &Signature::from(bytes)),
				Err(SignatureError::Malformed(_))
			));
		}
	}

	#[tokio::test]
	async fn test_high_s_is_malformed() {
		let (account, address) = new_account();
		let auth = authorization(address, Address::repeat_byte(0x02));
		let bytes = signed(&auth, &account).await.as_slice().to_vec();

		// Flip to the malleable (n - s, !v) twin of a valid signature
		let s = U256::from_be_slice(&bytes[32..64]);
		let mut twin = bytes[..32].to_vec();
		twin.extend_from_slice(&(curve_order() - s).to_be_bytes::<32>());
		twin.push(if bytes[64] % 2 == 0 { bytes[64] + 1 } else { bytes[64] - 1 });

		assert!(matches!(
			SignatureVerifier::new().verify(
				&MessageCodec::digest(&auth),
				&Signature::from(twin),
				address
			),
			Err(SignatureError::Malformed(_))
		));
	}

	#[test]
	fn test_unrecoverable_point_is_recovery_failure() {
		// No curve point has x = 5, so recovery cannot produce a key
		let mut bytes = vec![0u8; 65];
		bytes[31] = 5;
		bytes[63] = 1;
		bytes[64] = 27;
		let signature = Signature::from(bytes);
		let verifier = SignatureVerifier::new();

		assert!(matches!(
			verifier.recover(&Digest::repeat_byte(0x42), &signature),
			Err(SignatureError::RecoveryFailure(_))
		));
		assert!(!verifier
			.verify(&Digest::repeat_byte(0x42), &signature, Address::ZERO)
			.unwrap());
	}
}
