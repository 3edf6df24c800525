//! Local private-key account.
//!
//! Holds a secp256k1 key in process memory. Intended for the relayer's own
//! spender identity and for client tooling and tests that need to produce
//! authorization signatures.

use crate::{AccountError, AccountFactory, AccountInterface, AccountRegistry};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use relay_types::{
	Address, ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, SecretString,
	Signature, ValidationError, without_0x_prefix,
};

/// Account backed by an in-memory private key.
pub struct LocalAccount {
	signer: PrivateKeySigner,
}

impl LocalAccount {
	/// Creates an account from a hex private key (with or without `0x`).
	pub fn new(private_key: &SecretString) -> Result<Self, AccountError> {
		let signer = private_key.with_exposed(|key| {
			key.trim()
				.parse::<PrivateKeySigner>()
				.map_err(|e| AccountError::InvalidKey(e.to_string()))
		})?;
		Ok(Self { signer })
	}

	/// Creates an account with a freshly generated key.
	pub fn random() -> Self {
		Self {
			signer: PrivateKeySigner::random(),
		}
	}

	/// Returns the account address without going through the async interface.
	pub fn signer_address(&self) -> Address {
		self.signer.address()
	}
}

#[async_trait]
impl AccountInterface for LocalAccount {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LocalAccountSchema)
	}

	async fn address(&self) -> Result<Address, AccountError> {
		Ok(self.signer.address())
	}

	async fn sign_message(&self, message: &[u8]) -> Result<Signature, AccountError> {
		let signature = self
			.signer
			.sign_message_sync(message)
			.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
		Ok(Signature::from(signature.as_bytes()))
	}
}

/// Configuration schema for LocalAccount.
pub struct LocalAccountSchema;

impl ConfigSchema for LocalAccountSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("private_key", FieldType::String).with_validator(|value| {
					let key = without_0x_prefix(value.as_str().unwrap_or_default().trim());
					match hex::decode(key) {
						Ok(bytes) if bytes.len() == 32 => Ok(()),
						_ => Err("private_key must be 32 bytes of hex".to_string()),
					}
				}),
			],
			vec![],
		);
		schema.validate(config)
	}
}

/// Factory function to create a local account from configuration.
///
/// Configuration parameters:
/// - `private_key`: 32-byte hex secp256k1 key
pub fn create_account(config: &toml::Value) -> Result<Box<dyn AccountInterface>, AccountError> {
	LocalAccountSchema
		.validate(config)
		.map_err(|e| AccountError::InvalidKey(e.to_string()))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.map(SecretString::from)
		.ok_or_else(|| AccountError::InvalidKey("private_key is required".to_string()))?;

	Ok(Box::new(LocalAccount::new(&private_key)?))
}

/// Registry for the local account implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "local";
	type Factory = AccountFactory;

	fn factory() -> Self::Factory {
		create_account
	}
}

impl AccountRegistry for Registry {}
