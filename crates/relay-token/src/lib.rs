//! Token ledger module for the relayer.
//!
//! The relayer never holds balances itself. It moves funds through an
//! external ledger that exposes ERC-20 style `transferFrom` and `balanceOf`
//! operations, after the owner has approved the relayer as spender out of
//! band. This crate defines that capability and its implementations.

use async_trait::async_trait;
use relay_types::{Address, ConfigSchema, ImplementationRegistry, U256};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod memory;
}

/// Errors that can occur during token ledger operations.
#[derive(Debug, Error)]
pub enum TokenError {
	/// The owner's balance does not cover the requested amount.
	#[error("Insufficient funds: {owner} holds {balance} of {asset}, {required} required")]
	InsufficientFunds {
		owner: Address,
		asset: Address,
		balance: U256,
		required: U256,
	},
	/// The owner has not approved the spender for the requested amount.
	#[error("Not approved: {spender} may spend {allowance} of {owner}'s {asset}, {required} required")]
	NotApproved {
		owner: Address,
		spender: Address,
		asset: Address,
		allowance: U256,
		required: U256,
	},
	/// Error that occurs inside the ledger backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs when configuration is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Capability interface of an external token ledger.
#[async_trait]
pub trait TokenInterface: Send + Sync {
	/// Returns the configuration schema for this ledger implementation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Moves `amount` of `asset` from `owner` to `recipient` on behalf of
	/// `spender`, consuming `spender`'s allowance. Either the whole transfer
	/// happens or nothing changes.
	async fn transfer_from(
		&self,
		spender: Address,
		owner: Address,
		recipient: Address,
		asset: Address,
		amount: U256,
	) -> Result<(), TokenError>;

	/// Returns `owner`'s balance of `asset`.
	async fn balance_of(&self, owner: Address, asset: Address) -> Result<U256, TokenError>;
}

/// Type alias for token ledger factory functions.
pub type TokenFactory = fn(&toml::Value) -> Result<Box<dyn TokenInterface>, TokenError>;

/// Registry trait for token ledger implementations.
pub trait TokenRegistry: ImplementationRegistry<Factory = TokenFactory> {}

/// Get all registered token ledger implementations as (name, factory) pairs.
pub fn get_all_implementations() -> Vec<(&'static str, TokenFactory)> {
	use implementations::memory;

	vec![(memory::Registry::NAME, memory::Registry::factory())]
}

/// Service wrapping the configured token ledger.
pub struct TokenService {
	implementation: Box<dyn TokenInterface>,
}

impl TokenService {
	/// Creates a new TokenService with the specified implementation.
	pub fn new(implementation: Box<dyn TokenInterface>) -> Self {
		Self { implementation }
	}

	/// Executes an approved transfer.
	pub async fn transfer_from(
		&self,
		spender: Address,
		owner: Address,
		recipient: Address,
		asset: Address,
		amount: U256,
	) -> Result<(), TokenError> {
		self.implementation
			.transfer_from(spender, owner, recipient, asset, amount)
			.await
	}

	/// Returns `owner`'s balance of `asset`.
	pub async fn balance_of(&self, owner: Address, asset: Address) -> Result<U256, TokenError> {
		self.implementation.balance_of(owner, asset).await
	}
}
