//! In-memory token ledger.
//!
//! Mirrors ERC-20 semantics: balances per (asset, owner), allowances per
//! (asset, owner, spender), `transferFrom` consumes allowance unless it is the
//! `U256::MAX` infinite approval. Handles are cheap to clone and share state,
//! so a test can keep one to mint and approve while the executor owns another.

use crate::{TokenError, TokenFactory, TokenInterface, TokenRegistry};
use async_trait::async_trait;
use relay_types::{
	Address, ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError, U256,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Default)]
struct LedgerState {
	balances: HashMap<(Address, Address), U256>,
	allowances: HashMap<(Address, Address, Address), U256>,
}

/// In-memory ERC-20 style ledger covering any number of assets.
#[derive(Clone, Default)]
pub struct MemoryToken {
	state: Arc<Mutex<LedgerState>>,
}

impl MemoryToken {
	pub fn new() -> Self {
		Self::default()
	}

	/// Credits `amount` of `asset` to `owner`.
	pub async fn mint(&self, asset: Address, owner: Address, amount: U256) -> Result<(), TokenError> {
		let mut state = self.state.lock().await;
		let balance = state.balances.entry((asset, owner)).or_default();
		*balance = balance
			.checked_add(amount)
			.ok_or_else(|| TokenError::Backend("Balance overflow".to_string()))?;
		Ok(())
	}

	/// Sets `spender`'s allowance over `owner`'s `asset`. Called by the owner
	/// directly, never through a relayed authorization.
	pub async fn approve(&self, asset: Address, owner: Address, spender: Address, amount: U256) {
		let mut state = self.state.lock().await;
		state.allowances.insert((asset, owner, spender), amount);
	}

	/// Returns `spender`'s remaining allowance over `owner`'s `asset`.
	pub async fn allowance(&self, asset: Address, owner: Address, spender: Address) -> U256 {
		let state = self.state.lock().await;
		state
			.allowances
			.get(&(asset, owner, spender))
			.copied()
			.unwrap_or_default()
	}
}

#[async_trait]
impl TokenInterface for MemoryToken {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryTokenSchema)
	}

	async fn transfer_from(
		&self,
		spender: Address,
		owner: Address,
		recipient: Address,
		asset: Address,
		amount: U256,
	) -> Result<(), TokenError> {
		let mut state = self.state.lock().await;

		let allowance = state
			.allowances
			.get(&(asset, owner, spender))
			.copied()
			.unwrap_or_default();
		if allowance < amount {
			return Err(TokenError::NotApproved {
				owner,
				spender,
				asset,
				allowance,
				required: amount,
			});
		}

		let balance = state
			.balances
			.get(&(asset, owner))
			.copied()
			.unwrap_or_default();
		if balance < amount {
			return Err(TokenError::InsufficientFunds {
				owner,
				asset,
				balance,
				required: amount,
			});
		}

		if owner != recipient {
			let recipient_balance = state
				.balances
				.get(&(asset, recipient))
				.copied()
				.unwrap_or_default();
			let credited = recipient_balance
				.checked_add(amount)
				.ok_or_else(|| TokenError::Backend("Balance overflow".to_string()))?;
			state.balances.insert((asset, owner), balance - amount);
			state.balances.insert((asset, recipient), credited);
		}

		if allowance != U256::MAX {
			state
				.allowances
				.insert((asset, owner, spender), allowance - amount);
		}

		tracing::debug!(
			asset = %asset,
			from = %owner,
			to = %recipient,
			amount = %amount,
			"Transferred"
		);
		Ok(())
	}

	async fn balance_of(&self, owner: Address, asset: Address) -> Result<U256, TokenError> {
		let state = self.state.lock().await;
		Ok(state
			.balances
			.get(&(asset, owner))
			.copied()
			.unwrap_or_default())
	}
}

#[derive(Debug, Deserialize)]
struct BalanceEntry {
	asset: Address,
	owner: Address,
	amount: String,
}

#[derive(Debug, Deserialize)]
struct AllowanceEntry {
	asset: Address,
	owner: Address,
	spender: Address,
	amount: String,
}

#[derive(Debug, Default, Deserialize)]
struct MemoryTokenConfig {
	#[serde(default)]
	balances: Vec<BalanceEntry>,
	#[serde(default)]
	allowances: Vec<AllowanceEntry>,
}

/// Parses a decimal amount, accepting `"max"` for `U256::MAX`.
fn parse_amount(value: &str) -> Result<U256, String> {
	if value.eq_ignore_ascii_case("max") {
		return Ok(U256::MAX);
	}
	U256::from_str_radix(value, 10).map_err(|e| format!("Invalid amount '{}': {}", value, e))
}

/// Configuration schema for MemoryToken.
pub struct MemoryTokenSchema;

impl ConfigSchema for MemoryTokenSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let amount_field = || {
			Field::new("amount", FieldType::String)
				.with_validator(|v| parse_amount(v.as_str().unwrap_or_default()).map(|_| ()))
		};

		let balance = Schema::new(
			vec![
				Field::new("asset", FieldType::String),
				Field::new("owner", FieldType::String),
				amount_field(),
			],
			vec![],
		);
		let allowance = Schema::new(
			vec![
				Field::new("asset", FieldType::String),
				Field::new("owner", FieldType::String),
				Field::new("spender", FieldType::String),
				amount_field(),
			],
			vec![],
		);

		Schema::new(
			vec![],
			vec![
				Field::new("balances", FieldType::Array(Box::new(FieldType::Table(balance)))),
				Field::new(
					"allowances",
					FieldType::Array(Box::new(FieldType::Table(allowance))),
				),
			],
		)
		.validate(config)
	}
}

/// Factory function to create an in-memory token ledger from configuration.
///
/// Configuration parameters:
/// - `balances`: optional `[{ asset, owner, amount }]` seed balances
/// - `allowances`: optional `[{ asset, owner, spender, amount }]` seed approvals,
///   `amount = "max"` for an infinite approval
pub fn create_token(config: &toml::Value) -> Result<Box<dyn TokenInterface>, TokenError> {
	MemoryTokenSchema
		.validate(config)
		.map_err(|e| TokenError::Configuration(e.to_string()))?;

	let parsed: MemoryTokenConfig = config
		.clone()
		.try_into()
		.map_err(|e| TokenError::Configuration(format!("Invalid memory token config: {}", e)))?;

	let mut state = LedgerState::default();
	for entry in parsed.balances {
		let amount = parse_amount(&entry.amount).map_err(TokenError::Configuration)?;
		state.balances.insert((entry.asset, entry.owner), amount);
	}
	for entry in parsed.allowances {
		let amount = parse_amount(&entry.amount).map_err(TokenError::Configuration)?;
		state
			.allowances
			.insert((entry.asset, entry.owner, entry.spender), amount);
	}

	Ok(Box::new(MemoryToken {
		state: Arc::new(Mutex::new(state)),
	}))
}

/// Registry for the in-memory token ledger.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = TokenFactory;

	fn factory() -> Self::Factory {
		create_token
	}
}

impl TokenRegistry for Registry {}
