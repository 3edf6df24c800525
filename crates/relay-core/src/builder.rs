//! Builder pattern for constructing relay executors.
//!
//! Composes a [`RelayExecutor`] from the configured storage backend, relayer
//! account and token ledger, each created through a named factory function.

use crate::executor::RelayExecutor;
use crate::ledger::{AuthorizationLedger, LedgerError};
use relay_account::{AccountError, AccountFactory, AccountInterface, AccountService};
use relay_config::Config;
use relay_storage::{StorageError, StorageFactory, StorageInterface, StorageService};
use relay_token::{TokenError, TokenFactory, TokenInterface, TokenService};
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during executor construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
	#[error("Ledger error: {0}")]
	Ledger(#[from] LedgerError),
}

/// Factory functions for every pluggable component, keyed by implementation
/// name.
pub struct RelayFactories<SF, AF, TF> {
	pub storage_factories: HashMap<String, SF>,
	pub account_factories: HashMap<String, AF>,
	pub token_factories: HashMap<String, TF>,
}

impl RelayFactories<StorageFactory, AccountFactory, TokenFactory> {
	/// Collects every implementation the component crates register.
	pub fn registered() -> Self {
		Self {
			storage_factories: relay_storage::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			account_factories: relay_account::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
			token_factories: relay_token::get_all_implementations()
				.into_iter()
				.map(|(name, factory)| (name.to_string(), factory))
				.collect(),
		}
	}
}

/// Builder for constructing a [`RelayExecutor`] from configuration.
pub struct RelayBuilder {
	config: Config,
}

impl RelayBuilder {
	/// Creates a new RelayBuilder with the given configuration.
	pub fn new(config: Config) -> Self {
		Self { config }
	}

	/// Instantiates the primary implementation of each component and wires
	/// them into an executor.
	pub async fn build<SF, AF, TF>(
		self,
		factories: RelayFactories<SF, AF, TF>,
	) -> Result<RelayExecutor, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>,
		AF: Fn(&toml::Value) -> Result<Box<dyn AccountInterface>, AccountError>,
		TF: Fn(&toml::Value) -> Result<Box<dyn TokenInterface>, TokenError>,
	{
		let storage_backend = create_primary(
			"storage",
			&self.config.storage.primary,
			&self.config.storage.implementations,
			&factories.storage_factories,
		)?;
		let storage = Arc::new(StorageService::new(storage_backend));

		let account_impl = create_primary(
			"account",
			&self.config.account.primary,
			&self.config.account.implementations,
			&factories.account_factories,
		)?;
		let account = AccountService::new(account_impl);

		// Fetch the relayer address once during initialization
		let relayer = account.get_address().await.map_err(|e| {
			tracing::error!(component = "account", error = %e, "Failed to get relayer address");
			BuilderError::Config(format!("Failed to get relayer address: {}", e))
		})?;

		let token_impl = create_primary(
			"token",
			&self.config.token.primary,
			&self.config.token.implementations,
			&factories.token_factories,
		)?;
		let token = Arc::new(TokenService::new(token_impl));

		let ledger =
			AuthorizationLedger::open(storage, self.config.relayer.replay_policy).await?;

		tracing::info!(
			relayer_id = %self.config.relayer.id,
			relayer = %relayer,
			policy = %ledger.policy(),
			"Built relay executor"
		);

		Ok(RelayExecutor::new(Arc::new(ledger), token, relayer))
	}
}

/// Runs the factory of the primary implementation for one component.
///
/// Only the primary is instantiated; other configured implementations are
/// ignored so that a broken alternate cannot block startup.
fn create_primary<F, T, E>(
	component: &str,
	primary: &str,
	implementations: &HashMap<String, toml::Value>,
	factories: &HashMap<String, F>,
) -> Result<T, BuilderError>
where
	F: Fn(&toml::Value) -> Result<T, E>,
	E: Display,
{
	let config = implementations.get(primary).ok_or_else(|| {
		BuilderError::Config(format!(
			"Primary {} '{}' has no configuration",
			component, primary
		))
	})?;
	let factory = factories.get(primary).ok_or_else(|| {
		BuilderError::MissingComponent(format!(
			"No {} implementation named '{}'",
			component, primary
		))
	})?;

	match factory(config) {
		Ok(implementation) => {
			tracing::info!(component = %component, implementation = %primary, "Loaded");
			Ok(implementation)
		},
		Err(e) => {
			tracing::error!(
				component = %component,
				implementation = %primary,
				error = %e,
				"Failed to create implementation"
			);
			Err(BuilderError::Config(format!(
				"Failed to create {} implementation '{}': {}",
				component, primary, e
			)))
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use relay_config::{AccountConfig, RelayerConfig, StorageConfig, TokenConfig};
	use relay_types::{Address, ReplayPolicy, U256};

	const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn section(name: &str, value: toml::Value) -> HashMap<String, toml::Value> {
		HashMap::from([(name.to_string(), value)])
	}

	fn test_config(token: toml::Value) -> Config {
		let account: toml::Value = toml::from_str(&format!("private_key = \"{}\"", DEV_KEY)).unwrap();
		Config {
			relayer: RelayerConfig {
				id: "test-relayer".to_string(),
				replay_policy: ReplayPolicy::SequentialNonce,
			},
			storage: StorageConfig {
				primary: "memory".to_string(),
				implementations: section("memory", toml::Value::Table(toml::map::Map::new())),
			},
			account: AccountConfig {
				primary: "local".to_string(),
				implementations: section("local", account),
			},
			token: TokenConfig {
				primary: "memory".to_string(),
				implementations: section("memory", token),
			},
			api: None,
		}
	}

	#[tokio::test]
	async fn test_build_from_config() {
		let token: toml::Value = toml::from_str(
			r#"
			[[balances]]
			asset = "0x00000000000000000000000000000000000000aa"
			owner = "0x0000000000000000000000000000000000000001"
			amount = "500"
			"#,
		)
		.unwrap();

		let executor = RelayBuilder::new(test_config(token))
			.build(RelayFactories::registered())
			.await
			.unwrap();

		let expected: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
		assert_eq!(executor.relayer(), expected);
		assert_eq!(
			executor
				.balance_of(Address::with_last_byte(0x01), Address::with_last_byte(0xaa))
				.await
				.unwrap(),
			U256::from(500u64)
		);
	}

	#[tokio::test]
	async fn test_unknown_primary_fails() {
		let mut config = test_config(toml::Value::Table(toml::map::Map::new()));
		config.token.primary = "evm".to_string();
		config
			.token
			.implementations
			.insert("evm".to_string(), toml::Value::Table(toml::map::Map::new()));

		let result = RelayBuilder::new(config).build(RelayFactories::registered()).await;
		assert!(matches!(result, Err(BuilderError::MissingComponent(_))));
	}

	#[tokio::test]
	async fn test_invalid_account_config_fails() {
		let mut config = test_config(toml::Value::Table(toml::map::Map::new()));
		config.account.implementations = section(
			"local",
			toml::from_str("private_key = \"0x1234\"").unwrap(),
		);

		let result = RelayBuilder::new(config).build(RelayFactories::registered()).await;
		assert!(matches!(result, Err(BuilderError::Config(_))));
	}
}
