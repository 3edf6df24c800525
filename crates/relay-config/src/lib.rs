//! Configuration module for the relayer.
//!
//! Configuration is read from TOML. `${VAR}` and `${VAR:-default}` references
//! are resolved from the environment before parsing, and a file may pull in
//! others with `include = ["file.toml"]` as long as each top-level section is
//! defined exactly once.

mod loader;

use regex::Regex;
use relay_types::ReplayPolicy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Keep only the message, not the echoed input
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the relayer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Relayer identity and replay-protection settings.
	pub relayer: RelayerConfig,
	/// Storage backend holding consumption records.
	pub storage: StorageConfig,
	/// Account providing the relayer's spender identity.
	pub account: AccountConfig,
	/// External token ledger used to execute transfers.
	pub token: TokenConfig,
	/// Configuration for the HTTP API server.
	pub api: Option<ApiConfig>,
}

/// Configuration specific to the relayer instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayerConfig {
	/// Unique identifier for this relayer instance.
	pub id: String,
	/// Replay-protection policy; fixed for the lifetime of a store.
	#[serde(default)]
	pub replay_policy: ReplayPolicy,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of storage implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for account management.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccountConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of account implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the external token ledger.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
	/// Which implementation to use as primary.
	pub primary: String,
	/// Map of token ledger implementation names to their configurations.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server is enabled.
	#[serde(default)]
	pub enabled: bool,
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
	/// Maximum request size in bytes.
	#[serde(default = "default_max_request_size")]
	pub max_request_size: usize,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

fn default_max_request_size() -> usize {
	64 * 1024
}

/// Resolves `${VAR}` and `${VAR:-default}` references in a string.
///
/// Input strings are limited to 1MB to bound regex work.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = String::with_capacity(input.len());
	let mut last = 0;

	for cap in re.captures_iter(input) {
		let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name.as_str()) {
			Ok(v) => v,
			Err(_) => match default_value {
				Some(default) => default.to_string(),
				None => {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name.as_str()
					)))
				},
			},
		};

		result.push_str(&input[last..full_match.start()]);
		result.push_str(&value);
		last = full_match.end();
	}
	result.push_str(&input[last..]);

	Ok(result)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// Validates cross-field constraints serde cannot express.
	fn validate(&self) -> Result<(), ConfigError> {
		if self.relayer.id.trim().is_empty() {
			return Err(ConfigError::Validation("Relayer ID cannot be empty".into()));
		}

		validate_section("storage", &self.storage.primary, &self.storage.implementations)?;
		validate_section("account", &self.account.primary, &self.account.implementations)?;
		validate_section("token", &self.token.primary, &self.token.implementations)?;

		if let Some(api) = &self.api {
			if api.enabled && api.port == 0 {
				return Err(ConfigError::Validation("API port cannot be 0".into()));
			}
			if api.max_request_size == 0 {
				return Err(ConfigError::Validation(
					"API max_request_size must be greater than 0".into(),
				));
			}
		}

		Ok(())
	}
}

/// Checks that a pluggable section names a configured primary implementation.
fn validate_section(
	section: &str,
	primary: &str,
	implementations: &HashMap<String, toml::Value>,
) -> Result<(), ConfigError> {
	if implementations.is_empty() {
		return Err(ConfigError::Validation(format!(
			"At least one {} implementation must be configured",
			section
		)));
	}
	if primary.is_empty() {
		return Err(ConfigError::Validation(format!(
			"{} primary implementation cannot be empty",
			section
		)));
	}
	if !implementations.contains_key(primary) {
		return Err(ConfigError::Validation(format!(
			"Primary {} '{}' not found in implementations",
			section, primary
		)));
	}
	Ok(())
}

/// Parses configuration from a TOML string, resolving environment variables
/// and validating the result.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASE: &str = r#"
[relayer]
id = "relayer-test"

[storage]
primary = "memory"
[storage.implementations.memory]

[account]
primary = "local"
[account.implementations.local]
private_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"

[token]
primary = "memory"
[token.implementations.memory]
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("RELAY_TEST_HOST", "localhost");
		std::env::set_var("RELAY_TEST_PORT", "5432");

		let input = "host = \"${RELAY_TEST_HOST}:${RELAY_TEST_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:5432\"");

		std::env::remove_var("RELAY_TEST_HOST");
		std::env::remove_var("RELAY_TEST_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${RELAY_MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${RELAY_MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.unwrap_err().to_string().contains("RELAY_MISSING_VAR"));
	}

	#[test]
	fn test_minimal_config_defaults() {
		let config: Config = BASE.parse().unwrap();
		assert_eq!(config.relayer.id, "relayer-test");
		assert_eq!(config.relayer.replay_policy, ReplayPolicy::SequentialNonce);
		assert!(config.api.is_none());
	}

	#[test]
	fn test_replay_policy_and_api() {
		let input = BASE.replace(
			"id = \"relayer-test\"",
			"id = \"relayer-test\"\nreplay_policy = \"digest_set\"",
		) + "\n[api]\nenabled = true\nport = 8080\n";

		let config: Config = input.parse().unwrap();
		assert_eq!(config.relayer.replay_policy, ReplayPolicy::DigestSet);
		let api = config.api.unwrap();
		assert!(api.enabled);
		assert_eq!(api.port, 8080);
		assert_eq!(api.host, "127.0.0.1");
	}

	#[test]
	fn test_unknown_replay_policy_rejected() {
		let input = BASE.replace(
			"id = \"relayer-test\"",
			"id = \"relayer-test\"\nreplay_policy = \"per_asset\"",
		);
		assert!(matches!(input.parse::<Config>(), Err(ConfigError::Parse(_))));
	}

	#[test]
	fn test_primary_must_exist() {
		let input = BASE.replace("primary = \"local\"", "primary = \"kms\"");
		let err = input.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Primary account 'kms'"));
	}

	#[test]
	fn test_empty_relayer_id_rejected() {
		let input = BASE.replace("id = \"relayer-test\"", "id = \"\"");
		assert!(matches!(
			input.parse::<Config>(),
			Err(ConfigError::Validation(_))
		));
	}
}
