//! Main entry point for the meta-transaction relayer service.
//!
//! Loads configuration, wires the configured storage, account and token
//! ledger implementations into a relay executor, and serves the HTTP API.

use clap::Parser;
use relay_config::Config;
use relay_core::{RelayBuilder, RelayExecutor, RelayFactories};
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

/// Command-line arguments for the relayer service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, env = "RELAYER_CONFIG", default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the relayer service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the relay executor with all implementations
/// 5. Serves the API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started relayer");

	let config_path = args
		.config
		.to_str()
		.ok_or("Configuration path is not valid UTF-8")?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.relayer.id);

	let executor = Arc::new(build_executor(config.clone()).await?);

	match config.api.filter(|api| api.enabled) {
		Some(api_config) => {
			tokio::select! {
				result = server::start_server(api_config, Arc::clone(&executor)) => {
					tracing::info!("API server finished");
					result?;
				}
				_ = tokio::signal::ctrl_c() => {
					tracing::info!("Received shutdown signal");
				}
			}
		},
		None => {
			tracing::warn!("API disabled, nothing to serve");
		},
	}

	tracing::info!("Stopped relayer");
	Ok(())
}

/// Builds the relay executor from every registered implementation.
async fn build_executor(config: Config) -> Result<RelayExecutor, Box<dyn std::error::Error>> {
	let builder = RelayBuilder::new(config);
	Ok(builder.build(RelayFactories::registered()).await?)
}
