//! HTTP server for the relayer API.
//!
//! Exposes relay submission plus the lookups a signing client needs to build
//! its next authorization.

use axum::{
	extract::{DefaultBodyLimit, Path, State},
	response::Json,
	routing::{get, post},
	Router,
};
use relay_config::ApiConfig;
use relay_core::RelayExecutor;
use relay_types::{
	APIError, Authorization, BalanceResponse, DigestResponse, NonceResponse, RelayRequest,
	TransferReceipt,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Executor processing relay requests.
	pub executor: Arc<RelayExecutor>,
}

/// Builds the API router with every endpoint mounted under `/api`.
pub fn router(executor: Arc<RelayExecutor>, max_request_size: usize) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/relay", post(handle_relay))
				.route("/digest", post(handle_digest))
				.route("/nonces/{signer}", get(handle_nonce))
				.route("/balances/{asset}/{owner}", get(handle_balance)),
		)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(CorsLayer::permissive())
				.layer(DefaultBodyLimit::max(max_request_size)),
		)
		.with_state(AppState { executor })
}

/// Starts the HTTP server and serves until the listener fails.
pub async fn start_server(
	api_config: ApiConfig,
	executor: Arc<RelayExecutor>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(executor, api_config.max_request_size);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Relayer API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

/// Handles POST /api/relay requests.
async fn handle_relay(
	State(state): State<AppState>,
	Json(request): Json<RelayRequest>,
) -> Result<Json<TransferReceipt>, APIError> {
	match crate::apis::relay::process_relay_request(request, &state.executor).await {
		Ok(receipt) => Ok(Json(receipt)),
		Err(e) => {
			tracing::warn!("Relay request failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/digest requests.
async fn handle_digest(Json(authorization): Json<Authorization>) -> Json<DigestResponse> {
	Json(crate::apis::query::process_digest_request(&authorization))
}

/// Handles GET /api/nonces/{signer} requests.
async fn handle_nonce(
	Path(signer): Path<String>,
	State(state): State<AppState>,
) -> Result<Json<NonceResponse>, APIError> {
	crate::apis::query::process_nonce_request(&signer, &state.executor)
		.await
		.map(Json)
}

/// Handles GET /api/balances/{asset}/{owner} requests.
async fn handle_balance(
	Path((asset, owner)): Path<(String, String)>,
	State(state): State<AppState>,
) -> Result<Json<BalanceResponse>, APIError> {
	crate::apis::query::process_balance_request(&asset, &owner, &state.executor)
		.await
		.map(Json)
}
