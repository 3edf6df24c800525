//! Read-only endpoints: digest preview, nonce and balance lookups.

use relay_core::RelayExecutor;
use relay_types::{
	parse_address, APIError, Address, Authorization, BalanceResponse, Bytes, DigestResponse,
	MessageCodec, NonceResponse,
};

/// Handles POST /digest requests.
///
/// Returns the canonical encoding and the digest a signer must sign.
pub fn process_digest_request(authorization: &Authorization) -> DigestResponse {
	DigestResponse {
		digest: MessageCodec::digest(authorization),
		encoded: Bytes::from(MessageCodec::encode(authorization)),
	}
}

/// Handles GET /nonces/{signer} requests.
pub async fn process_nonce_request(
	signer: &str,
	executor: &RelayExecutor,
) -> Result<NonceResponse, APIError> {
	let signer = parse_path_address("signer", signer)?;
	let next_nonce = executor
		.next_nonce(signer)
		.await
		.map_err(|e| APIError::InternalServerError {
			error_type: "LEDGER_ERROR".to_string(),
			message: e.to_string(),
		})?
		.ok_or_else(|| APIError::BadRequest {
			error_type: "NONCES_UNSUPPORTED".to_string(),
			message: format!(
				"Replay policy {} does not track nonces",
				executor.ledger().policy()
			),
		})?;

	Ok(NonceResponse { signer, next_nonce })
}

/// Handles GET /balances/{asset}/{owner} requests.
pub async fn process_balance_request(
	asset: &str,
	owner: &str,
	executor: &RelayExecutor,
) -> Result<BalanceResponse, APIError> {
	let asset = parse_path_address("asset", asset)?;
	let owner = parse_path_address("owner", owner)?;
	let balance = executor
		.balance_of(owner, asset)
		.await
		.map_err(|e| APIError::InternalServerError {
			error_type: "TOKEN_ERROR".to_string(),
			message: e.to_string(),
		})?;

	Ok(BalanceResponse {
		owner,
		asset,
		balance,
	})
}

fn parse_path_address(name: &str, value: &str) -> Result<Address, APIError> {
	parse_address(value).map_err(|e| APIError::BadRequest {
		error_type: "INVALID_ADDRESS".to_string(),
		message: format!("Invalid {}: {}", name, e),
	})
}
