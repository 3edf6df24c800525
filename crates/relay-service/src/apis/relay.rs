//! Relay submission endpoint.
//!
//! Accepts a signed authorization from any client and executes it through
//! the relay executor. Failures map onto distinct HTTP statuses so clients
//! can tell bad input, forged signatures, replays and ledger refusals apart.

use relay_core::{RejectionReason, RelayError, RelayExecutor};
use relay_types::{APIError, RelayRequest, TransferReceipt};
use tracing::info;

/// Handles POST /relay requests.
pub async fn process_relay_request(
	request: RelayRequest,
	executor: &RelayExecutor,
) -> Result<TransferReceipt, APIError> {
	info!(
		sender = %request.authorization.sender,
		nonce = %request.authorization.nonce,
		"Received relay request"
	);

	executor
		.relay(&request.authorization, &request.signature)
		.await
		.map_err(to_api_error)
}

/// Maps an executor failure onto its HTTP representation.
pub fn to_api_error(error: RelayError) -> APIError {
	let message = error.to_string();
	match error {
		RelayError::MalformedSignature(_) => APIError::BadRequest {
			error_type: "MALFORMED_SIGNATURE".to_string(),
			message,
		},
		RelayError::InvalidSignature { .. } => APIError::Unauthorized {
			error_type: "INVALID_SIGNATURE".to_string(),
			message,
		},
		RelayError::Replayed(RejectionReason::AlreadyUsed) => APIError::Conflict {
			error_type: "ALREADY_USED".to_string(),
			message,
		},
		RelayError::Replayed(RejectionReason::BadNonce { .. }) => APIError::Conflict {
			error_type: "BAD_NONCE".to_string(),
			message,
		},
		RelayError::ExternalTransferFailed(_) => APIError::UnprocessableEntity {
			error_type: "TRANSFER_FAILED".to_string(),
			message,
		},
		RelayError::Ledger(_) => APIError::InternalServerError {
			error_type: "LEDGER_ERROR".to_string(),
			message,
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use relay_core::LedgerError;
	use relay_storage::StorageError;
	use relay_token::TokenError;
	use relay_types::{Address, U256};

	#[test]
	fn test_error_status_mapping() {
		let cases = [
			(RelayError::MalformedSignature("short".into()), 400, "MALFORMED_SIGNATURE"),
			(
				RelayError::InvalidSignature {
					sender: Address::ZERO,
				},
				401,
				"INVALID_SIGNATURE",
			),
			(RelayError::Replayed(RejectionReason::AlreadyUsed), 409, "ALREADY_USED"),
			(
				RelayError::Replayed(RejectionReason::BadNonce {
					expected: U256::ZERO,
					provided: U256::from(1u64),
				}),
				409,
				"BAD_NONCE",
			),
			(
				RelayError::ExternalTransferFailed(TokenError::Backend("down".into())),
				422,
				"TRANSFER_FAILED",
			),
			(
				RelayError::Ledger(LedgerError::Storage(StorageError::Backend("disk full".into()))),
				500,
				"LEDGER_ERROR",
			),
		];

		for (error, status, code) in cases {
			let api = to_api_error(error);
			assert_eq!(api.status_code(), status);
			assert_eq!(api.to_error_response().error, code);
		}
	}
}
