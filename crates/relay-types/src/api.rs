//! API types for the relayer HTTP endpoints.
//!
//! Amounts and nonces travel as decimal strings; addresses, digests and
//! signatures as 0x-prefixed hex.

use crate::authorization::{Authorization, Signature};
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for submitting a signed authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayRequest {
	/// The authorization tuple as signed by its sender.
	pub authorization: Authorization,
	/// Signature over the authorization digest.
	pub signature: Signature,
}

/// Response describing what a client must sign for an authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestResponse {
	/// keccak256 of the canonical encoding.
	pub digest: B256,
	/// Canonical encoding of the authorization.
	pub encoded: Bytes,
}

/// Response carrying a signer's next expected nonce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonceResponse {
	pub signer: Address,
	#[serde(with = "u256_serde")]
	pub next_nonce: U256,
}

/// Response carrying an owner's balance of an asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
	pub owner: Address,
	pub asset: Address,
	#[serde(with = "u256_serde")]
	pub balance: U256,
}

/// API error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Structurally invalid input such as a malformed signature (400)
	BadRequest { error_type: String, message: String },
	/// Signature does not belong to the claimed sender (401)
	Unauthorized { error_type: String, message: String },
	/// Authorization already consumed or out of order (409)
	Conflict { error_type: String, message: String },
	/// Authorization consumed but the token transfer failed (422)
	UnprocessableEntity { error_type: String, message: String },
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			APIError::BadRequest { .. } => 400,
			APIError::Unauthorized { .. } => 401,
			APIError::Conflict { .. } => 409,
			APIError::UnprocessableEntity { .. } => 422,
			APIError::InternalServerError { .. } => 500,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (error_type, message) = match self {
			APIError::BadRequest {
				error_type,
				message,
			}
			| APIError::Unauthorized {
				error_type,
				message,
			}
			| APIError::Conflict {
				error_type,
				message,
			}
			| APIError::UnprocessableEntity {
				error_type,
				message,
			}
			| APIError::InternalServerError {
				error_type,
				message,
			} => (error_type, message),
		};
		ErrorResponse {
			error: error_type.clone(),
			message: message.clone(),
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			APIError::Unauthorized { message, .. } => write!(f, "Unauthorized: {}", message),
			APIError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
			APIError::UnprocessableEntity { message, .. } => {
				write!(f, "Unprocessable Entity: {}", message)
			},
			APIError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

impl axum::response::IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		(status, Json(self.to_error_response())).into_response()
	}
}

/// Serde module for U256 serialization/deserialization as decimal strings.
pub mod u256_serde {
	use alloy_primitives::U256;
	use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

	pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		value.to_string().serialize(serializer)
	}

	pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		U256::from_str_radix(&s, 10).map_err(D::Error::custom)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_codes() {
		let conflict = APIError::Conflict {
			error_type: "REPLAYED".to_string(),
			message: "already used".to_string(),
		};
		assert_eq!(conflict.status_code(), 409);
		assert_eq!(conflict.to_error_response().error, "REPLAYED");
		assert_eq!(conflict.to_string(), "Conflict: already used");
	}

	#[test]
	fn test_relay_request_from_json() {
		let body = r#"{
			"authorization": {
				"sender": "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
				"amount": "10",
				"recipient": "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC",
				"asset": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
				"nonce": "0"
			},
			"signature": "0x0102"
		}"#;

		let request: RelayRequest = serde_json::from_str(body).unwrap();
		assert_eq!(request.authorization.amount, U256::from(10u64));
		assert_eq!(request.signature.as_slice(), &[1, 2]);
	}

	#[test]
	fn test_rejects_hex_amount() {
		let body = r#"{"owner":"0x70997970C51812dc3A010C7d01b50e0d17dc79C8","asset":"0x5FbDB2315678afecb367f032d93F642f64180aa3","balance":"0x10"}"#;
		assert!(serde_json::from_str::<BalanceResponse>(body).is_err());
	}
}
