//! Relay execution pipeline.
//!
//! Turns a signed authorization into a token transfer: recompute the digest,
//! authenticate the claimed sender, consume the authorization, and invoke the
//! external ledger on the owner's behalf.

use crate::ledger::{AuthorizationLedger, ConsumptionOutcome, LedgerError, RejectionReason};
use crate::verifier::{SignatureError, SignatureVerifier};
use alloy_primitives::{Address, U256};
use relay_token::{TokenError, TokenService};
use relay_types::{truncate_id, Authorization, Digest, MessageCodec, Signature, TransferReceipt};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Errors returned by [`RelayExecutor::relay`].
#[derive(Debug, Error)]
pub enum RelayError {
	/// The signature bytes are structurally invalid.
	#[error("Malformed signature: {0}")]
	MalformedSignature(String),
	/// The signature does not recover to the authorization's sender.
	#[error("Signature does not match sender {sender}")]
	InvalidSignature { sender: Address },
	/// The replay policy refused the authorization.
	#[error("Authorization rejected: {0}")]
	Replayed(RejectionReason),
	/// The authorization was consumed but the ledger refused the transfer.
	#[error("External transfer failed: {0}")]
	ExternalTransferFailed(#[source] TokenError),
	/// The consumption store could not be read or written.
	#[error("Ledger error: {0}")]
	Ledger(#[from] LedgerError),
}

/// Executes signed transfer authorizations on behalf of their signers.
///
/// The authorization is marked consumed *before* the external transfer is
/// attempted. If the transfer then fails, or the relay future is dropped
/// mid-transfer, the authorization stays consumed and the signer must sign a
/// new one with a fresh nonce. The opposite order would let a concurrent or
/// retried submission execute the same authorization twice.
pub struct RelayExecutor {
	ledger: Arc<AuthorizationLedger>,
	verifier: SignatureVerifier,
	token: Arc<TokenService>,
	relayer: Address,
}

impl RelayExecutor {
	/// Creates an executor spending through `token` as `relayer`.
	pub fn new(ledger: Arc<AuthorizationLedger>, token: Arc<TokenService>, relayer: Address) -> Self {
		Self {
			ledger,
			verifier: SignatureVerifier::new(),
			token,
			relayer,
		}
	}

	/// Address the executor presents to the token ledger as spender.
	pub fn relayer(&self) -> Address {
		self.relayer
	}

	/// Returns the ledger tracking consumed authorizations.
	pub fn ledger(&self) -> &AuthorizationLedger {
		&self.ledger
	}

	/// Computes the digest a signer must sign for `authorization`.
	pub fn digest(&self, authorization: &Authorization) -> Digest {
		MessageCodec::digest(authorization)
	}

	/// Verifies and executes a signed authorization.
	///
	/// On success exactly `amount` of `asset` has moved from the sender to the
	/// recipient and the authorization can never be executed again.
	#[instrument(skip_all, fields(sender = %authorization.sender, nonce = %authorization.nonce))]
	pub async fn relay(
		&self,
		authorization: &Authorization,
		signature: &Signature,
	) -> Result<TransferReceipt, RelayError> {
		let digest = MessageCodec::digest(authorization);
		let digest_hex = format!("{:#x}", digest);

		// verify reports unrecoverable signatures as a mismatch
		match self.verifier.verify(&digest, signature, authorization.sender) {
			Ok(true) => {},
			Err(SignatureError::Malformed(reason)) => {
				tracing::warn!(reason = %reason, "Rejected malformed signature");
				return Err(RelayError::MalformedSignature(reason));
			},
			Ok(false) | Err(SignatureError::RecoveryFailure(_)) => {
				tracing::warn!(digest = %truncate_id(&digest_hex), "Signature does not match sender");
				return Err(RelayError::InvalidSignature {
					sender: authorization.sender,
				});
			},
		}

		match self
			.ledger
			.check_and_consume(authorization.sender, authorization)
			.await?
		{
			ConsumptionOutcome::Accepted => {},
			ConsumptionOutcome::Rejected(reason) => {
				tracing::warn!(digest = %truncate_id(&digest_hex), reason = %reason, "Rejected replayed authorization");
				return Err(RelayError::Replayed(reason));
			},
		}

		self.token
			.transfer_from(
				self.relayer,
				authorization.sender,
				authorization.recipient,
				authorization.asset,
				authorization.amount,
			)
			.await
			.map_err(|e| {
				tracing::error!(
					digest = %truncate_id(&digest_hex),
					error = %e,
					"Transfer failed after authorization was consumed"
				);
				RelayError::ExternalTransferFailed(e)
			})?;

		tracing::info!(
			digest = %truncate_id(&digest_hex),
			recipient = %authorization.recipient,
			asset = %authorization.asset,
			amount = %authorization.amount,
			"Relayed transfer"
		);

		Ok(TransferReceipt::new(authorization, digest, self.relayer))
	}

	/// Next acceptable nonce for `signer`, if the ledger tracks nonces.
	pub async fn next_nonce(&self, signer: Address) -> Result<Option<U256>, RelayError> {
		Ok(self.ledger.next_nonce(signer).await?)
	}

	/// Current balance of `owner` in `asset` on the external ledger.
	pub async fn balance_of(&self, owner: Address, asset: Address) -> Result<U256, TokenError> {
		self.token.balance_of(owner, asset).await
	}
}
