//! Authorization consumption ledger.
//!
//! Under [`ReplayPolicy::SequentialNonce`] each signer has a counter starting
//! at zero and an authorization is accepted only when its nonce equals the
//! counter. Under [`ReplayPolicy::DigestSet`] each signer has a set of
//! consumed digests and an authorization is accepted only if its digest is
//! not yet in the set. Replay scope is per signer and spans every asset.

use alloy_primitives::{Address, U256};
use dashmap::DashMap;
use relay_storage::{StorageError, StorageService};
use relay_types::{u256_serde, Authorization, Digest, MessageCodec, ReplayPolicy, StorageKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Identifier of the ledger metadata record.
const META_ID: &str = "ledger";

/// Errors that can occur while consulting or updating the ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),
	#[error("Replay policy mismatch: store is bound to {stored}, requested {requested}")]
	PolicyMismatch {
		stored: ReplayPolicy,
		requested: ReplayPolicy,
	},
	#[error("Nonce counter exhausted for {0}")]
	NonceOverflow(Address),
}

/// Why an authorization was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
	/// The authorization (or its nonce) has already been consumed.
	#[error("authorization already used")]
	AlreadyUsed,
	/// The nonce is ahead of the signer's counter.
	#[error("bad nonce: expected {expected}, got {provided}")]
	BadNonce { expected: U256, provided: U256 },
}

/// Result of an atomic check-and-consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumptionOutcome {
	Accepted,
	Rejected(RejectionReason),
}

#[derive(Debug, Serialize, Deserialize)]
struct LedgerMeta {
	policy: ReplayPolicy,
}

#[derive(Debug, Serialize, Deserialize)]
struct NonceCounter {
	#[serde(with = "u256_serde")]
	next: U256,
}

#[derive(Debug, Serialize, Deserialize)]
struct ConsumedDigest {
	#[serde(with = "u256_serde")]
	nonce: U256,
}

/// Persistent record of consumed authorizations.
///
/// `check_and_consume` is atomic per signer: concurrent calls for the same
/// signer are serialized, so of N concurrent submissions of one
/// authorization exactly one is accepted. Calls for different signers do not
/// contend.
pub struct AuthorizationLedger {
	storage: Arc<StorageService>,
	policy: ReplayPolicy,
	locks: DashMap<Address, Arc<Mutex<()>>>,
}

impl AuthorizationLedger {
	/// Opens the ledger over `storage`, binding the store to `policy`.
	///
	/// A store that was first opened with a different policy is refused.
	pub async fn open(
		storage: Arc<StorageService>,
		policy: ReplayPolicy,
	) -> Result<Self, LedgerError> {
		let meta: Option<LedgerMeta> = storage
			.retrieve_optional(StorageKey::LedgerMeta, META_ID)
			.await?;

		match meta {
			Some(meta) if meta.policy != policy => {
				return Err(LedgerError::PolicyMismatch {
					stored: meta.policy,
					requested: policy,
				});
			},
			Some(_) => {},
			None => {
				storage
					.store(StorageKey::LedgerMeta, META_ID, &LedgerMeta { policy })
					.await?;
				tracing::info!(policy = %policy, "Initialized authorization ledger");
			},
		}

		Ok(Self {
			storage,
			policy,
			locks: DashMap::new(),
		})
	}

	/// Returns the replay policy this ledger enforces.
	pub fn policy(&self) -> ReplayPolicy {
		self.policy
	}

	/// Atomically decides whether `authorization` may be executed and, if so,
	/// records it as consumed before returning.
	pub async fn check_and_consume(
		&self,
		signer: Address,
		authorization: &Authorization,
	) -> Result<ConsumptionOutcome, LedgerError> {
		let lock = self.signer_lock(signer);
		let _guard = lock.lock().await;

		match self.policy {
			ReplayPolicy::SequentialNonce => self.consume_nonce(signer, authorization.nonce).await,
			ReplayPolicy::DigestSet => {
				self.consume_digest(signer, &MessageCodec::digest(authorization), authorization.nonce)
					.await
			},
		}
	}

	/// Returns the next acceptable nonce for `signer`.
	///
	/// Only meaningful under the sequential policy; `None` otherwise.
	pub async fn next_nonce(&self, signer: Address) -> Result<Option<U256>, LedgerError> {
		match self.policy {
			ReplayPolicy::SequentialNonce => Ok(Some(self.load_counter(signer).await?)),
			ReplayPolicy::DigestSet => Ok(None),
		}
	}

	/// Returns true if `authorization` from `signer` can no longer be executed
	/// because it, or its nonce, has been consumed.
	pub async fn is_consumed(
		&self,
		signer: Address,
		authorization: &Authorization,
	) -> Result<bool, LedgerError> {
		match self.policy {
			ReplayPolicy::SequentialNonce => {
				Ok(authorization.nonce < self.load_counter(signer).await?)
			},
			ReplayPolicy::DigestSet => Ok(self
				.storage
				.exists(
					StorageKey::ConsumedDigests,
					&digest_id(signer, &MessageCodec::digest(authorization)),
				)
				.await?),
		}
	}

	fn signer_lock(&self, signer: Address) -> Arc<Mutex<()>> {
		self.locks.entry(signer).or_default().value().clone()
	}

	async fn load_counter(&self, signer: Address) -> Result<U256, LedgerError> {
		let counter: Option<NonceCounter> = self
			.storage
			.retrieve_optional(StorageKey::NextNonces, &signer_id(signer))
			.await?;
		Ok(counter.map(|c| c.next).unwrap_or(U256::ZERO))
	}

	async fn consume_nonce(
		&self,
		signer: Address,
		nonce: U256,
	) -> Result<ConsumptionOutcome, LedgerError> {
		let expected = self.load_counter(signer).await?;

		if nonce < expected {
			return Ok(ConsumptionOutcome::Rejected(RejectionReason::AlreadyUsed));
		}
		if nonce > expected {
			return Ok(ConsumptionOutcome::Rejected(RejectionReason::BadNonce {
				expected,
				provided: nonce,
			}));
		}

		let next = expected
			.checked_add(U256::from(1u64))
			.ok_or(LedgerError::NonceOverflow(signer))?;
		self.storage
			.store(StorageKey::NextNonces, &signer_id(signer), &NonceCounter { next })
			.await?;

		tracing::debug!(signer = %signer, nonce = %nonce, "Consumed nonce");
		Ok(ConsumptionOutcome::Accepted)
	}

	async fn consume_digest(
		&self,
		signer: Address,
		digest: &Digest,
		nonce: U256,
	) -> Result<ConsumptionOutcome, LedgerError> {
		let id = digest_id(signer, digest);
		if self.storage.exists(StorageKey::ConsumedDigests, &id).await? {
			return Ok(ConsumptionOutcome::Rejected(RejectionReason::AlreadyUsed));
		}

		self.storage
			.store(StorageKey::ConsumedDigests, &id, &ConsumedDigest { nonce })
			.await?;

		tracing::debug!(signer = %signer, digest = %digest, "Consumed digest");
		Ok(ConsumptionOutcome::Accepted)
	}
}

fn signer_id(signer: Address) -> String {
	format!("{:#x}", signer)
}

fn digest_id(signer: Address, digest: &Digest) -> String {
	format!("{:#x}:{:#x}", signer, digest)
}
