//! Core meta-transaction relay engine.
//!
//! A token owner signs an [`Authorization`](relay_types::Authorization)
//! off-chain; any relayer may submit it together with the signature. The
//! [`RelayExecutor`] recomputes the digest, checks that the signature belongs
//! to the claimed sender, consumes the authorization in the
//! [`AuthorizationLedger`], and only then asks the external token ledger to
//! move the funds.

pub mod builder;
pub mod executor;
pub mod ledger;
pub mod verifier;

pub use builder::{BuilderError, RelayBuilder, RelayFactories};
pub use executor::{RelayError, RelayExecutor};
pub use ledger::{AuthorizationLedger, ConsumptionOutcome, LedgerError, RejectionReason};
pub use verifier::{SignatureError, SignatureVerifier};
