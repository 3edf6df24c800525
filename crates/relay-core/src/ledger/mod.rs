//! Replay protection for relayed authorizations.
//!
//! This module records which authorizations have been consumed, so that each
//! signed authorization moves funds at most once. Records are persisted
//! through the storage service and never expire.

pub mod authorization;

pub use authorization::{AuthorizationLedger, ConsumptionOutcome, LedgerError, RejectionReason};
