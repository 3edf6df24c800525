//! Common types module for the meta-transaction relayer.
//!
//! This module defines the core data types shared by every relayer component:
//! the signed authorization tuple, its canonical encoding, signatures, replay
//! policies and the API surface. Keeping them in one crate guarantees that the
//! signer's client and the executor agree on the exact bytes being signed.

/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Authorization tuple, signatures and transfer receipts.
pub mod authorization;
/// Canonical byte encoding and digest of authorizations.
pub mod codec;
/// Replay-protection policy selection.
pub mod policy;
/// Self-registration trait for pluggable implementations.
pub mod registry;
/// Secret string wrapper for key material.
pub mod secret_string;
/// Storage namespaces for persisted relayer state.
pub mod storage;
/// Utility functions for common conversions and formatting.
pub mod utils;
/// Configuration validation types for ensuring type-safe configurations.
pub mod validation;

pub use api::*;
pub use authorization::*;
pub use codec::{MessageCodec, PackedEncoder, ENCODED_LEN};
pub use policy::ReplayPolicy;
pub use registry::ImplementationRegistry;
pub use secret_string::SecretString;
pub use storage::*;
pub use utils::{parse_address, truncate_id, with_0x_prefix, without_0x_prefix};
pub use validation::*;

pub use alloy_primitives::{Address, Bytes, B256, U256};
