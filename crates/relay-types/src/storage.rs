//! Storage namespaces for persisted relayer state.

/// Namespaces for the different record collections kept by the relayer.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Digests consumed under the digest-set policy, keyed by `signer:digest`.
	ConsumedDigests,
	/// Next expected nonce per signer under the sequential policy.
	NextNonces,
	/// Ledger metadata such as the bound replay policy.
	LedgerMeta,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::ConsumedDigests => "consumed_digests",
			StorageKey::NextNonces => "next_nonces",
			StorageKey::LedgerMeta => "ledger_meta",
		}
	}
}
