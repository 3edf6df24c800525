//! Registry trait for self-registering implementations.
//!
//! Every pluggable backend (storage, account, token ledger) exposes a
//! `Registry` struct implementing this trait so the builder can look it up by
//! the name used in configuration.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation,
	/// for example `"memory"` for `[storage.implementations.memory]` or
	/// `"local"` for `[account.implementations.local]`.
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
