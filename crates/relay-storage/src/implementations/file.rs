//! File-based storage backend.
//!
//! Each key is stored as its own file below a base directory. Writes go to a
//! temporary file that is flushed to disk and then renamed over the target,
//! so a reader never observes a partially written record and an acknowledged
//! write survives a crash.

use crate::{StorageError, StorageFactory, StorageInterface, StorageRegistry};
use async_trait::async_trait;
use relay_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Schema, ValidationError,
};
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const DEFAULT_STORAGE_PATH: &str = "./data/relay";

/// File-based storage implementation.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
}

impl FileStorage {
	/// Creates a new FileStorage rooted at `base_path`.
	pub fn new(base_path: PathBuf) -> Self {
		Self { base_path }
	}

	/// Converts a storage key to a filesystem-safe file path.
	fn get_file_path(&self, key: &str) -> PathBuf {
		let safe_key = key.replace(['/', ':', '\\'], "_");
		self.base_path.join(format!("{}.json", safe_key))
	}
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.get_file_path(key);

		match fs::read(&path).await {
			Ok(data) => Ok(data),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.get_file_path(key);

		fs::create_dir_all(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		let temp_path = path.with_extension("tmp");
		let mut file = fs::File::create(&temp_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		file.write_all(&value)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		file.sync_all()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		drop(file);

		fs::rename(&temp_path, &path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		tracing::trace!(key = %key, bytes = value.len(), "Persisted record");
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.get_file_path(key);
		fs::try_exists(&path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(FileStorageSchema)
	}
}

/// Configuration schema for FileStorage.
pub struct FileStorageSchema;

impl ConfigSchema for FileStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("storage_path", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(path) if path.trim().is_empty() => {
							Err("storage_path cannot be empty".to_string())
						},
						_ => Ok(()),
					}
				}),
			],
		);
		schema.validate(config)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `storage_path`: Base directory for record files (default: "./data/relay")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	FileStorageSchema
		.validate(config)
		.map_err(|e| StorageError::Configuration(e.to_string()))?;

	let storage_path = config
		.get("storage_path")
		.and_then(|v| v.as_str())
		.unwrap_or(DEFAULT_STORAGE_PATH)
		.to_string();

	Ok(Box::new(FileStorage::new(PathBuf::from(storage_path))))
}

/// Registry for the file storage implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "file";
	type Factory = StorageFactory;

	fn factory() -> Self::Factory {
		create_storage
	}
}

impl StorageRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[tokio::test]
	async fn test_roundtrip() {
		let dir = TempDir::new().unwrap();
		let storage = FileStorage::new(dir.path().to_path_buf());

		let key = "consumed_digests:0xabc:0xdef";
		assert!(!storage.exists(key).await.unwrap());

		storage.set_bytes(key, b"{}".to_vec()).await.unwrap();
		assert!(storage.exists(key).await.unwrap());
		assert_eq!(storage.get_bytes(key).await.unwrap(), b"{}".to_vec());
		assert!(dir.path().join("consumed_digests_0xabc_0xdef.json").exists());
		assert!(matches!(
			storage.get_bytes("consumed_digests:0xabc:0x000").await,
			Err(StorageError::NotFound)
		));
	}

	#[tokio::test]
	async fn test_survives_reopen() {
		let dir = TempDir::new().unwrap();

		{
			let storage = FileStorage::new(dir.path().to_path_buf());
			storage
				.set_bytes("next_nonces:0x01", b"{\"next\":\"4\"}".to_vec())
				.await
				.unwrap();
		}

		let reopened = FileStorage::new(dir.path().to_path_buf());
		assert_eq!(
			reopened.get_bytes("next_nonces:0x01").await.unwrap(),
			b"{\"next\":\"4\"}".to_vec()
		);
	}

	#[test]
	fn test_factory_validates_config() {
		let bad: toml::Value = toml::from_str("storage_path = 12").unwrap();
		assert!(create_storage(&bad).is_err());

		let empty: toml::Value = toml::from_str("storage_path = \"  \"").unwrap();
		assert!(create_storage(&empty).is_err());

		let good: toml::Value = toml::from_str("storage_path = \"/tmp/relay\"").unwrap();
		assert!(create_storage(&good).is_ok());
	}
}
