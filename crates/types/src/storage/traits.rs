//! Storage traits for pluggable storage implementations

use super::StorageResult;
use crate::records::SwapRecordStore;
use async_trait::async_trait;

/// Statistics about storage usage
#[derive(Debug, Clone)]
pub struct StorageStats {
	pub total_records: u64,
	pub pending_records: u64,
	pub completed_records: u64,
}

/// Main storage trait the engine is wired with.
///
/// Combines the record store with lifecycle concerns so a backend can be
/// swapped in one place.
#[async_trait]
pub trait SwapStorage: SwapRecordStore {
	/// Health check for the storage system
	async fn health_check(&self) -> StorageResult<bool>;

	/// Get overall storage statistics
	async fn stats(&self) -> StorageResult<StorageStats>;

	/// Close the storage connection
	async fn close(&self) -> StorageResult<()>;

	/// Start any background tasks associated with the storage implementation.
	/// Default implementation does nothing.
	async fn start_background_tasks(&self) -> StorageResult<()> {
		Ok(())
	}
}
