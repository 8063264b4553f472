//! Storage contract for persisted swap records

use super::{SwapRecord, SwapStatus};
use crate::storage::StorageResult;
use async_trait::async_trait;

/// CRUD surface for swap records.
///
/// Implementations live in `swapflow-storage`; the engine only sees this
/// trait.
#[async_trait]
pub trait SwapRecordStore: Send + Sync {
	/// Persist a new record. Fails if the order id already exists.
	async fn add_record(&self, record: SwapRecord) -> StorageResult<()>;

	/// Fetch a record by order id
	async fn get_record(&self, order_id: &str) -> StorageResult<Option<SwapRecord>>;

	/// Update the provider-side status of an existing record
	async fn update_status(&self, order_id: &str, status: SwapStatus) -> StorageResult<()>;

	/// All records, newest first
	async fn list_records(&self) -> StorageResult<Vec<SwapRecord>>;

	/// Number of stored records
	async fn count_records(&self) -> StorageResult<u64>;
}
