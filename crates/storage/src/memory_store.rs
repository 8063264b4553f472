//! In-memory swap-record storage on DashMap

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use swapflow_types::records::{SwapRecord, SwapRecordStore, SwapStatus};
use swapflow_types::storage::{StorageError, StorageResult, StorageStats, SwapStorage};
use tracing::{debug, info};

/// In-memory record store, the default engine storage.
///
/// Records are permanent history; nothing here expires or evicts. The closed
/// flag turns every operation into an error so a shut-down engine cannot
/// silently keep writing.
#[derive(Clone)]
pub struct MemoryStore {
	records: Arc<DashMap<String, SwapRecord>>,
	closed: Arc<AtomicBool>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self {
			records: Arc::new(DashMap::new()),
			closed: Arc::new(AtomicBool::new(false)),
		}
	}

	fn guard_open(&self) -> StorageResult<()> {
		if self.closed.load(Ordering::SeqCst) {
			return Err(StorageError::Connection {
				message: "store is closed".to_string(),
			});
		}
		Ok(())
	}
}

impl Default for MemoryStore {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for MemoryStore {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryStore")
			.field("records", &self.records.len())
			.field("closed", &self.closed.load(Ordering::SeqCst))
			.finish()
	}
}

#[async_trait]
impl SwapRecordStore for MemoryStore {
	async fn add_record(&self, record: SwapRecord) -> StorageResult<()> {
		self.guard_open()?;

		match self.records.entry(record.order_id.clone()) {
			dashmap::mapref::entry::Entry::Occupied(_) => {
				Err(StorageError::duplicate(&record.order_id))
			}
			dashmap::mapref::entry::Entry::Vacant(entry) => {
				debug!("Stored swap record {}", record.order_id);
				entry.insert(record);
				Ok(())
			}
		}
	}

	async fn get_record(&self, order_id: &str) -> StorageResult<Option<SwapRecord>> {
		self.guard_open()?;
		Ok(self.records.get(order_id).map(|r| r.clone()))
	}

	async fn update_status(&self, order_id: &str, status: SwapStatus) -> StorageResult<()> {
		self.guard_open()?;

		match self.records.get_mut(order_id) {
			Some(mut record) => {
				debug!("Swap record {} status -> {:?}", order_id, status);
				record.status = status;
				Ok(())
			}
			None => Err(StorageError::not_found(order_id)),
		}
	}

	async fn list_records(&self) -> StorageResult<Vec<SwapRecord>> {
		self.guard_open()?;

		let mut records: Vec<SwapRecord> = self
			.records
			.iter()
			.map(|entry| entry.value().clone())
			.collect();
		records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(records)
	}

	async fn count_records(&self) -> StorageResult<u64> {
		self.guard_open()?;
		Ok(self.records.len() as u64)
	}
}

#[async_trait]
impl SwapStorage for MemoryStore {
	async fn health_check(&self) -> StorageResult<bool> {
		Ok(!self.closed.load(Ordering::SeqCst))
	}

	async fn stats(&self) -> StorageResult<StorageStats> {
		self.guard_open()?;

		let mut pending = 0u64;
		let mut completed = 0u64;
		for entry in self.records.iter() {
			if entry.value().status.is_terminal() {
				completed += 1;
			} else {
				pending += 1;
			}
		}

		Ok(StorageStats {
			total_records: self.records.len() as u64,
			pending_records: pending,
			completed_records: completed,
		})
	}

	async fn close(&self) -> StorageResult<()> {
		info!("Closing memory store with {} records", self.records.len());
		self.closed.store(true, Ordering::SeqCst);
		Ok(())
	}
}
