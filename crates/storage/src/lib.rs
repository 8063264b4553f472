//! Swapflow Storage
//!
//! Swap-record storage backends for the swapflow engine. The trait contract
//! lives in `swapflow-types::storage`; this crate ships the in-memory
//! implementation used as the default engine storage and in tests.

pub mod memory_store;

pub use memory_store::MemoryStore;
