//! Swapflow Types
//!
//! Shared models and traits for the swap orchestration engine. This crate
//! contains all domain models organized by business entity, with no I/O of
//! its own.

pub mod adapters;
pub mod coins;
pub mod constants;
pub mod hardware;
pub mod limits;
pub mod providers;
pub mod quotes;
pub mod records;
pub mod routes;
pub mod secret_string;
pub mod sessions;
pub mod storage;
pub mod test_utils;
pub mod transactions;
pub mod wallet;

// Re-export chrono and serde_json for convenience
pub use chrono;
pub use serde_json;

// Re-export commonly used types for convenience
pub use adapters::{
	Adapter, AdapterError, AdapterFailureKind, AdapterRegistryError, AdapterResult,
	AdapterValidationError, AdapterValidationResult, BroadcastReport, ExchangeAdapter,
	ProviderRuntimeConfig, ProviderTxPayload,
};

pub use coins::{CoinKey, SwapCoin};

pub use limits::{AmountCheck, SwapLimits};

pub use providers::{ApiCredentials, ProviderMetrics, ProviderState};

pub use quotes::{Quote, QuoteError, QuoteRequest, QuoteResult};

pub use records::{SwapRecord, SwapRecordStore, SwapStatus};

pub use routes::{expiry_from_provider_fields, non_empty, FeeBreakdown, Route, RouteTransaction};

pub use secret_string::SecretString;

pub use sessions::{
	CheckoutSession, ExpiryFallbackReason, ExpirySource, SessionError, SessionStatus,
};

pub use storage::{StorageError, StorageResult, StorageStats, SwapStorage};

pub use transactions::{
	to_smallest_unit, BuildError, FeeLevel, MaxSendNotice, MaxSpendInfo, ProposalMetadata,
	ProposalSpec, TransactionProposal, TxInput,
};

pub use wallet::{BroadcastedTx, WalletError, WalletProvider, WalletRef, WalletResult};

pub use hardware::{
	HardwareConnector, HardwareError, HardwareTransport, HardwareTransportState, PairingStatus,
	TransportKind,
};
