//! Core adapter trait for exchange integrations

use super::{Adapter, AdapterResult, ProviderRuntimeConfig};
use crate::adapters::models::{BroadcastReport, ProviderTxPayload};
use crate::adapters::AdapterError;
use crate::coins::{CoinKey, SwapCoin};
use crate::limits::SwapLimits;
use crate::quotes::{Quote, QuoteRequest};
use crate::records::SwapStatus;
use crate::routes::Route;
use async_trait::async_trait;
use std::fmt::Debug;

/// Contract every exchange integration implements.
///
/// Implementations must be side-effect-free on failure (no partial state)
/// and must classify every error so the aggregation layer can branch on
/// [`AdapterError::failure_kind`] alone. Provider field-name quirks are
/// normalized here, never above this boundary.
#[async_trait]
pub trait ExchangeAdapter: Send + Sync + Debug {
	/// Descriptor for this adapter implementation.
	/// The only method without a default or an operation body of its own.
	fn adapter_info(&self) -> &Adapter;

	/// Adapter ID (for registration and provider matching)
	fn id(&self) -> &str {
		&self.adapter_info().adapter_id
	}

	/// Assets the provider currently offers for swapping
	async fn list_currencies(
		&self,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Vec<SwapCoin>>;

	/// Min/max tradable amount for a pair, in the from-asset unit
	async fn get_limits(
		&self,
		from: &CoinKey,
		to: &CoinKey,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapLimits>;

	/// Quote for a concrete amount; routes come back best-first
	async fn get_quote(
		&self,
		request: &QuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Quote>;

	/// Provider-side payment instructions for a selected route
	async fn build_transaction_payload(
		&self,
		request: &QuoteRequest,
		quote: &Quote,
		route: &Route,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<ProviderTxPayload>;

	/// Tell the provider about the broadcast transaction so it can track the
	/// swap's progress
	async fn report_broadcast(
		&self,
		report: &BroadcastReport,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapStatus>;

	/// Current provider-side status of a reported swap.
	///
	/// Default implementation returns UnsupportedOperation error.
	/// Override this method if the provider exposes status polling.
	async fn get_swap_status(
		&self,
		_quote_id: &str,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapStatus> {
		Err(AdapterError::UnsupportedOperation {
			operation: "get_swap_status".to_string(),
			adapter_id: self.id().to_string(),
		})
	}

	/// Is the provider reachable right now?
	async fn health_check(&self, config: &ProviderRuntimeConfig) -> AdapterResult<bool>;
}
