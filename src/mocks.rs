//! Mock adapters and wallets for examples and testing
//!
//! This module provides simple, working mock collaborators that can be used
//! in examples and tests without network access or real keys.

use std::sync::Arc;

use async_trait::async_trait;
use swapflow_types::chrono::{Duration, Utc};
use uuid::Uuid;

use swapflow_types::{
	Adapter, AdapterError, AdapterResult, BroadcastReport, BroadcastedTx, CoinKey, ExchangeAdapter,
	FeeBreakdown, FeeLevel, HardwareTransport, MaxSpendInfo, ProposalSpec, ProviderRuntimeConfig,
	ProviderState, ProviderTxPayload, Quote, QuoteRequest, Route, SwapCoin, SwapLimits, SwapStatus,
	TransactionProposal, TxInput, WalletProvider, WalletRef, WalletResult,
};

/// Deterministic adapter for examples and testing.
///
/// Lists a small fixed coin set, quotes every pair at a constant rate and
/// walks the whole swap flow without leaving the process.
#[derive(Debug, Clone)]
pub struct MockDemoAdapter {
	pub id: String,
	pub name: String,
	pub adapter: Adapter,
}

impl MockDemoAdapter {
	/// Exchange rate applied to every quote
	pub const RATE: f64 = 20.0;

	/// Create a new mock demo adapter
	pub fn new() -> Self {
		let id = "mock-demo-v1".to_string();
		let name = "Mock Demo Adapter".to_string();
		Self {
			adapter: Adapter::new(&id, &name, "1.0.0")
				.with_description("Deterministic in-process adapter"),
			id,
			name,
		}
	}

	fn deposit_address() -> String {
		"0x00000000000000000000000000000000m0ckdep0".to_string()
	}
}

impl Default for MockDemoAdapter {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl ExchangeAdapter for MockDemoAdapter {
	fn adapter_info(&self) -> &Adapter {
		&self.adapter
	}

	async fn list_currencies(
		&self,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Vec<SwapCoin>> {
		Ok(vec![
			SwapCoin::new("btc", "Bitcoin", "btc").with_provider(&config.provider_id),
			SwapCoin::new("eth", "Ethereum", "eth").with_provider(&config.provider_id),
			SwapCoin::new("usdc", "USD Coin", "eth")
				.with_token_address("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")
				.with_provider(&config.provider_id),
		])
	}

	async fn get_limits(
		&self,
		_from: &CoinKey,
		_to: &CoinKey,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapLimits> {
		Ok(SwapLimits::new(Some(0.001), Some(100.0)))
	}

	async fn get_quote(
		&self,
		request: &QuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Quote> {
		let route = Route::new("MOCK", request.amount * Self::RATE)
			.with_fees(FeeBreakdown::new(0.0005, 0.001, 0.0015))
			.with_destination(&Self::deposit_address())
			.with_expiry(Utc::now() + Duration::minutes(5));

		let quote_id = format!("mock-quote-{}", Utc::now().timestamp_millis());
		Ok(Quote::new(&config.provider_id, request.amount, vec![route]).with_quote_id(&quote_id))
	}

	async fn build_transaction_payload(
		&self,
		request: &QuoteRequest,
		_quote: &Quote,
		route: &Route,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<ProviderTxPayload> {
		let payin = route
			.destination
			.clone()
			.unwrap_or_else(Self::deposit_address);
		let order_id = format!("mock-order-{}", Utc::now().timestamp_millis());

		Ok(ProviderTxPayload::new(&payin)
			.with_deposit_amount(request.amount)
			.with_provider_order_id(&order_id))
	}

	async fn report_broadcast(
		&self,
		_report: &BroadcastReport,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapStatus> {
		Ok(SwapStatus::Waiting)
	}

	async fn get_swap_status(
		&self,
		_quote_id: &str,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapStatus> {
		Ok(SwapStatus::Exchanging)
	}

	async fn health_check(&self, _config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		Ok(true)
	}
}

/// Simple test adapter that can be configured to succeed or fail
#[derive(Debug, Clone)]
pub struct MockFlakyAdapter {
	pub should_fail: bool,
	pub adapter: Adapter,
}

impl MockFlakyAdapter {
	pub fn new() -> Self {
		Self {
			adapter: Adapter::new("mock-flaky-v1", "Mock Flaky Adapter", "1.0.0"),
			should_fail: false,
		}
	}

	/// Variant that fails every operation
	pub fn failing() -> Self {
		Self {
			should_fail: true,
			..Self::new()
		}
	}

	fn failure(&self) -> AdapterError {
		AdapterError::invalid_response("mock adapter configured to fail")
	}
}

impl Default for MockFlakyAdapter {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl ExchangeAdapter for MockFlakyAdapter {
	fn adapter_info(&self) -> &Adapter {
		&self.adapter
	}

	async fn list_currencies(
		&self,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Vec<SwapCoin>> {
		if self.should_fail {
			return Err(self.failure());
		}
		Ok(vec![
			SwapCoin::new("btc", "Bitcoin", "btc").with_provider(&config.provider_id)
		])
	}

	async fn get_limits(
		&self,
		_from: &CoinKey,
		_to: &CoinKey,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapLimits> {
		if self.should_fail {
			return Err(self.failure());
		}
		Ok(SwapLimits::new(None, None))
	}

	async fn get_quote(
		&self,
		request: &QuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Quote> {
		if self.should_fail {
			return Err(self.failure());
		}
		Ok(Quote::new(&config.provider_id, request.amount, vec![]))
	}

	async fn build_transaction_payload(
		&self,
		_request: &QuoteRequest,
		_quote: &Quote,
		_route: &Route,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<ProviderTxPayload> {
		if self.should_fail {
			return Err(self.failure());
		}
		Ok(ProviderTxPayload::new("mock-payin-address"))
	}

	async fn report_broadcast(
		&self,
		_report: &BroadcastReport,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapStatus> {
		if self.should_fail {
			return Err(self.failure());
		}
		Ok(SwapStatus::Waiting)
	}

	async fn health_check(&self, _config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		Ok(!self.should_fail)
	}
}

/// In-process wallet with a fixed balance and deterministic fees
#[derive(Debug, Clone)]
pub struct MockDemoWallet {
	pub balance_sats: u64,
	pub fee_sats: u64,
}

impl MockDemoWallet {
	pub fn new() -> Self {
		Self {
			balance_sats: 10_000_000_000,
			fee_sats: 12_000,
		}
	}

	pub fn with_balance_sats(mut self, balance_sats: u64) -> Self {
		self.balance_sats = balance_sats;
		self
	}
}

impl Default for MockDemoWallet {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl WalletProvider for MockDemoWallet {
	async fn derive_receive_address(&self, wallet: &WalletRef) -> WalletResult<String> {
		Ok(format!("mock-{}-receive-address", wallet.ticker))
	}

	async fn estimate_fee_rate(&self, _wallet: &WalletRef, level: FeeLevel) -> WalletResult<u64> {
		Ok(match level {
			FeeLevel::Priority => 30_000,
			FeeLevel::Normal => 12_000,
			FeeLevel::Economy => 4_000,
		})
	}

	async fn estimate_max_spendable(
		&self,
		_wallet: &WalletRef,
		_fee_rate_per_kb: Option<u64>,
	) -> WalletResult<MaxSpendInfo> {
		Ok(MaxSpendInfo {
			amount_sats: self.balance_sats.saturating_sub(self.fee_sats),
			fee_sats: self.fee_sats,
			inputs: vec![TxInput {
				tx_id: "mock-utxo".to_string(),
				vout: 0,
				amount_sats: self.balance_sats,
			}],
			excluded_utxo_count: 0,
			excluded_amount_sats: 0,
		})
	}

	async fn create_transaction_proposal(
		&self,
		wallet: &WalletRef,
		spec: ProposalSpec,
	) -> WalletResult<TransactionProposal> {
		Ok(TransactionProposal::from_spec(wallet.clone(), spec, self.fee_sats))
	}

	async fn sign_and_broadcast(
		&self,
		_proposal: &TransactionProposal,
		_transport: Option<Arc<dyn HardwareTransport>>,
	) -> WalletResult<BroadcastedTx> {
		Ok(BroadcastedTx {
			tx_hash: format!("0x{}", Uuid::new_v4().simple()),
		})
	}

	async fn query_balance(&self, _wallet: &WalletRef) -> WalletResult<u64> {
		Ok(self.balance_sats)
	}
}

/// Provider state wired to [`MockDemoAdapter`] for quick engine setups
pub fn mock_provider() -> ProviderState {
	ProviderState::new("mock-exchange", "mock-demo-v1", "http://localhost:8080")
}
