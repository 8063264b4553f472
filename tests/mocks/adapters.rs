//! Scripted adapters for engine integration tests
//!
//! One configurable adapter covers the scenarios the suites need: call
//! tracking, failure simulation, response delays and scripted listings,
//! limits, payloads and statuses.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use swapflow::chrono::Utc;

use swapflow::{
	Adapter, AdapterError, AdapterResult, BroadcastReport, CoinKey, ExchangeAdapter, FeeBreakdown,
	ProviderRuntimeConfig, ProviderTxPayload, Quote, QuoteRequest, Route, SwapCoin, SwapLimits,
	SwapStatus,
};

/// Scripted adapter with call tracking
///
/// Clones share the call counters, so a test can keep one handle while the
/// engine owns another.
#[derive(Debug, Clone)]
pub struct ScriptedAdapter {
	pub adapter: Adapter,
	pub should_fail: bool,
	pub fail_listings: bool,
	pub response_delay_ms: u64,
	pub coins: Vec<SwapCoin>,
	pub limits: SwapLimits,
	pub rate: f64,
	pub payin_address: String,
	pub provider_order_id: Option<String>,
	pub status: SwapStatus,
	quote_calls: Arc<AtomicUsize>,
	report_calls: Arc<AtomicUsize>,
	status_calls: Arc<AtomicUsize>,
}

impl ScriptedAdapter {
	/// Create a well-behaved adapter listing btc and eth
	pub fn new(id: &str) -> Self {
		Self {
			adapter: Adapter::new(id, &format!("{} Adapter", id), "1.0.0"),
			should_fail: false,
			fail_listings: false,
			response_delay_ms: 0,
			coins: vec![
				SwapCoin::new("btc", "Bitcoin", "btc"),
				SwapCoin::new("eth", "Ethereum", "eth"),
			],
			limits: SwapLimits::new(Some(0.01), Some(10.0)),
			rate: 20.0,
			payin_address: "scripted-payin-address".to_string(),
			provider_order_id: None,
			status: SwapStatus::Exchanging,
			quote_calls: Arc::new(AtomicUsize::new(0)),
			report_calls: Arc::new(AtomicUsize::new(0)),
			status_calls: Arc::new(AtomicUsize::new(0)),
		}
	}

	/// Adapter whose every operation fails
	pub fn failing(id: &str) -> Self {
		Self {
			should_fail: true,
			..Self::new(id)
		}
	}

	/// Adapter that fails only currency listings; quotes, payloads and
	/// status polls keep working
	pub fn with_failing_listings(mut self) -> Self {
		self.fail_listings = true;
		self
	}

	pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
		self.response_delay_ms = delay_ms;
		self
	}

	pub fn with_coins(mut self, coins: Vec<SwapCoin>) -> Self {
		self.coins = coins;
		self
	}

	pub fn with_limits(mut self, limits: SwapLimits) -> Self {
		self.limits = limits;
		self
	}

	pub fn with_rate(mut self, rate: f64) -> Self {
		self.rate = rate;
		self
	}

	pub fn with_provider_order_id(mut self, order_id: &str) -> Self {
		self.provider_order_id = Some(order_id.to_string());
		self
	}

	pub fn with_status(mut self, status: SwapStatus) -> Self {
		self.status = status;
		self
	}

	pub fn quote_calls(&self) -> usize {
		self.quote_calls.load(Ordering::Relaxed)
	}

	pub fn report_calls(&self) -> usize {
		self.report_calls.load(Ordering::Relaxed)
	}

	pub fn status_calls(&self) -> usize {
		self.status_calls.load(Ordering::Relaxed)
	}

	async fn simulate(&self) -> AdapterResult<()> {
		if self.response_delay_ms > 0 {
			tokio::time::sleep(Duration::from_millis(self.response_delay_ms)).await;
		}
		if self.should_fail {
			return Err(AdapterError::invalid_response(format!(
				"adapter {} scripted to fail",
				self.adapter.adapter_id
			)));
		}
		Ok(())
	}
}

#[async_trait]
impl ExchangeAdapter for ScriptedAdapter {
	fn adapter_info(&self) -> &Adapter {
		&self.adapter
	}

	async fn list_currencies(
		&self,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Vec<SwapCoin>> {
		self.simulate().await?;
		if self.fail_listings {
			return Err(AdapterError::invalid_response(format!(
				"adapter {} scripted to fail listings",
				self.adapter.adapter_id
			)));
		}
		Ok(self
			.coins
			.iter()
			.cloned()
			.map(|coin| coin.with_provider(&config.provider_id))
			.collect())
	}

	async fn get_limits(
		&self,
		_from: &CoinKey,
		_to: &CoinKey,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapLimits> {
		self.simulate().await?;
		Ok(self.limits)
	}

	async fn get_quote(
		&self,
		request: &QuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Quote> {
		self.quote_calls.fetch_add(1, Ordering::Relaxed);
		self.simulate().await?;

		let route = Route::new("SCRIPTED", request.amount * self.rate)
			.with_fees(FeeBreakdown::new(0.0005, 0.001, 0.0015))
			.with_destination(&self.payin_address)
			.with_expiry(Utc::now() + swapflow::chrono::Duration::minutes(5));
		let quote_id = format!(
			"{}-quote-{}",
			self.adapter.adapter_id,
			Utc::now().timestamp_millis()
		);

		Ok(Quote::new(&config.provider_id, request.amount, vec![route]).with_quote_id(&quote_id))
	}

	async fn build_transaction_payload(
		&self,
		request: &QuoteRequest,
		_quote: &Quote,
		_route: &Route,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<ProviderTxPayload> {
		self.simulate().await?;

		let mut payload =
			ProviderTxPayload::new(&self.payin_address).with_deposit_amount(request.amount);
		if let Some(order_id) = &self.provider_order_id {
			payload = payload.with_provider_order_id(order_id);
		}
		Ok(payload)
	}

	async fn report_broadcast(
		&self,
		_report: &BroadcastReport,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapStatus> {
		self.report_calls.fetch_add(1, Ordering::Relaxed);
		self.simulate().await?;
		Ok(SwapStatus::Waiting)
	}

	async fn get_swap_status(
		&self,
		_quote_id: &str,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapStatus> {
		self.status_calls.fetch_add(1, Ordering::Relaxed);
		self.simulate().await?;
		Ok(self.status)
	}

	async fn health_check(&self, _config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		Ok(!self.should_fail)
	}
}
