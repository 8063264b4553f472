//! Example demonstrating how to register a custom adapter implementation

use std::sync::Arc;

use async_trait::async_trait;
use swapflow::chrono::{Duration, Utc};
use swapflow::mocks::MockDemoWallet;
use swapflow::{
	Adapter, AdapterResult, BroadcastReport, CheckoutOptions, CoinKey, ExchangeAdapter,
	FeeBreakdown, ProviderRuntimeConfig, ProviderState, ProviderTxPayload, Quote, QuoteRequest,
	Route, SwapCoin, SwapEngineBuilder, SwapLimits, SwapStatus, WalletRef,
};
use tracing::info;

/// Example custom adapter implementation.
///
/// The adapter is stateless and receives the provider configuration at
/// runtime, so one instance can serve several configured providers.
#[derive(Debug)]
pub struct FixedRateAdapter {
	adapter: Adapter,
	rate: f64,
}

impl FixedRateAdapter {
	pub fn new() -> Self {
		Self {
			adapter: Adapter::new("fixed-rate-v1", "Fixed Rate Adapter", "1.0.0")
				.with_description("Demo adapter quoting every pair at a constant rate"),
			rate: 16.5,
		}
	}
}

impl Default for FixedRateAdapter {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl ExchangeAdapter for FixedRateAdapter {
	fn adapter_info(&self) -> &Adapter {
		&self.adapter
	}

	async fn list_currencies(
		&self,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Vec<SwapCoin>> {
		info!(
			"Custom adapter {} listing currencies for provider {}",
			self.id(),
			config.provider_id
		);
		Ok(vec![
			SwapCoin::new("btc", "Bitcoin", "btc").with_provider(&config.provider_id),
			SwapCoin::new("eth", "Ethereum", "eth").with_provider(&config.provider_id),
		])
	}

	async fn get_limits(
		&self,
		_from: &CoinKey,
		_to: &CoinKey,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapLimits> {
		Ok(SwapLimits::new(Some(0.01), Some(25.0)))
	}

	async fn get_quote(
		&self,
		request: &QuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Quote> {
		info!(
			"Custom adapter {} quoting {} {} via provider {} (endpoint: {})",
			self.id(),
			request.amount,
			request.from.ticker,
			config.provider_id,
			config.endpoint
		);

		let route = Route::new("FIXED", request.amount * self.rate)
			.with_fees(FeeBreakdown::new(0.0003, 0.0008, 0.0011))
			.with_destination("0x000000000000000000000000000000f1xedrate0")
			.with_expiry(Utc::now() + Duration::minutes(10));

		let quote_id = format!("fixed-quote-{}", Utc::now().timestamp_millis());
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
			.unwrap_or_else(|| "0x000000000000000000000000000000f1xedrate0".to_string());

		Ok(ProviderTxPayload::new(&payin)
			.with_deposit_amount(request.amount)
			.with_provider_order_id(&format!("fixed-{}", Utc::now().timestamp_millis())))
	}

	async fn report_broadcast(
		&self,
		report: &BroadcastReport,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapStatus> {
		info!(
			"Custom adapter {} notified of broadcast {}",
			self.id(),
			report.tx_hash
		);
		Ok(SwapStatus::Waiting)
	}

	async fn get_swap_status(
		&self,
		_quote_id: &str,
		_config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapStatus> {
		Ok(SwapStatus::Confirming)
	}

	async fn health_check(&self, _config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		Ok(true)
	}
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	// Build the engine with the custom adapter and a provider wired to it.
	// start() initializes tracing, so logging begins after this call.
	let engine = SwapEngineBuilder::new()
		.with_adapter(Arc::new(FixedRateAdapter::new()))
		.with_provider(ProviderState::new(
			"fixed-exchange",
			"fixed-rate-v1",
			"https://api.fixed-rate.example.com",
		))
		.with_wallet(MockDemoWallet::new())
		.start()
		.await?;
	info!("🚀 Starting custom adapter demo");

	let snapshot = engine.refresh_currencies().await;
	info!(
		"✅ Engine up with {} coin(s) from {} provider(s)",
		snapshot.coins.len(),
		snapshot.providers_offering
	);

	// Walk the whole flow against the custom adapter
	let request = QuoteRequest::new(
		CoinKey::new("btc", "btc"),
		CoinKey::new("eth", "eth"),
		0.25,
		"bc1-demo-sender-address",
		"0xdemo-recipient-address",
	);
	let quote = engine.request_quote("fixed-exchange", request.clone()).await?;
	info!(
		"📊 Quote {} offers {} route(s)",
		quote.quote_id,
		quote.routes.len()
	);

	let wallet = WalletRef::new("demo-btc-wallet", "btc", "btc", 8);
	let session = engine
		.prepare_checkout(wallet, request, &quote, CheckoutOptions::default())
		.await?;
	let record = engine.sign(&session).await?;
	info!(
		"Swap {} broadcast as {} with status {:?}",
		record.order_id, record.tx_hash, record.status
	);

	let status = engine.refresh_swap_status(&record.order_id).await?;
	info!("Provider now reports {:?}", status);

	info!("🎉 Custom adapter demo completed successfully!");
	engine.shutdown().await?;
	Ok(())
}
