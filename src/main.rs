//! Swapflow Engine Demo
//!
//! Walks the full swap flow against the in-process mock provider: currency
//! refresh, limits, quote, checkout, signing and history.

use std::sync::Arc;

use swapflow::mocks::{mock_provider, MockDemoAdapter, MockDemoWallet};
use swapflow::{
	CheckoutOptions, CoinKey, EngineError, QuoteRequest, Settings, SwapEngineBuilder, WalletRef,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), EngineError> {
	// Keep the demo hermetic: drop the default live providers and run
	// against the mock only.
	let mut settings = Settings::default();
	settings.providers.clear();

	let engine = SwapEngineBuilder::new()
		.with_settings(settings)
		.with_adapter(Arc::new(MockDemoAdapter::new()))
		.with_provider(mock_provider())
		.with_wallet(MockDemoWallet::new())
		.start()
		.await?;

	let snapshot = engine.refresh_currencies().await;
	info!(
		"Listing {} coins from {} offering provider(s)",
		snapshot.coins.len(),
		snapshot.providers_offering
	);

	let btc = CoinKey::new("btc", "btc");
	let eth = CoinKey::new("eth", "eth");

	let limits = engine.pair_limits(&btc, &eth).await?;
	info!(
		"btc -> eth tradable between {:?} and {:?}",
		limits.min_amount, limits.max_amount
	);

	let request = QuoteRequest::new(
		btc,
		eth,
		0.5,
		"bc1-demo-sender-address",
		"0xdemo-recipient-address",
	);
	let quote = engine
		.request_quote("mock-exchange", request.clone())
		.await?;
	info!(
		"Quote {} offers {} route(s)",
		quote.quote_id,
		quote.routes.len()
	);

	let wallet = WalletRef::new("demo-btc-wallet", "btc", "btc", 8);
	let session = engine
		.prepare_checkout(wallet, request, &quote, CheckoutOptions::default())
		.await?;
	info!("Checkout session {} open", session.session_id());

	let record = engine.sign(&session).await?;
	info!(
		"Swap {} broadcast as {} with status {:?}",
		record.order_id, record.tx_hash, record.status
	);

	for entry in engine.swap_history().await? {
		info!(
			"History: {} sent {} {} for {} {}",
			entry.order_id, entry.amount_from, entry.coin_from, entry.amount_to, entry.coin_to
		);
	}

	engine.shutdown().await
}
