//! Example demonstrating pluggable storage backends

use std::sync::Arc;

use swapflow::mocks::{mock_provider, MockDemoAdapter, MockDemoWallet};
use swapflow::models::SwapRecordStore;
use swapflow::{
	CheckoutOptions, CoinKey, MemoryStore, QuoteRequest, SwapEngineBuilder, SwapStorage, WalletRef,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt::init();

	println!("🔌 Pluggable Storage Backend Demo");
	println!("==================================");

	// One store shared by every engine built below. MemoryStore clones share
	// the same underlying maps.
	let store = MemoryStore::new();

	println!("\n1. Running a swap against the shared store");
	let engine = SwapEngineBuilder::new()
		.with_storage(store.clone())
		.with_adapter(Arc::new(MockDemoAdapter::new()))
		.with_provider(mock_provider())
		.with_wallet(MockDemoWallet::new())
		.build()
		.await?;

	engine.refresh_currencies().await;
	let request = QuoteRequest::new(
		CoinKey::new("btc", "btc"),
		CoinKey::new("eth", "eth"),
		0.1,
		"bc1-demo-sender-address",
		"0xdemo-recipient-address",
	);
	let quote = engine
		.request_quote("mock-exchange", request.clone())
		.await?;
	let wallet = WalletRef::new("demo-btc-wallet", "btc", "btc", 8);
	let session = engine
		.prepare_checkout(wallet, request, &quote, CheckoutOptions::default())
		.await?;
	let record = engine.sign(&session).await?;
	println!("  ✓ Swap {} recorded", record.order_id);

	let stats = store.stats().await?;
	println!(
		"  ✓ Store now holds {} record(s), {} pending",
		stats.total_records, stats.pending_records
	);

	println!("\n2. A second engine over the same store sees the history");
	let second = SwapEngineBuilder::new()
		.with_storage(store.clone())
		.with_adapter(Arc::new(MockDemoAdapter::new()))
		.with_provider(mock_provider())
		.with_wallet(MockDemoWallet::new())
		.build()
		.await?;

	for entry in second.swap_history().await? {
		println!(
			"  ✓ History: {} sent {} {} for {} {}",
			entry.order_id, entry.amount_from, entry.coin_from, entry.amount_to, entry.coin_to
		);
	}

	let health = store.health_check().await?;
	println!(
		"  ✓ Health check: {}",
		if health { "PASSED" } else { "FAILED" }
	);
	println!(
		"  ✓ {} record(s) via the record store trait",
		store.count_records().await?
	);

	// A custom backend implements SwapRecordStore plus the SwapStorage
	// lifecycle methods and drops in through with_storage. MemoryStore in
	// the storage crate is the reference implementation.
	println!("\n✅ Storage backend demo completed successfully!");
	Ok(())
}
