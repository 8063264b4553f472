//! Currency and limits aggregation through the engine facade

mod mocks;

use std::sync::Arc;

use mocks::adapters::ScriptedAdapter;
use mocks::configs::MockConfigs;
use swapflow::mocks::MockDemoWallet;
use swapflow::{
	CoinKey, EngineError, LimitsError, ProviderState, SwapEngine, SwapEngineBuilder, SwapLimits,
};

async fn two_provider_engine(a: ScriptedAdapter, b: ScriptedAdapter) -> SwapEngine {
	let a_id = a.adapter.adapter_id.clone();
	let b_id = b.adapter.adapter_id.clone();
	SwapEngineBuilder::new()
		.with_settings(MockConfigs::test_settings())
		.with_adapter(Arc::new(a))
		.with_adapter(Arc::new(b))
		.with_provider(ProviderState::new(
			"alpha",
			&a_id,
			"http://localhost:8080",
		))
		.with_provider(ProviderState::new("beta", &b_id, "http://localhost:8081"))
		.with_wallet(MockDemoWallet::new())
		.build()
		.await
		.unwrap()
}

#[tokio::test]
async fn test_partial_failure_keeps_surviving_providers() {
	let engine = two_provider_engine(
		ScriptedAdapter::new("alpha-v1"),
		ScriptedAdapter::failing("beta-v1"),
	)
	.await;

	let snapshot = engine.refresh_currencies().await;

	assert_eq!(snapshot.providers_queried, 2);
	assert_eq!(snapshot.providers_offering, 1);
	assert!(snapshot.coins.iter().any(|c| c.ticker == "btc"));

	// Only the surviving provider backs the published coins.
	for coin in &snapshot.coins {
		assert!(coin.supported_by.contains("alpha"));
		assert!(!coin.supported_by.contains("beta"));
	}
}

#[tokio::test(start_paused = true)]
async fn test_slow_provider_times_out_of_round() {
	let engine = two_provider_engine(
		ScriptedAdapter::new("alpha-v1").with_delay_ms(10_000),
		ScriptedAdapter::new("beta-v1"),
	)
	.await;

	// Per-provider budget is 2000ms; the slow provider misses it and sits
	// out the round without stalling it.
	let snapshot = engine.refresh_currencies().await;

	assert_eq!(snapshot.providers_queried, 2);
	assert_eq!(snapshot.providers_offering, 1);
	for coin in &snapshot.coins {
		assert!(coin.supported_by.contains("beta"));
		assert!(!coin.supported_by.contains("alpha"));
	}

	let alpha = engine.directory().get("alpha").await.unwrap();
	assert!(!alpha.is_offering());
	assert!(alpha.last_error.is_some());
}

#[tokio::test]
async fn test_coins_merge_provider_support() {
	let engine = two_provider_engine(
		ScriptedAdapter::new("alpha-v1"),
		ScriptedAdapter::new("beta-v1"),
	)
	.await;

	let snapshot = engine.refresh_currencies().await;
	assert_eq!(snapshot.providers_offering, 2);

	let btc = snapshot
		.coins
		.iter()
		.find(|c| c.ticker == "btc" && c.chain == "btc")
		.expect("btc listed");
	assert!(btc.supported_by.contains("alpha"));
	assert!(btc.supported_by.contains("beta"));

	// Preferred tickers from settings lead the ranking.
	assert_eq!(snapshot.coins[0].ticker, "btc");
}

#[tokio::test]
async fn test_pair_limits_combines_provider_bounds() {
	let engine = two_provider_engine(
		ScriptedAdapter::new("alpha-v1").with_limits(SwapLimits::new(Some(0.01), Some(5.0))),
		ScriptedAdapter::new("beta-v1").with_limits(SwapLimits::new(Some(0.05), Some(8.0))),
	)
	.await;

	engine.refresh_currencies().await;

	let limits = engine
		.pair_limits(&CoinKey::new("btc", "btc"), &CoinKey::new("eth", "eth"))
		.await
		.unwrap();

	// The tradable window spans every provider's bounds.
	assert_eq!(limits.min_amount, Some(0.01));
	assert_eq!(limits.max_amount, Some(8.0));
}

#[tokio::test]
async fn test_pair_limits_round_fills_provider_cache() {
	let engine = two_provider_engine(
		ScriptedAdapter::new("alpha-v1").with_limits(SwapLimits::new(Some(0.01), Some(5.0))),
		ScriptedAdapter::new("beta-v1").with_limits(SwapLimits::new(Some(0.05), Some(8.0))),
	)
	.await;

	engine.refresh_currencies().await;
	engine
		.pair_limits(&CoinKey::new("btc", "btc"), &CoinKey::new("eth", "eth"))
		.await
		.unwrap();

	let alpha = engine.directory().get("alpha").await.unwrap();
	assert_eq!(alpha.limits, Some(SwapLimits::new(Some(0.01), Some(5.0))));
}

#[tokio::test]
async fn test_pair_limits_unknown_pair_is_disabled() {
	let engine = two_provider_engine(
		ScriptedAdapter::new("alpha-v1"),
		ScriptedAdapter::new("beta-v1"),
	)
	.await;

	engine.refresh_currencies().await;

	let err = engine
		.pair_limits(&CoinKey::new("doge", "doge"), &CoinKey::new("xmr", "xmr"))
		.await
		.unwrap_err();

	assert!(matches!(
		err,
		EngineError::Limits(LimitsError::PairDisabled { .. })
	));
}

#[tokio::test]
async fn test_refresh_rounds_are_stable() {
	let engine = two_provider_engine(
		ScriptedAdapter::new("alpha-v1"),
		ScriptedAdapter::new("beta-v1"),
	)
	.await;

	let first = engine.refresh_currencies().await;
	let second = engine.refresh_currencies().await;

	assert_eq!(first.coins.len(), second.coins.len());
	assert_eq!(second.providers_offering, 2);
	assert!(second.refreshed_at.is_some());

	// The cached snapshot matches the last round.
	let cached = engine.currencies().await;
	assert_eq!(cached.coins.len(), second.coins.len());
}
