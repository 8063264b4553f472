//! Tests for the engine builder

mod mocks;

use std::sync::Arc;

use mocks::configs::MockConfigs;
use swapflow::config::{ConfigurableValue, CredentialSettings};
use swapflow::mocks::{mock_provider, MockDemoAdapter, MockDemoWallet};
use swapflow::models::SwapRecordStore;
use swapflow::{
	CoinKey, EngineError, MemoryStore, ProviderState, QuoteRequest, SwapEngineBuilder,
};

fn quote_request() -> QuoteRequest {
	QuoteRequest::new(
		CoinKey::new("btc", "btc"),
		CoinKey::new("eth", "eth"),
		0.5,
		"bc1-test-sender",
		"0xtest-recipient",
	)
}

#[tokio::test]
async fn test_builder_new() {
	let builder = SwapEngineBuilder::new();
	assert!(builder.settings().is_none());
}

#[tokio::test]
async fn test_builder_settings_access() {
	let settings = MockConfigs::test_settings();
	let builder = SwapEngineBuilder::new().with_settings(settings.clone());

	assert!(builder.settings().is_some());
	assert_eq!(
		builder.settings().unwrap().timeouts.global_ms,
		settings.timeouts.global_ms
	);
}

#[tokio::test]
async fn test_build_requires_wallet() {
	let result = SwapEngineBuilder::new()
		.with_settings(MockConfigs::test_settings())
		.build()
		.await;

	assert!(matches!(result, Err(EngineError::MissingWallet)));
}

#[tokio::test]
async fn test_build_with_wallet_and_defaults() {
	let engine = SwapEngineBuilder::new()
		.with_settings(MockConfigs::test_settings())
		.with_wallet(MockDemoWallet::new())
		.build()
		.await
		.unwrap();

	// No providers configured, so the directory starts empty.
	let snapshot = engine.currencies().await;
	assert_eq!(snapshot.providers_queried, 0);
	assert!(snapshot.coins.is_empty());
}

#[tokio::test]
async fn test_build_registers_custom_adapter_and_provider() {
	let engine = SwapEngineBuilder::new()
		.with_settings(MockConfigs::test_settings())
		.with_adapter(Arc::new(MockDemoAdapter::new()))
		.with_provider(mock_provider())
		.with_wallet(MockDemoWallet::new())
		.build()
		.await
		.unwrap();

	let snapshot = engine.refresh_currencies().await;
	assert_eq!(snapshot.providers_offering, 1);
	assert!(!snapshot.coins.is_empty());
}

#[tokio::test]
async fn test_duplicate_adapter_registration_fails() {
	let result = SwapEngineBuilder::new()
		.with_settings(MockConfigs::test_settings())
		.with_adapter(Arc::new(MockDemoAdapter::new()))
		.with_adapter(Arc::new(MockDemoAdapter::new()))
		.with_wallet(MockDemoWallet::new())
		.build()
		.await;

	assert!(matches!(result, Err(EngineError::Registry(_))));
}

#[tokio::test]
async fn test_provider_with_missing_credential_is_skipped() {
	// Credentials resolving from an unset environment variable must not
	// take the whole engine down, only that provider.
	let mut settings = MockConfigs::test_settings();
	let mut provider = MockConfigs::test_provider("changelly");
	provider.api_credentials = Some(CredentialSettings {
		api_key: ConfigurableValue::from_env("SWAPFLOW_TEST_UNSET_CREDENTIAL"),
		api_secret: None,
	});
	settings.providers.insert("changelly".to_string(), provider);

	let engine = SwapEngineBuilder::new()
		.with_settings(settings)
		.with_wallet(MockDemoWallet::new())
		.build()
		.await
		.unwrap();

	let snapshot = engine.currencies().await;
	assert_eq!(snapshot.providers_queried, 0);
}

#[tokio::test]
async fn test_settings_provider_reaches_directory() {
	let settings = MockConfigs::test_settings_with_provider("demo", "mock-demo-v1");

	let engine = SwapEngineBuilder::new()
		.with_settings(settings)
		.with_adapter(Arc::new(MockDemoAdapter::new()))
		.with_wallet(MockDemoWallet::new())
		.build()
		.await
		.unwrap();

	let provider = engine.directory().get("demo").await.unwrap();
	assert_eq!(provider.adapter_id, "mock-demo-v1");
	assert_eq!(provider.timeout_ms, 1000);
}

#[tokio::test]
async fn test_explicit_provider_overrides_settings_entry() {
	let settings = MockConfigs::test_settings_with_provider("mock-exchange", "mock-demo-v1");

	let engine = SwapEngineBuilder::new()
		.with_settings(settings)
		.with_adapter(Arc::new(MockDemoAdapter::new()))
		.with_provider(ProviderState::new(
			"mock-exchange",
			"mock-demo-v1",
			"http://localhost:9999",
		))
		.with_wallet(MockDemoWallet::new())
		.build()
		.await
		.unwrap();

	let provider = engine.directory().get("mock-exchange").await.unwrap();
	assert_eq!(provider.endpoint, "http://localhost:9999");
}

#[tokio::test]
async fn test_provider_with_unknown_adapter_still_builds() {
	let engine = SwapEngineBuilder::new()
		.with_settings(MockConfigs::test_settings())
		.with_provider(ProviderState::new(
			"orphan",
			"no-such-adapter",
			"http://localhost:8081",
		))
		.with_wallet(MockDemoWallet::new())
		.build()
		.await
		.unwrap();

	// The provider exists but operations against it surface the gap.
	let err = engine
		.request_quote("orphan", quote_request())
		.await
		.unwrap_err();
	assert!(matches!(err, EngineError::AdapterMissing { .. }));
}

#[tokio::test]
async fn test_build_with_custom_storage() {
	let storage = MemoryStore::new();
	let engine = SwapEngineBuilder::new()
		.with_settings(MockConfigs::test_settings())
		.with_storage(storage.clone())
		.with_wallet(MockDemoWallet::new())
		.build()
		.await
		.unwrap();

	// The test's handle shares state with the engine's copy.
	assert!(engine.swap_history().await.unwrap().is_empty());
	assert_eq!(storage.count_records().await.unwrap(), 0);
}
