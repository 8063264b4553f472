//! Test utilities for creating common test objects
//!
//! Factory functions for coins, routes, quotes and providers used by unit
//! tests across the workspace. Production code must not depend on this
//! module.

use crate::coins::{CoinKey, SwapCoin};
use crate::limits::SwapLimits;
use crate::providers::{ApiCredentials, ProviderState};
use crate::quotes::{Quote, QuoteRequest};
use crate::routes::{FeeBreakdown, Route, RouteTransaction};
use chrono::{Duration, Utc};

/// Common test coin factories
pub struct TestCoins;

impl TestCoins {
	pub fn btc() -> SwapCoin {
		SwapCoin::new("btc", "Bitcoin", "btc")
	}

	pub fn eth() -> SwapCoin {
		SwapCoin::new("eth", "Ethereum", "eth")
	}

	pub fn matic() -> SwapCoin {
		SwapCoin::new("matic", "Polygon", "matic")
	}

	/// USDC as an ERC-20 token on the Ethereum chain
	pub fn usdc_on_eth() -> SwapCoin {
		SwapCoin::new("usdc", "USD Coin", "eth")
			.with_token_address("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")
	}

	/// XRP, a chain that requires destination tags
	pub fn xrp() -> SwapCoin {
		SwapCoin::new("xrp", "Ripple", "xrp")
	}
}

/// Common test quote-request factories
pub struct TestRequests;

impl TestRequests {
	/// Native-to-native cross-chain request (BTC -> ETH)
	pub fn btc_to_eth(amount: f64) -> QuoteRequest {
		QuoteRequest::new(
			CoinKey::new("btc", "btc"),
			CoinKey::new("eth", "eth"),
			amount,
			"bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4",
			"0x742d35Cc6634C0532925a3b8D38BA2297C33A9D7",
		)
	}

	/// Same-chain token sell (USDC on Ethereum -> ETH)
	pub fn usdc_to_eth(amount: f64) -> QuoteRequest {
		QuoteRequest::new(
			CoinKey::new("usdc", "eth"),
			CoinKey::new("eth", "eth"),
			amount,
			"0x742d35Cc6634C0532925a3b8D38BA2297C33A9D7",
			"0x742d35Cc6634C0532925a3b8D38BA2297C33A9D7",
		)
	}
}

/// Common test route factories
pub struct TestRoutes;

impl TestRoutes {
	/// Native-coin route with a deposit destination and a provider expiry
	pub fn native(routing_key: &str, expected_output: f64) -> Route {
		Route::new(routing_key, expected_output)
			.with_destination("bc1qdepositaddress00000000000000000000000")
			.with_fees(FeeBreakdown::new(0.0004, 0.001, 0.0014))
			.with_expiry(Utc::now() + Duration::minutes(8))
	}

	/// EVM token route carrying calldata, a spender and a gas estimate
	pub fn evm_token(routing_key: &str, expected_output: f64) -> Route {
		Route::new(routing_key, expected_output)
			.with_destination("0x1111111254EEB25477B68fb85Ed929f73A960582")
			.with_transaction(RouteTransaction {
				to: Some("0x1111111254EEB25477B68fb85Ed929f73A960582".to_string()),
				data: Some("0x38ed1739000000000000000000000000000000ff".to_string()),
				gas: Some(180_000),
			})
	}

	/// Route whose provider omitted every destination field
	pub fn missing_destination(routing_key: &str) -> Route {
		Route::new(routing_key, 1.0)
	}
}

/// Common test quote factories
pub struct TestQuotes;

impl TestQuotes {
	pub fn single_route(provider_id: &str, routing_key: &str) -> Quote {
		Quote::new(provider_id, 1.0, vec![TestRoutes::native(routing_key, 0.05)])
	}

	pub fn multi_route(provider_id: &str, routing_keys: &[&str]) -> Quote {
		let routes = routing_keys
			.iter()
			.enumerate()
			.map(|(i, key)| TestRoutes::evm_token(key, 2.0 - i as f64 * 0.1))
			.collect();
		Quote::new(provider_id, 1.0, routes)
	}
}

/// Common test provider factories
pub struct TestProviders;

impl TestProviders {
	pub fn thorswap() -> ProviderState {
		ProviderState::new("thorswap", "thorswap", "https://api.thorswap.finance")
			.with_credentials(ApiCredentials::new("test-api-key"))
	}

	pub fn changelly() -> ProviderState {
		ProviderState::new("changelly", "changelly", "https://api.changelly.com")
			.with_credentials(ApiCredentials::new("test-api-key").with_secret("test-secret"))
	}

	/// Provider that already listed the given coins in a successful round
	pub fn with_coins(provider_id: &str, coins: Vec<SwapCoin>) -> ProviderState {
		let mut provider = ProviderState::new(
			provider_id,
			provider_id,
			&format!("https://api.{}.example", provider_id),
		);
		provider.complete_round(
			coins
				.into_iter()
				.map(|c| c.with_provider(provider_id))
				.collect(),
		);
		provider
	}

	/// Provider carrying known pair limits
	pub fn with_limits(provider_id: &str, min: Option<f64>, max: Option<f64>) -> ProviderState {
		let mut provider = Self::with_coins(provider_id, vec![TestCoins::btc(), TestCoins::eth()]);
		provider.limits = Some(SwapLimits {
			min_amount: min,
			max_amount: max,
		});
		provider
	}
}
