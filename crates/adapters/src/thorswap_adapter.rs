//! Thorswap aggregator adapter
//!
//! REST adapter for Thorswap's multi-route swap API. Quotes come back with
//! several routes (one per spender), each carrying its own fees, optional
//! EVM transaction fragment and expiry. All of Thorswap's field-name quirks
//! (destination under `transaction.to` or `targetAddress`, expiry under
//! `calldata.deadline` or `calldata.expiration`, gas as number or hex
//! string) are normalized here into the canonical route shape.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use swapflow_types::{
	expiry_from_provider_fields, non_empty, Adapter, AdapterError, AdapterResult, BroadcastReport,
	CoinKey, ExchangeAdapter, FeeBreakdown, ProviderRuntimeConfig, ProviderTxPayload, Quote,
	QuoteRequest, Route, RouteTransaction, SwapCoin, SwapLimits, SwapStatus,
};
use tracing::{debug, warn};

use crate::client_cache::{AuthConfig, ClientCache};
use crate::{map_request_error, normalize_endpoint};

const DEFAULT_ENDPOINT: &str = "https://api.thorswap.finance";

// ================================
// THORSWAP API MODELS
// ================================

/// One entry of the currency listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThorswapCurrency {
	pub ticker: String,
	#[serde(default)]
	pub name: Option<String>,
	pub chain: String,
	#[serde(default)]
	pub contract_address: Option<String>,
	#[serde(default = "default_true")]
	pub enabled: bool,
}

fn default_true() -> bool {
	true
}

/// Pair limits response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThorswapLimits {
	#[serde(default)]
	pub min_sell_amount: Option<f64>,
	#[serde(default)]
	pub max_sell_amount: Option<f64>,
}

/// Quote request body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThorswapQuoteRequest {
	sell_asset: String,
	buy_asset: String,
	sell_amount: f64,
	sender_address: String,
	recipient_address: String,
	slippage: f64,
}

/// Quote response: routes are pre-sorted best-first by Thorswap
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThorswapQuoteResponse {
	pub quote_id: String,
	#[serde(default)]
	pub sell_asset_amount: Option<serde_json::Value>,
	#[serde(default)]
	pub routes: Vec<ThorswapQuoteRoute>,
}

/// One route of a Thorswap quote
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThorswapQuoteRoute {
	/// Spender keys this route executes through (e.g. "THORCHAIN", "UNISWAPV3")
	#[serde(default)]
	pub providers: Vec<String>,
	#[serde(default)]
	pub expected_output: Option<serde_json::Value>,
	/// Deposit/target address variant one
	#[serde(default)]
	pub target_address: Option<String>,
	/// EVM transaction fragment, when the route needs one
	#[serde(default)]
	pub transaction: Option<ThorswapTransaction>,
	/// Contract call details; carries the expiry fields
	#[serde(default)]
	pub calldata: Option<ThorswapCalldata>,
	/// Fees keyed by chain symbol, first entry is the paying chain's band
	#[serde(default)]
	pub fees: Option<HashMap<String, Vec<ThorswapFeeEntry>>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThorswapTransaction {
	#[serde(default)]
	pub to: Option<String>,
	#[serde(default)]
	pub data: Option<String>,
	/// Gas estimate as number or hex string, normalized by the adapter
	#[serde(default)]
	pub gas: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThorswapCalldata {
	/// Expiry as epoch seconds, numeric
	#[serde(default)]
	pub deadline: Option<serde_json::Value>,
	/// Expiry as epoch seconds, string
	#[serde(default)]
	pub expiration: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThorswapFeeEntry {
	#[serde(default)]
	pub network_fee: Option<serde_json::Value>,
	#[serde(default)]
	pub affiliate_fee: Option<serde_json::Value>,
	#[serde(default)]
	pub total_fee: Option<serde_json::Value>,
}

/// Broadcast report body for the swap tracker
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThorswapSwapTxRequest {
	quote_id: String,
	hash: String,
	sell_amount: f64,
	#[serde(skip_serializing_if = "Option::is_none")]
	routing_key: Option<String>,
}

/// Swap tracker response
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThorswapSwapTxResponse {
	#[serde(default)]
	pub status: Option<String>,
}

/// Client strategy for the Thorswap adapter
#[derive(Debug)]
enum ClientStrategy {
	/// Use optimized client cache for connection pooling and reuse
	Cached(ClientCache),
	/// Create clients on-demand with no caching
	OnDemand,
}

/// Thorswap multi-route swap adapter
#[derive(Debug)]
pub struct ThorswapAdapter {
	config: Adapter,
	client_strategy: ClientStrategy,
}

impl ThorswapAdapter {
	/// Create a new Thorswap adapter with optimized client caching
	pub fn new(config: Adapter) -> AdapterResult<Self> {
		Self::with_cache(config, ClientCache::for_adapter())
	}

	/// Create a Thorswap adapter with a custom client cache
	pub fn with_cache(config: Adapter, cache: ClientCache) -> AdapterResult<Self> {
		Ok(Self {
			config,
			client_strategy: ClientStrategy::Cached(cache),
		})
	}

	/// Create a Thorswap adapter without client caching
	pub fn without_cache(config: Adapter) -> AdapterResult<Self> {
		Ok(Self {
			config,
			client_strategy: ClientStrategy::OnDemand,
		})
	}

	/// Create the default Thorswap adapter instance
	pub fn with_default_config() -> AdapterResult<Self> {
		let config = Adapter::new("thorswap", "Thorswap", "1.0.0")
			.with_description("Thorswap multi-route swap aggregator API");
		Self::new(config)
	}

	fn get_client(&self, config: &ProviderRuntimeConfig) -> AdapterResult<Arc<reqwest::Client>> {
		let auth = match config.api_key.as_deref().filter(|k| !k.is_empty()) {
			Some(key) => AuthConfig::api_key("x-api-key", key),
			None => AuthConfig::None,
		};
		match &self.client_strategy {
			ClientStrategy::Cached(cache) => cache.get_client_with_auth(config, &auth),
			ClientStrategy::OnDemand => reqwest::Client::builder()
				.build()
				.map(Arc::new)
				.map_err(AdapterError::Http),
		}
	}

	fn endpoint(config: &ProviderRuntimeConfig) -> AdapterResult<String> {
		normalize_endpoint(&config.endpoint, DEFAULT_ENDPOINT)
	}

	/// Normalize one Thorswap route into the canonical shape
	fn convert_route(route: ThorswapQuoteRoute, from_chain: &str) -> Route {
		let routing_key = if route.providers.is_empty() {
			"UNKNOWN".to_string()
		} else {
			route.providers.join("_").to_uppercase()
		};

		let expected_output = route
			.expected_output
			.as_ref()
			.and_then(value_to_f64)
			.unwrap_or(0.0);

		// Destination: transaction.to wins, targetAddress is the fallback.
		// Trimmed empties collapse to None so the selector can reject cleanly.
		let destination = non_empty(
			route
				.transaction
				.as_ref()
				.and_then(|tx| tx.to.as_deref()),
		)
		.or_else(|| non_empty(route.target_address.as_deref()));

		let expiry = expiry_from_provider_fields(
			route
				.calldata
				.as_ref()
				.and_then(|c| c.deadline.as_ref())
				.and_then(value_to_i64),
			route.calldata.as_ref().and_then(|c| c.expiration.as_deref()),
		);

		// First fee band of the paying chain
		let fees = route
			.fees
			.as_ref()
			.and_then(|fees| fees.get(&from_chain.to_uppercase()))
			.and_then(|bands| bands.first())
			.map(|band| {
				FeeBreakdown::new(
					band.network_fee.as_ref().and_then(value_to_f64).unwrap_or(0.0),
					band.affiliate_fee
						.as_ref()
						.and_then(value_to_f64)
						.unwrap_or(0.0),
					band.total_fee.as_ref().and_then(value_to_f64).unwrap_or(0.0),
				)
			})
			.unwrap_or_default();

		let transaction = route.transaction.as_ref().map(|tx| RouteTransaction {
			to: non_empty(tx.to.as_deref()),
			data: non_empty(tx.data.as_deref()),
			gas: tx.gas.as_ref().and_then(value_to_gas),
		});

		let raw_payload = serde_json::to_value(&route).unwrap_or(serde_json::Value::Null);

		let mut normalized = Route::new(&routing_key, expected_output)
			.with_fees(fees)
			.with_raw_payload(raw_payload);
		if let Some(destination) = destination {
			normalized = normalized.with_destination(&destination);
		}
		if let Some(transaction) = transaction {
			normalized = normalized.with_transaction(transaction);
		}
		if let Some(expiry) = expiry {
			normalized = normalized.with_expiry(expiry);
		}
		normalized
	}
}

/// Thorswap asset notation: `CHAIN.TICKER`, tokens suffixed with `-address`
fn thorswap_asset(key: &CoinKey, token_address: Option<&str>) -> String {
	let base = format!(
		"{}.{}",
		key.chain.to_uppercase(),
		key.ticker.to_uppercase()
	);
	match token_address.filter(|a| !a.is_empty()) {
		Some(address) => format!("{}-{}", base, address),
		None => base,
	}
}

fn value_to_f64(value: &serde_json::Value) -> Option<f64> {
	match value {
		serde_json::Value::Number(n) => n.as_f64(),
		serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
		_ => None,
	}
}

fn value_to_i64(value: &serde_json::Value) -> Option<i64> {
	match value {
		serde_json::Value::Number(n) => n.as_i64(),
		serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
		_ => None,
	}
}

/// Gas comes back as a number, a decimal string or a 0x-prefixed hex string
fn value_to_gas(value: &serde_json::Value) -> Option<u64> {
	match value {
		serde_json::Value::Number(n) => n.as_u64(),
		serde_json::Value::String(s) => {
			let s = s.trim();
			if let Some(hex) = s.strip_prefix("0x") {
				u64::from_str_radix(hex, 16).ok()
			} else {
				s.parse::<u64>().ok()
			}
		},
		_ => None,
	}
}

#[async_trait]
impl ExchangeAdapter for ThorswapAdapter {
	fn adapter_info(&self) -> &Adapter {
		&self.config
	}

	async fn list_currencies(
		&self,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Vec<SwapCoin>> {
		debug!(
			"Thorswap adapter listing currencies for provider: {}",
			config.provider_id
		);

		let client = self.get_client(config)?;
		let url = format!("{}/currencies", Self::endpoint(config)?);
		let response = client
			.get(&url)
			.timeout(Duration::from_millis(config.timeout_ms))
			.send()
			.await
			.map_err(|e| map_request_error(e, config.timeout_ms))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(AdapterError::http_status(status.as_u16(), body));
		}

		let currencies: Vec<ThorswapCurrency> = response
			.json()
			.await
			.map_err(|e| AdapterError::invalid_response(format!("currencies response: {e}")))?;

		let coins: Vec<SwapCoin> = currencies
			.into_iter()
			.filter(|c| c.enabled)
			.map(|c| {
				let ticker = c.ticker.to_lowercase();
				let display_name = c.name.unwrap_or_else(|| c.ticker.clone());
				let mut coin = SwapCoin::new(&ticker, &display_name, &c.chain)
					.with_provider(&config.provider_id);
				if let Some(contract) = c.contract_address.filter(|a| !a.is_empty()) {
					coin = coin.with_token_address(&contract);
				}
				coin
			})
			.collect();

		debug!(
			"Thorswap adapter listed {} currencies for provider {}",
			coins.len(),
			config.provider_id
		);
		Ok(coins)
	}

	async fn get_limits(
		&self,
		from: &CoinKey,
		to: &CoinKey,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapLimits> {
		let client = self.get_client(config)?;
		let url = format!("{}/limits", Self::endpoint(config)?);
		let response = client
			.get(&url)
			.query(&[
				("sellAsset", thorswap_asset(from, None)),
				("buyAsset", thorswap_asset(to, None)),
			])
			.timeout(Duration::from_millis(config.timeout_ms))
			.send()
			.await
			.map_err(|e| map_request_error(e, config.timeout_ms))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(AdapterError::http_status(status.as_u16(), body));
		}

		let limits: ThorswapLimits = response
			.json()
			.await
			.map_err(|e| AdapterError::invalid_response(format!("limits response: {e}")))?;

		// Thorswap frequently reports a minimum only; an absent bound stays
		// undefined rather than turning into zero or infinity.
		let limits = SwapLimits {
			min_amount: limits.min_sell_amount,
			max_amount: limits.max_sell_amount,
		};
		debug!(
			"Thorswap limits for {}/{}: min {:?} max {:?}",
			from, to, limits.min_amount, limits.max_amount
		);
		Ok(limits)
	}

	async fn get_quote(
		&self,
		request: &QuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Quote> {
		debug!(
			"Thorswap adapter getting quote for {} {} -> {} (provider: {})",
			request.amount, request.from, request.to, config.provider_id
		);

		let body = ThorswapQuoteRequest {
			sell_asset: thorswap_asset(&request.from, request.from_token_address.as_deref()),
			buy_asset: thorswap_asset(&request.to, request.to_token_address.as_deref()),
			sell_amount: request.amount,
			sender_address: request.sender_address.clone(),
			recipient_address: request.recipient_address.clone(),
			slippage: request.slippage_or_default(),
		};

		let client = self.get_client(config)?;
		let url = format!("{}/quote", Self::endpoint(config)?);
		let response = client
			.post(&url)
			.json(&body)
			.timeout(Duration::from_millis(config.timeout_ms))
			.send()
			.await
			.map_err(|e| map_request_error(e, config.timeout_ms))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(AdapterError::http_status(status.as_u16(), body));
		}

		let quote: ThorswapQuoteResponse = response
			.json()
			.await
			.map_err(|e| AdapterError::invalid_response(format!("quote response: {e}")))?;

		if quote.quote_id.is_empty() {
			return Err(AdapterError::invalid_response(
				"quote response carries no quoteId",
			));
		}

		let sell_amount = quote
			.sell_asset_amount
			.as_ref()
			.and_then(value_to_f64)
			.unwrap_or(request.amount);

		let routes: Vec<Route> = quote
			.routes
			.into_iter()
			.map(|route| Self::convert_route(route, &request.from.chain))
			.collect();

		debug!(
			"Thorswap quote {} carries {} routes for provider {}",
			quote.quote_id,
			routes.len(),
			config.provider_id
		);
		Ok(Quote::new(&config.provider_id, sell_amount, routes).with_quote_id(&quote.quote_id))
	}

	async fn build_transaction_payload(
		&self,
		_request: &QuoteRequest,
		quote: &Quote,
		route: &Route,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<ProviderTxPayload> {
		debug!(
			"Thorswap adapter building payload for quote {} route {} (provider: {})",
			quote.quote_id, route.routing_key, config.provider_id
		);

		// Payment instructions are already in the route; never proceed
		// without a destination.
		let destination = route
			.destination
			.clone()
			.ok_or_else(|| {
				AdapterError::invalid_response(format!(
					"route {} carries no destination address",
					route.routing_key
				))
			})?;

		let mut payload = ProviderTxPayload::new(&destination);
		if let Some(calldata) = route.calldata() {
			payload = payload.with_calldata(calldata);
		}
		if let Some(gas) = route.provider_gas() {
			payload = payload.with_gas(gas);
		}
		Ok(payload)
	}

	async fn report_broadcast(
		&self,
		report: &BroadcastReport,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapStatus> {
		debug!(
			"Thorswap adapter reporting broadcast {} for quote {} (provider: {})",
			report.tx_hash, report.quote_id, config.provider_id
		);

		let body = ThorswapSwapTxRequest {
			quote_id: report.quote_id.clone(),
			hash: report.tx_hash.clone(),
			sell_amount: report.sell_amount,
			routing_key: report.routing_key.clone(),
		};

		let client = self.get_client(config)?;
		let url = format!("{}/swap-tx", Self::endpoint(config)?);
		let response = client
			.post(&url)
			.json(&body)
			.timeout(Duration::from_millis(config.timeout_ms))
			.send()
			.await
			.map_err(|e| map_request_error(e, config.timeout_ms))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(AdapterError::http_status(status.as_u16(), body));
		}

		let tracked: ThorswapSwapTxResponse = response
			.json()
			.await
			.map_err(|e| AdapterError::invalid_response(format!("swap-tx response: {e}")))?;

		Ok(tracked
			.status
			.as_deref()
			.map(SwapStatus::from_provider_label)
			.unwrap_or(SwapStatus::Waiting))
	}

	async fn health_check(&self, config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		debug!(
			"Thorswap adapter health check for provider: {}",
			config.provider_id
		);

		let client = self.get_client(config)?;
		let url = format!("{}/currencies", Self::endpoint(config)?);
		let response = match client
			.get(&url)
			.timeout(Duration::from_millis(config.timeout_ms))
			.send()
			.await
		{
			Ok(response) => response,
			Err(e) => {
				warn!(
					"Thorswap health check failed for provider {}: {}",
					config.provider_id, e
				);
				return Ok(false);
			},
		};

		Ok(response.status().is_success())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_asset_notation() {
		assert_eq!(thorswap_asset(&CoinKey::new("btc", "btc"), None), "BTC.BTC");
		assert_eq!(
			thorswap_asset(
				&CoinKey::new("usdt", "eth"),
				Some("0xdAC17F958D2ee523a2206206994597C13D831ec7")
			),
			"ETH.USDT-0xdAC17F958D2ee523a2206206994597C13D831ec7"
		);
		assert_eq!(thorswap_asset(&CoinKey::new("usdc", "eth"), Some("")), "ETH.USDC");
	}

	#[test]
	fn test_gas_normalization_accepts_all_provider_shapes() {
		assert_eq!(value_to_gas(&serde_json::json!(120000)), Some(120_000));
		assert_eq!(value_to_gas(&serde_json::json!("120000")), Some(120_000));
		assert_eq!(value_to_gas(&serde_json::json!("0x30d40")), Some(200_000));
		assert_eq!(value_to_gas(&serde_json::json!("not-gas")), None);
		assert_eq!(value_to_gas(&serde_json::json!(null)), None);
	}

	fn sample_route(with_tx_to: Option<&str>, target: Option<&str>) -> ThorswapQuoteRoute {
		serde_json::from_value(serde_json::json!({
			"providers": ["UNISWAPV3"],
			"expectedOutput": "2500.5",
			"targetAddress": target,
			"transaction": {
				"to": with_tx_to,
				"data": "0x38ed1739aa",
				"gas": "0x2bf20"
			},
			"calldata": { "deadline": 1_715_756_550i64 },
			"fees": {
				"ETH": [{ "networkFee": 0.004, "affiliateFee": "0.001", "totalFee": "0.005" }]
			}
		}))
		.unwrap()
	}

	#[test]
	fn test_route_normalization_prefers_transaction_to() {
		let route = ThorswapAdapter::convert_route(
			sample_route(Some("0xrouter"), Some("0xtarget")),
			"eth",
		);

		assert_eq!(route.routing_key, "UNISWAPV3");
		assert_eq!(route.destination.as_deref(), Some("0xrouter"));
		assert_eq!(route.expected_output, 2500.5);
		assert_eq!(route.provider_gas(), Some(0x2bf20));
		assert_eq!(route.fees.total_fee, 0.005);
		assert_eq!(route.expiry.unwrap().timestamp(), 1_715_756_550);
	}

	#[test]
	fn test_route_normalization_falls_back_to_target_address() {
		let route =
			ThorswapAdapter::convert_route(sample_route(Some("  "), Some("0xtarget")), "eth");
		assert_eq!(route.destination.as_deref(), Some("0xtarget"));
	}

	#[test]
	fn test_route_without_any_destination_normalizes_to_none() {
		let route = ThorswapAdapter::convert_route(sample_route(None, None), "eth");
		assert!(route.destination.is_none());
	}

	#[test]
	fn test_multi_hop_routing_key_joins_providers() {
		let mut raw = sample_route(Some("0xrouter"), None);
		raw.providers = vec!["THORCHAIN".to_string(), "UNISWAPV3".to_string()];
		let route = ThorswapAdapter::convert_route(raw, "eth");
		assert_eq!(route.routing_key, "THORCHAIN_UNISWAPV3");
	}

	#[tokio::test]
	async fn test_payload_requires_destination() {
		let adapter = ThorswapAdapter::with_default_config().unwrap();
		let config = ProviderRuntimeConfig::new("thorswap", "https://api.example", 2_000);
		let request = swapflow_types::test_utils::TestRequests::usdc_to_eth(1_000.0);
		let quote = Quote::new("thorswap", 1_000.0, vec![Route::new("UNISWAPV3", 0.4)]);

		let err = adapter
			.build_transaction_payload(&request, &quote, &quote.routes[0], &config)
			.await
			.unwrap_err();
		assert!(matches!(err, AdapterError::InvalidResponse { .. }));
	}

	#[tokio::test]
	async fn test_payload_carries_calldata_and_gas() {
		let adapter = ThorswapAdapter::with_default_config().unwrap();
		let config = ProviderRuntimeConfig::new("thorswap", "https://api.example", 2_000);
		let request = swapflow_types::test_utils::TestRequests::usdc_to_eth(1_000.0);
		let route = ThorswapAdapter::convert_route(sample_route(Some("0xrouter"), None), "eth");
		let quote = Quote::new("thorswap", 1_000.0, vec![route]);

		let payload = adapter
			.build_transaction_payload(&request, &quote, &quote.routes[0], &config)
			.await
			.unwrap();
		assert_eq!(payload.payin_address, "0xrouter");
		assert_eq!(payload.calldata.as_deref(), Some("0x38ed1739aa"));
		assert_eq!(payload.gas, Some(0x2bf20));
		assert!(payload.provider_order_id.is_none());
	}

	#[test]
	fn test_adapter_descriptor_validates() {
		let adapter = ThorswapAdapter::with_default_config().unwrap();
		assert!(adapter.adapter_info().validate().is_ok());
		assert_eq!(adapter.id(), "thorswap");
	}
}
