//! Changelly fixed-rate adapter
//!
//! Speaks Changelly's JSON-RPC 2.0 API: every call is a POST to the API
//! root with an HMAC-SHA512 signature of the exact request body. Changelly
//! is a deposit-style provider, so quotes carry a single synthetic route and
//! the payin address only exists once the fixed-rate transaction is created.

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;
use swapflow_types::{
	Adapter, AdapterError, AdapterResult, BroadcastReport, CoinKey, ExchangeAdapter,
	ProviderRuntimeConfig, ProviderTxPayload, Quote, QuoteRequest, Route, SwapCoin, SwapLimits,
	SwapStatus,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client_cache::{AuthConfig, ClientCache};
use crate::{map_request_error, normalize_endpoint};

/// Routing key for the single synthetic route a fixed-rate quote carries
pub const CHANGELLY_FIXED_ROUTE: &str = "CHANGELLY_FIXED";

const DEFAULT_ENDPOINT: &str = "https://api.changelly.com";

// ================================
// CHANGELLY API MODELS
// ================================

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Clone, Serialize)]
struct ChangellyRpcRequest {
	jsonrpc: &'static str,
	id: String,
	method: String,
	params: serde_json::Value,
}

impl ChangellyRpcRequest {
	fn new(method: &str, params: serde_json::Value) -> Self {
		Self {
			jsonrpc: "2.0",
			id: Uuid::new_v4().to_string(),
			method: method.to_string(),
			params,
		}
	}
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ChangellyRpcResponse<T> {
	#[serde(default)]
	result: Option<T>,
	#[serde(default)]
	error: Option<ChangellyRpcError>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChangellyRpcError {
	code: i64,
	message: String,
}

/// One entry of the getCurrenciesFull listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangellyCurrency {
	/// Currency ticker in Changelly's fixed-abbreviation scheme
	pub name: String,
	/// Human-readable currency name
	pub full_name: String,
	/// Whether the currency is tradable at all
	pub enabled: bool,
	/// Whether fixed-rate swaps are offered for this currency
	#[serde(default)]
	pub fix_rate_enabled: bool,
	/// Chain the currency lives on, in Changelly's blockchain naming
	#[serde(default)]
	pub blockchain: Option<String>,
	/// Token contract address, for tokens only
	#[serde(default)]
	pub contract_address: Option<String>,
	/// Token protocol label (e.g. "ERC20"), for tokens only
	#[serde(default)]
	pub protocol: Option<String>,
}

/// One entry of the getPairsParams result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangellyPairParams {
	#[serde(default)]
	pub min_amount_fixed: Option<String>,
	#[serde(default)]
	pub max_amount_fixed: Option<String>,
}

/// One entry of the getFixRateForAmount result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangellyFixRate {
	/// Rate id, consumed by createFixTransaction while it is still valid
	pub id: String,
	/// Exchange rate as a decimal string
	#[serde(default)]
	pub result: Option<String>,
	#[serde(default)]
	pub amount_from: Option<String>,
	#[serde(default)]
	pub amount_to: Option<String>,
}

/// createFixTransaction result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangellyFixTransaction {
	/// Order id, used for status polling from here on
	pub id: String,
	pub payin_address: String,
	#[serde(default)]
	pub payin_extra_id: Option<String>,
	#[serde(default)]
	pub amount_expected_from: Option<String>,
	#[serde(default)]
	pub amount_expected_to: Option<String>,
	#[serde(default)]
	pub status: Option<String>,
	/// Pay-by instant, RFC 3339
	#[serde(default)]
	pub pay_till: Option<String>,
}

/// Client strategy for the Changelly adapter
#[derive(Debug)]
enum ClientStrategy {
	/// Use optimized client cache for connection pooling and reuse
	Cached(ClientCache),
	/// Create clients on-demand with no caching
	OnDemand,
}

/// Changelly fixed-rate swap adapter
#[derive(Debug)]
pub struct ChangellyAdapter {
	config: Adapter,
	client_strategy: ClientStrategy,
}

impl ChangellyAdapter {
	/// Create a new Changelly adapter with optimized client caching
	pub fn new(config: Adapter) -> AdapterResult<Self> {
		Self::with_cache(config, ClientCache::for_adapter())
	}

	/// Create a Changelly adapter with a custom client cache
	pub fn with_cache(config: Adapter, cache: ClientCache) -> AdapterResult<Self> {
		Ok(Self {
			config,
			client_strategy: ClientStrategy::Cached(cache),
		})
	}

	/// Create a Changelly adapter without client caching
	pub fn without_cache(config: Adapter) -> AdapterResult<Self> {
		Ok(Self {
			config,
			client_strategy: ClientStrategy::OnDemand,
		})
	}

	/// Create the default Changelly adapter instance
	pub fn with_default_config() -> AdapterResult<Self> {
		let config = Adapter::new("changelly", "Changelly Fixed-Rate", "1.0.0")
			.with_description("Changelly fixed-rate swap API (JSON-RPC 2.0, HMAC-signed)");
		Self::new(config)
	}

	fn get_client(&self, config: &ProviderRuntimeConfig) -> AdapterResult<Arc<reqwest::Client>> {
		// Signature headers differ per request body, so the cached client
		// carries no auth of its own.
		match &self.client_strategy {
			ClientStrategy::Cached(cache) => cache.get_client_with_auth(config, &AuthConfig::None),
			ClientStrategy::OnDemand => reqwest::Client::builder()
				.build()
				.map(Arc::new)
				.map_err(AdapterError::Http),
		}
	}

	fn endpoint(config: &ProviderRuntimeConfig) -> AdapterResult<String> {
		normalize_endpoint(&config.endpoint, DEFAULT_ENDPOINT)
	}

	fn credentials(config: &ProviderRuntimeConfig) -> AdapterResult<(&str, &str)> {
		let api_key = config
			.api_key
			.as_deref()
			.filter(|k| !k.is_empty())
			.ok_or_else(|| AdapterError::InvalidConfiguration {
				reason: format!("provider {} is missing an API key", config.provider_id),
			})?;
		let api_secret = config
			.api_secret
			.as_deref()
			.filter(|s| !s.is_empty())
			.ok_or_else(|| AdapterError::InvalidConfiguration {
				reason: format!("provider {} is missing an API secret", config.provider_id),
			})?;
		Ok((api_key, api_secret))
	}

	/// Execute one signed JSON-RPC call and unwrap its result
	async fn rpc_call<T: DeserializeOwned>(
		&self,
		method: &str,
		params: serde_json::Value,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<T> {
		let (api_key, api_secret) = Self::credentials(config)?;
		let request = ChangellyRpcRequest::new(method, params);
		let body = serde_json::to_string(&request)?;
		let signature = sign_body(api_secret, &body)?;

		let client = self.get_client(config)?;
		let response = client
			.post(Self::endpoint(config)?)
			.header("X-Api-Key", api_key)
			.header("X-Api-Signature", signature)
			.body(body)
			.timeout(Duration::from_millis(config.timeout_ms))
			.send()
			.await
			.map_err(|e| map_request_error(e, config.timeout_ms))?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(AdapterError::http_status(status.as_u16(), body));
		}

		let envelope: ChangellyRpcResponse<T> = response
			.json()
			.await
			.map_err(|e| AdapterError::invalid_response(format!("{method} response: {e}")))?;

		if let Some(error) = envelope.error {
			return Err(AdapterError::invalid_response(format!(
				"{method} error {}: {}",
				error.code, error.message
			)));
		}

		envelope
			.result
			.ok_or_else(|| AdapterError::invalid_response(format!("{method} returned no result")))
	}
}

/// HMAC-SHA512 of the request body, lowercase hex
fn sign_body(api_secret: &str, body: &str) -> AdapterResult<String> {
	let mut mac = Hmac::<Sha512>::new_from_slice(api_secret.as_bytes()).map_err(|_| {
		AdapterError::InvalidConfiguration {
			reason: "API secret is not usable as an HMAC key".to_string(),
		}
	})?;
	mac.update(body.as_bytes());

	let digest = mac.finalize().into_bytes();
	let mut hex = String::with_capacity(digest.len() * 2);
	for byte in digest {
		let _ = write!(hex, "{:02x}", byte);
	}
	Ok(hex)
}

/// Map Changelly's blockchain label onto the engine's chain naming.
/// Currencies without a blockchain field are native coins on their own chain.
fn chain_from_blockchain(blockchain: Option<&str>, ticker: &str) -> String {
	match blockchain.map(str::to_lowercase).as_deref() {
		Some("bitcoin") => "btc".to_string(),
		Some("ethereum") => "eth".to_string(),
		Some("polygon") => "matic".to_string(),
		Some("bitcoin_cash") => "bch".to_string(),
		Some("litecoin") => "ltc".to_string(),
		Some("doge") | Some("dogecoin") => "doge".to_string(),
		Some("ripple") => "xrp".to_string(),
		Some(other) => other.to_string(),
		None => ticker.to_lowercase(),
	}
}

/// Ticker in Changelly's fixed-abbreviation scheme for a given coin.
/// A handful of Polygon assets carry chain-suffixed names upstream.
fn changelly_symbol(key: &CoinKey) -> String {
	match (key.ticker.as_str(), key.chain.as_str()) {
		("matic", "matic") => "maticpolygon".to_string(),
		("usdc", "matic") => "usdcmatic".to_string(),
		("usdt", "matic") => "usdtpolygon".to_string(),
		_ => key.ticker.clone(),
	}
}

fn parse_amount(value: Option<&str>) -> Option<f64> {
	value.and_then(|v| v.trim().parse::<f64>().ok())
}

fn pair_label(from: &CoinKey, to: &CoinKey) -> String {
	format!("{}/{}", from, to)
}

#[async_trait]
impl ExchangeAdapter for ChangellyAdapter {
	fn adapter_info(&self) -> &Adapter {
		&self.config
	}

	async fn list_currencies(
		&self,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Vec<SwapCoin>> {
		debug!(
			"Changelly adapter listing currencies for provider: {}",
			config.provider_id
		);

		let currencies: Vec<ChangellyCurrency> = self
			.rpc_call("getCurrenciesFull", serde_json::json!({}), config)
			.await?;

		let coins: Vec<SwapCoin> = currencies
			.into_iter()
			.filter(|c| c.enabled && c.fix_rate_enabled)
			.map(|c| {
				let ticker = c.name.to_lowercase();
				let chain = chain_from_blockchain(c.blockchain.as_deref(), &ticker);
				let mut coin = SwapCoin::new(&ticker, &c.full_name, &chain)
					.with_provider(&config.provider_id);
				if let Some(contract) = c.contract_address.filter(|a| !a.is_empty()) {
					coin = coin.with_token_address(&contract);
				}
				coin
			})
			.collect();

		debug!(
			"Changelly adapter listed {} fixed-rate currencies for provider {}",
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
		let params = serde_json::json!([{
			"from": changelly_symbol(from),
			"to": changelly_symbol(to),
		}]);
		let pairs: Vec<ChangellyPairParams> =
			self.rpc_call("getPairsParams", params, config).await?;

		// An empty result or a non-positive maximum both mean Changelly has
		// switched the pair off.
		let pair = pairs.first().ok_or_else(|| {
			AdapterError::pair_disabled(pair_label(from, to), "provider returned no pair parameters")
		})?;

		let max_amount = parse_amount(pair.max_amount_fixed.as_deref());
		match max_amount {
			Some(max) if max > 0.0 => {},
			_ => {
				return Err(AdapterError::pair_disabled(
					pair_label(from, to),
					"provider reports no tradable maximum for the pair",
				));
			},
		}

		let limits = SwapLimits {
			min_amount: parse_amount(pair.min_amount_fixed.as_deref()),
			max_amount,
		};
		debug!(
			"Changelly limits for {}: min {:?} max {:?}",
			pair_label(from, to),
			limits.min_amount,
			limits.max_amount
		);
		Ok(limits)
	}

	async fn get_quote(
		&self,
		request: &QuoteRequest,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<Quote> {
		debug!(
			"Changelly adapter getting fixed rate for {} {} -> {} (provider: {})",
			request.amount, request.from, request.to, config.provider_id
		);

		let params = serde_json::json!([{
			"from": changelly_symbol(&request.from),
			"to": changelly_symbol(&request.to),
			"amountFrom": request.amount.to_string(),
		}]);
		let rates: Vec<ChangellyFixRate> = self
			.rpc_call("getFixRateForAmount", params, config)
			.await?;

		let rate = rates
			.into_iter()
			.next()
			.ok_or_else(|| AdapterError::invalid_response("getFixRateForAmount returned no rates"))?;

		let amount_to = parse_amount(rate.amount_to.as_deref()).ok_or_else(|| {
			AdapterError::invalid_response("getFixRateForAmount returned no usable amountTo")
		})?;

		// One synthetic route; the payin address arrives with the fixed-rate
		// transaction, not with the quote.
		let route = Route::new(CHANGELLY_FIXED_ROUTE, amount_to)
			.with_raw_payload(serde_json::to_value(&rate)?);

		Ok(Quote::new(&config.provider_id, request.amount, vec![route]).with_quote_id(&rate.id))
	}

	async fn build_transaction_payload(
		&self,
		request: &QuoteRequest,
		quote: &Quote,
		_route: &Route,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<ProviderTxPayload> {
		debug!(
			"Changelly adapter creating fixed-rate transaction for quote {} (provider: {})",
			quote.quote_id, config.provider_id
		);

		let params = serde_json::json!({
			"from": changelly_symbol(&request.from),
			"to": changelly_symbol(&request.to),
			"refundAddress": request.sender_address,
			"address": request.recipient_address,
			"amountFrom": request.amount.to_string(),
			"rateId": quote.quote_id,
		});
		let tx: ChangellyFixTransaction = self
			.rpc_call("createFixTransaction", params, config)
			.await?;

		if tx.payin_address.trim().is_empty() {
			return Err(AdapterError::invalid_response(
				"createFixTransaction returned an empty payin address",
			));
		}

		let mut payload = ProviderTxPayload::new(&tx.payin_address)
			.with_provider_order_id(&tx.id);
		if let Some(extra_id) = tx.payin_extra_id.as_deref().filter(|s| !s.is_empty()) {
			payload = payload.with_extra_id(extra_id);
		}
		if let Some(amount) = parse_amount(tx.amount_expected_from.as_deref()) {
			payload = payload.with_deposit_amount(amount);
		}
		match tx.pay_till.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
			Some(raw) => match chrono::DateTime::parse_from_rfc3339(raw) {
				Ok(instant) => payload = payload.with_expiry(instant.with_timezone(&chrono::Utc)),
				Err(e) => warn!(
					"Changelly payTill '{}' did not parse ({}); checkout will fall back to its default window",
					raw, e
				),
			},
			None => {},
		}

		debug!(
			"Changelly order {} created, payin address {}",
			tx.id, tx.payin_address
		);
		Ok(payload)
	}

	async fn report_broadcast(
		&self,
		report: &BroadcastReport,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapStatus> {
		// Changelly watches the payin address itself; reporting is a status
		// probe so the engine's record starts from the provider's view.
		self.get_swap_status(&report.quote_id, config).await
	}

	async fn get_swap_status(
		&self,
		quote_id: &str,
		config: &ProviderRuntimeConfig,
	) -> AdapterResult<SwapStatus> {
		let params = serde_json::json!({ "id": quote_id });
		let label: String = self.rpc_call("getStatus", params, config).await?;
		Ok(SwapStatus::from_provider_label(&label))
	}

	async fn health_check(&self, config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
		debug!(
			"Changelly adapter health check for provider: {}",
			config.provider_id
		);

		match self
			.rpc_call::<Vec<ChangellyCurrency>>("getCurrenciesFull", serde_json::json!({}), config)
			.await
		{
			Ok(currencies) => Ok(!currencies.is_empty()),
			Err(e) => {
				warn!(
					"Changelly health check failed for provider {}: {}",
					config.provider_id, e
				);
				Ok(false)
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_sign_body_is_deterministic_hex() {
		let body = r#"{"jsonrpc":"2.0","id":"1","method":"getCurrenciesFull","params":{}}"#;
		let sig1 = sign_body("secret-a", body).unwrap();
		let sig2 = sign_body("secret-a", body).unwrap();
		let sig3 = sign_body("secret-b", body).unwrap();

		assert_eq!(sig1, sig2);
		assert_ne!(sig1, sig3);
		assert_eq!(sig1.len(), 128, "SHA-512 digest is 64 bytes");
		assert!(sig1.chars().all(|c| c.is_ascii_hexdigit()));
	}

	#[test]
	fn test_chain_mapping() {
		assert_eq!(chain_from_blockchain(Some("Bitcoin"), "btc"), "btc");
		assert_eq!(chain_from_blockchain(Some("ethereum"), "usdt"), "eth");
		assert_eq!(chain_from_blockchain(Some("polygon"), "usdc"), "matic");
		assert_eq!(chain_from_blockchain(None, "LTC"), "ltc");
		assert_eq!(chain_from_blockchain(Some("tron"), "trx"), "tron");
	}

	#[test]
	fn test_symbol_mapping_for_polygon_assets() {
		assert_eq!(
			changelly_symbol(&CoinKey::new("matic", "matic")),
			"maticpolygon"
		);
		assert_eq!(changelly_symbol(&CoinKey::new("usdc", "matic")), "usdcmatic");
		assert_eq!(
			changelly_symbol(&CoinKey::new("usdt", "matic")),
			"usdtpolygon"
		);
		assert_eq!(changelly_symbol(&CoinKey::new("btc", "btc")), "btc");
	}

	#[test]
	fn test_currency_listing_deserializes() {
		let raw = serde_json::json!([
			{
				"name": "BTC",
				"fullName": "Bitcoin",
				"enabled": true,
				"fixRateEnabled": true,
				"blockchain": "bitcoin"
			},
			{
				"name": "USDT",
				"fullName": "Tether",
				"enabled": true,
				"fixRateEnabled": false,
				"blockchain": "ethereum",
				"contractAddress": "0xdAC17F958D2ee523a2206206994597C13D831ec7",
				"protocol": "ERC20"
			}
		]);

		let currencies: Vec<ChangellyCurrency> = serde_json::from_value(raw).unwrap();
		assert_eq!(currencies.len(), 2);
		assert!(currencies[0].fix_rate_enabled);
		assert!(!currencies[1].fix_rate_enabled);
		assert_eq!(
			currencies[1].contract_address.as_deref(),
			Some("0xdAC17F958D2ee523a2206206994597C13D831ec7")
		);
	}

	#[test]
	fn test_fix_transaction_deserializes() {
		let raw = serde_json::json!({
			"id": "ord-99",
			"payinAddress": "bc1qchangellypayin",
			"payinExtraId": null,
			"amountExpectedFrom": "0.5",
			"amountExpectedTo": "7.31",
			"status": "new",
			"payTill": "2026-08-25T12:00:00.000Z"
		});

		let tx: ChangellyFixTransaction = serde_json::from_value(raw).unwrap();
		assert_eq!(tx.id, "ord-99");
		assert_eq!(tx.payin_address, "bc1qchangellypayin");
		assert!(tx.payin_extra_id.is_none());
		assert!(chrono::DateTime::parse_from_rfc3339(tx.pay_till.as_deref().unwrap()).is_ok());
	}

	#[test]
	fn test_rpc_error_envelope_deserializes() {
		let raw = r#"{"jsonrpc":"2.0","id":"1","error":{"code":-32600,"message":"invalid currency"}}"#;
		let envelope: ChangellyRpcResponse<Vec<ChangellyPairParams>> =
			serde_json::from_str(raw).unwrap();
		assert!(envelope.result.is_none());
		assert_eq!(envelope.error.as_ref().unwrap().code, -32600);
	}

	#[test]
	fn test_adapter_descriptor_validates() {
		let adapter = ChangellyAdapter::with_default_config().unwrap();
		assert!(adapter.adapter_info().validate().is_ok());
		assert_eq!(adapter.id(), "changelly");
	}
}
