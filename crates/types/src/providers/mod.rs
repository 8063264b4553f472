//! Provider state: per-exchange configuration, round flags and metrics

use crate::coins::{CoinKey, SwapCoin};
use crate::constants::{DEFAULT_PROVIDER_RETRIES, DEFAULT_PROVIDER_TIMEOUT_MS};
use crate::limits::SwapLimits;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// API credentials for a provider, resolved from configuration.
///
/// `Display` redacts; never log the raw fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiCredentials {
	pub api_key: String,
	pub api_secret: Option<String>,
}

impl ApiCredentials {
	pub fn new(api_key: &str) -> Self {
		Self {
			api_key: api_key.to_string(),
			api_secret: None,
		}
	}

	pub fn with_secret(mut self, api_secret: &str) -> Self {
		self.api_secret = Some(api_secret.to_string());
		self
	}
}

impl fmt::Display for ApiCredentials {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "ApiCredentials([REDACTED])")
	}
}

/// Query statistics for one provider
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderMetrics {
	pub total_queries: u64,
	pub successful_queries: u64,
	pub failed_queries: u64,
	pub consecutive_failures: u32,
	pub last_seen: Option<DateTime<Utc>>,
}

impl ProviderMetrics {
	pub fn record_success(&mut self) {
		self.total_queries += 1;
		self.successful_queries += 1;
		self.consecutive_failures = 0;
		self.last_seen = Some(Utc::now());
	}

	pub fn record_failure(&mut self) {
		self.total_queries += 1;
		self.failed_queries += 1;
		self.consecutive_failures += 1;
		self.last_seen = Some(Utc::now());
	}

	pub fn success_rate(&self) -> f64 {
		if self.total_queries == 0 {
			return 0.0;
		}
		self.successful_queries as f64 / self.total_queries as f64
	}
}

/// One configured exchange provider.
///
/// Single-writer: only the aggregation step mutates an instance, and the
/// whole provider set is republished atomically after each round. Two off
/// switches exist and mean different things: `enabled` comes from
/// configuration, `disabled` is the runtime hard-off flag; `show_offer` is a
/// soft per-round flag cleared when the provider failed the current round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderState {
	/// Unique provider instance id (e.g. "changelly", "thorswap")
	pub provider_id: String,

	/// Adapter implementation this provider speaks through
	pub adapter_id: String,

	/// Base endpoint for the provider API
	pub endpoint: String,

	/// Per-request timeout in milliseconds
	pub timeout_ms: u64,

	/// Maximum retry attempts for transient failures
	pub max_retries: u32,

	/// Extra HTTP headers sent with every request
	pub headers: Option<HashMap<String, String>>,

	/// Credentials, when the provider requires them
	pub credentials: Option<ApiCredentials>,

	/// Configured on/off
	pub enabled: bool,

	/// Runtime hard-off, distinct from "not offered this round"
	pub disabled: bool,

	/// Soft per-round flag: false while the provider sat out the last round
	pub show_offer: bool,

	/// Assets this provider listed in the last successful round
	pub supported_coins: Vec<SwapCoin>,

	/// Last limits the provider reported for the active pair
	pub limits: Option<SwapLimits>,

	/// Last error observed for this provider, for diagnostics
	pub last_error: Option<String>,

	pub metrics: ProviderMetrics,

	pub created_at: DateTime<Utc>,
}

impl ProviderState {
	pub fn new(provider_id: &str, adapter_id: &str, endpoint: &str) -> Self {
		Self {
			provider_id: provider_id.to_string(),
			adapter_id: adapter_id.to_string(),
			endpoint: endpoint.to_string(),
			timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
			max_retries: DEFAULT_PROVIDER_RETRIES,
			headers: None,
			credentials: None,
			enabled: true,
			disabled: false,
			show_offer: true,
			supported_coins: Vec::new(),
			limits: None,
			last_error: None,
			metrics: ProviderMetrics::default(),
			created_at: Utc::now(),
		}
	}

	pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
		self.timeout_ms = timeout_ms;
		self
	}

	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;
		self
	}

	pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
		self.headers = Some(headers);
		self
	}

	pub fn with_credentials(mut self, credentials: ApiCredentials) -> Self {
		self.credentials = Some(credentials);
		self
	}

	pub fn with_enabled(mut self, enabled: bool) -> Self {
		self.enabled = enabled;
		self
	}

	/// Eligible for aggregation rounds at all?
	pub fn is_active(&self) -> bool {
		self.enabled && !self.disabled
	}

	/// Currently offering swaps (active and not sitting out the round)?
	pub fn is_offering(&self) -> bool {
		self.is_active() && self.show_offer
	}

	pub fn supports_coin(&self, key: &CoinKey) -> bool {
		self.supported_coins.iter().any(|c| &c.key() == key)
	}

	pub fn supports_pair(&self, from: &CoinKey, to: &CoinKey) -> bool {
		self.supports_coin(from) && self.supports_coin(to)
	}

	/// Round start: a fresh chance to offer regardless of the last round.
	pub fn begin_round(&mut self) {
		self.show_offer = true;
		self.last_error = None;
	}

	/// Round bookkeeping for a successful currency listing.
	pub fn complete_round(&mut self, coins: Vec<SwapCoin>) {
		self.supported_coins = coins;
		self.show_offer = true;
		self.last_error = None;
		self.metrics.record_success();
	}

	/// Round bookkeeping for a failed query: sit this round out, stay enabled.
	pub fn fail_round(&mut self, error: &str) {
		self.show_offer = false;
		self.last_error = Some(error.to_string());
		self.metrics.record_failure();
	}

	/// Hard-off. Only an explicit operator/engine decision flips this.
	pub fn disable(&mut self) {
		self.disabled = true;
	}

	pub fn enable(&mut self) {
		self.disabled = false;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn provider() -> ProviderState {
		ProviderState::new("thorswap", "thorswap", "https://api.thorswap.finance")
	}

	#[test]
	fn test_new_provider_is_offering() {
		let p = provider();
		assert!(p.is_active());
		assert!(p.is_offering());
		assert_eq!(p.timeout_ms, DEFAULT_PROVIDER_TIMEOUT_MS);
	}

	#[test]
	fn test_fail_round_is_soft() {
		let mut p = provider();
		p.fail_round("connection refused");

		assert!(p.is_active(), "round failure must not disable the provider");
		assert!(!p.is_offering());
		assert_eq!(p.last_error.as_deref(), Some("connection refused"));
		assert_eq!(p.metrics.failed_queries, 1);
		assert_eq!(p.metrics.consecutive_failures, 1);

		p.begin_round();
		assert!(p.is_offering(), "a new round resets the soft flag");
		assert!(p.last_error.is_none());
	}

	#[test]
	fn test_disabled_beats_round_state() {
		let mut p = provider();
		p.disable();
		p.begin_round();

		assert!(!p.is_active());
		assert!(!p.is_offering());

		p.enable();
		assert!(p.is_offering());
	}

	#[test]
	fn test_complete_round_records_coins_and_metrics() {
		let mut p = provider();
		p.fail_round("timeout");
		p.begin_round();
		p.complete_round(vec![
			SwapCoin::new("btc", "Bitcoin", "btc").with_provider("thorswap"),
			SwapCoin::new("eth", "Ethereum", "eth").with_provider("thorswap"),
		]);

		assert!(p.supports_pair(&CoinKey::new("btc", "btc"), &CoinKey::new("eth", "eth")));
		assert!(!p.supports_coin(&CoinKey::new("xrp", "xrp")));
		assert_eq!(p.metrics.successful_queries, 1);
		assert_eq!(p.metrics.consecutive_failures, 0);
	}

	#[test]
	fn test_credentials_redacted_in_display() {
		let creds = ApiCredentials::new("pk_live_123").with_secret("sk_live_456");
		let shown = format!("{}", creds);
		assert!(!shown.contains("pk_live_123"));
		assert!(!shown.contains("sk_live_456"));
	}
}
