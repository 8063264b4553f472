//! Tradable-amount aggregation for a swap pair.
//!
//! Each provider that lists both assets is asked for its min/max, and the
//! answers fold into one conservative bound. A bound is only asserted when
//! every contributor asserted it, so the aggregate never claims more
//! precision than the providers gave.

use crate::directory::ProviderDirectory;
use crate::fanout::{settle_all, FanoutConfig, ProviderFailure};
use std::sync::Arc;
use swapflow_adapters::AdapterRegistry;
use swapflow_types::adapters::{AdapterFailureKind, ProviderRuntimeConfig};
use swapflow_types::coins::CoinKey;
use swapflow_types::limits::SwapLimits;
use thiserror::Error;
use tracing::{debug, warn};

/// Why no aggregate limit could be produced for a pair
#[derive(Debug, Error)]
pub enum LimitsError {
	/// Every queried provider failed for infrastructure-shaped reasons.
	/// Retryable: the pair may well be fine once providers answer again.
	#[error("Limits unavailable for {pair}: {failed} of {queried} providers failed")]
	Unavailable {
		pair: String,
		failed: usize,
		queried: usize,
	},

	/// No provider lists the pair, or every provider explicitly refused it.
	/// Not retryable until a later currency round changes the listings.
	#[error("Pair {pair} is not currently swappable")]
	PairDisabled { pair: String },
}

/// Aggregates per-provider pair limits into one conservative bound.
#[derive(Debug)]
pub struct LimitsAggregator {
	directory: Arc<ProviderDirectory>,
	registry: Arc<AdapterRegistry>,
	fanout: FanoutConfig,
}

impl LimitsAggregator {
	pub fn new(directory: Arc<ProviderDirectory>, registry: Arc<AdapterRegistry>) -> Self {
		Self {
			directory,
			registry,
			fanout: FanoutConfig::default(),
		}
	}

	pub fn with_fanout_config(mut self, fanout: FanoutConfig) -> Self {
		self.fanout = fanout;
		self
	}

	/// Query every provider supporting the pair and combine their limits.
	pub async fn aggregate(&self, from: &CoinKey, to: &CoinKey) -> Result<SwapLimits, LimitsError> {
		let pair = format!("{}/{}", from, to);

		let supporting = self.directory.providers_supporting(from, to).await;
		if supporting.is_empty() {
			debug!("No offering provider lists both sides of {}", pair);
			return Err(LimitsError::PairDisabled { pair });
		}

		let queried = supporting.len();
		let mut tasks = Vec::with_capacity(queried);
		let mut infra_failures = 0usize;

		for provider in supporting {
			let Some(adapter) = self.registry.get(&provider.adapter_id) else {
				warn!(
					"Provider {} references unknown adapter {}, counting it as failed",
					provider.provider_id, provider.adapter_id
				);
				infra_failures += 1;
				continue;
			};

			let config = ProviderRuntimeConfig::from(&provider);
			let from = from.clone();
			let to = to.clone();
			tasks.push((provider.provider_id.clone(), async move {
				adapter.get_limits(&from, &to, &config).await
			}));
		}

		let mut bounds = Vec::new();
		let mut cache_updates = Vec::new();
		let mut failures: Vec<ProviderFailure> = Vec::new();

		for outcome in settle_all(tasks, &self.fanout).await {
			match outcome.result {
				Ok(limits) => {
					debug!(
						"Provider {} prices {} at {:?}..{:?}",
						outcome.provider_id, pair, limits.min_amount, limits.max_amount
					);
					cache_updates.push((outcome.provider_id, limits));
					bounds.push(limits);
				}
				Err(e) => {
					warn!("Provider {} could not price {}: {}", outcome.provider_id, pair, e);
					failures.push(e);
				}
			}
		}

		if bounds.is_empty() {
			let unanimous_refusal = infra_failures == 0
				&& !failures.is_empty()
				&& failures
					.iter()
					.all(|f| f.failure_kind() == AdapterFailureKind::PairDisabled);
			if unanimous_refusal {
				return Err(LimitsError::PairDisabled { pair });
			}
			return Err(LimitsError::Unavailable {
				pair,
				failed: failures.len() + infra_failures,
				queried,
			});
		}

		self.directory.cache_limits(cache_updates).await;
		Ok(SwapLimits::combine(bounds))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use swapflow_types::adapters::{
		Adapter, AdapterError, AdapterResult, BroadcastReport, ExchangeAdapter, ProviderTxPayload,
	};
	use swapflow_types::coins::SwapCoin;
	use swapflow_types::quotes::{Quote, QuoteRequest};
	use swapflow_types::records::SwapStatus;
	use swapflow_types::routes::Route;
	use swapflow_types::test_utils::{TestCoins, TestProviders};

	enum StubBehavior {
		Limits(SwapLimits),
		Refuse,
		Break,
	}

	struct StubAdapter {
		info: Adapter,
		behavior: StubBehavior,
	}

	impl std::fmt::Debug for StubAdapter {
		fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
			f.debug_struct("StubAdapter").finish_non_exhaustive()
		}
	}

	impl StubAdapter {
		fn with_limits(id: &str, min: Option<f64>, max: Option<f64>) -> Self {
			Self {
				info: Adapter::new(id, id, "1.0.0"),
				behavior: StubBehavior::Limits(SwapLimits::new(min, max)),
			}
		}

		fn refusing(id: &str) -> Self {
			Self {
				info: Adapter::new(id, id, "1.0.0"),
				behavior: StubBehavior::Refuse,
			}
		}

		fn broken(id: &str) -> Self {
			Self {
				info: Adapter::new(id, id, "1.0.0"),
				behavior: StubBehavior::Break,
			}
		}
	}

	#[async_trait]
	impl ExchangeAdapter for StubAdapter {
		fn adapter_info(&self) -> &Adapter {
			&self.info
		}

		async fn list_currencies(
			&self,
			_config: &ProviderRuntimeConfig,
		) -> AdapterResult<Vec<SwapCoin>> {
			unimplemented!("not exercised")
		}

		async fn get_limits(
			&self,
			from: &CoinKey,
			to: &CoinKey,
			_config: &ProviderRuntimeConfig,
		) -> AdapterResult<SwapLimits> {
			match &self.behavior {
				StubBehavior::Limits(limits) => Ok(*limits),
				StubBehavior::Refuse => Err(AdapterError::pair_disabled(
					format!("{}/{}", from, to),
					"pair temporarily on hold",
				)),
				StubBehavior::Break => Err(AdapterError::invalid_response("stub failure")),
			}
		}

		async fn get_quote(
			&self,
			_request: &QuoteRequest,
			_config: &ProviderRuntimeConfig,
		) -> AdapterResult<Quote> {
			unimplemented!("not exercised")
		}

		async fn build_transaction_payload(
			&self,
			_request: &QuoteRequest,
			_quote: &Quote,
			_route: &Route,
			_config: &ProviderRuntimeConfig,
		) -> AdapterResult<ProviderTxPayload> {
			unimplemented!("not exercised")
		}

		async fn report_broadcast(
			&self,
			_report: &BroadcastReport,
			_config: &ProviderRuntimeConfig,
		) -> AdapterResult<SwapStatus> {
			unimplemented!("not exercised")
		}

		async fn health_check(&self, _config: &ProviderRuntimeConfig) -> AdapterResult<bool> {
			Ok(true)
		}
	}

	fn pair_provider(id: &str) -> swapflow_types::providers::ProviderState {
		TestProviders::with_coins(id, vec![TestCoins::btc(), TestCoins::eth()])
	}

	fn setup(adapters: Vec<StubAdapter>) -> LimitsAggregator {
		let mut registry = AdapterRegistry::new();
		let mut providers = Vec::new();
		for adapter in adapters {
			providers.push(pair_provider(adapter.info.adapter_id.as_str()));
			registry.register(Arc::new(adapter)).unwrap();
		}
		LimitsAggregator::new(
			Arc::new(ProviderDirectory::new(providers)),
			Arc::new(registry),
		)
	}

	fn btc() -> CoinKey {
		CoinKey::new("btc", "btc")
	}

	fn eth() -> CoinKey {
		CoinKey::new("eth", "eth")
	}

	#[tokio::test]
	async fn test_combines_bounds_conservatively() {
		let aggregator = setup(vec![
			StubAdapter::with_limits("alpha", Some(0.05), Some(10.0)),
			StubAdapter::with_limits("beta", Some(0.01), None),
		]);

		let limits = aggregator.aggregate(&btc(), &eth()).await.unwrap();

		assert_eq!(limits.min_amount, Some(0.01));
		// One provider never stated a maximum, so the aggregate cannot either
		assert_eq!(limits.max_amount, None);
	}

	#[tokio::test]
	async fn test_unlisted_pair_is_disabled_without_any_call() {
		let aggregator = setup(vec![StubAdapter::with_limits("alpha", Some(0.05), None)]);

		let err = aggregator
			.aggregate(&CoinKey::new("doge", "doge"), &eth())
			.await
			.unwrap_err();

		assert!(matches!(err, LimitsError::PairDisabled { .. }));
	}

	#[tokio::test]
	async fn test_unanimous_refusal_marks_pair_disabled() {
		let aggregator = setup(vec![
			StubAdapter::refusing("alpha"),
			StubAdapter::refusing("beta"),
		]);

		let err = aggregator.aggregate(&btc(), &eth()).await.unwrap_err();

		assert!(matches!(err, LimitsError::PairDisabled { .. }));
	}

	#[tokio::test]
	async fn test_mixed_failures_stay_unavailable() {
		let aggregator = setup(vec![
			StubAdapter::refusing("alpha"),
			StubAdapter::broken("beta"),
		]);

		let err = aggregator.aggregate(&btc(), &eth()).await.unwrap_err();

		match err {
			LimitsError::Unavailable { failed, queried, .. } => {
				assert_eq!(failed, 2);
				assert_eq!(queried, 2);
			}
			other => panic!("expected Unavailable, got {other:?}"),
		}
	}

	#[tokio::test]
	async fn test_partial_success_still_aggregates_and_caches() {
		let aggregator = setup(vec![
			StubAdapter::with_limits("alpha", Some(0.02), Some(5.0)),
			StubAdapter::broken("beta"),
		]);

		let limits = aggregator.aggregate(&btc(), &eth()).await.unwrap();
		assert_eq!(limits.min_amount, Some(0.02));
		assert_eq!(limits.max_amount, Some(5.0));

		let cached = aggregator.directory.get("alpha").await.unwrap();
		assert_eq!(cached.limits.unwrap().min_amount, Some(0.02));
	}
}
