//! Currency aggregation across providers.
//!
//! A refresh round asks every active provider for its listing, merges the
//! answers by asset identity and publishes one ranked list. Providers that
//! fail a round sit it out (their offers are hidden) but stay configured and
//! rejoin the next round.

use crate::directory::{CurrencySnapshot, ProviderDirectory};
use crate::fanout::{settle_all, FanoutConfig};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use swapflow_adapters::AdapterRegistry;
use swapflow_types::adapters::ProviderRuntimeConfig;
use swapflow_types::coins::{CoinKey, SwapCoin};
use swapflow_types::constants::DEFAULT_PREFERRED_TICKERS;
use tracing::{debug, info, warn};

/// Fans currency listings out to every active provider and publishes the
/// merged result.
#[derive(Debug)]
pub struct CurrencyAggregator {
	directory: Arc<ProviderDirectory>,
	registry: Arc<AdapterRegistry>,
	fanout: FanoutConfig,
	preferred: Vec<String>,
}

impl CurrencyAggregator {
	pub fn new(directory: Arc<ProviderDirectory>, registry: Arc<AdapterRegistry>) -> Self {
		Self {
			directory,
			registry,
			fanout: FanoutConfig::default(),
			preferred: DEFAULT_PREFERRED_TICKERS
				.iter()
				.map(|t| t.to_string())
				.collect(),
		}
	}

	pub fn with_fanout_config(mut self, fanout: FanoutConfig) -> Self {
		self.fanout = fanout;
		self
	}

	/// Override the tickers ranked ahead of the alphabetical tail
	pub fn with_preferred_tickers(mut self, tickers: Vec<String>) -> Self {
		self.preferred = tickers;
		self
	}

	/// Run one currency round and publish the merged list.
	///
	/// The published snapshot swaps in atomically once the whole round has
	/// settled; concurrent readers keep seeing the previous round until then.
	pub async fn refresh(&self) -> CurrencySnapshot {
		let round = self.directory.begin_round().await;
		if round.is_empty() {
			debug!("No active providers, skipping currency round");
			return self.directory.snapshot().await;
		}

		info!("Refreshing currencies across {} providers", round.len());

		let mut tasks = Vec::with_capacity(round.len());
		let mut results: Vec<(String, Result<Vec<SwapCoin>, String>)> =
			Vec::with_capacity(round.len());

		for provider in round {
			let Some(adapter) = self.registry.get(&provider.adapter_id) else {
				warn!(
					"Provider {} references unknown adapter {}, sitting out the round",
					provider.provider_id, provider.adapter_id
				);
				results.push((
					provider.provider_id.clone(),
					Err(format!("unknown adapter: {}", provider.adapter_id)),
				));
				continue;
			};

			let config = ProviderRuntimeConfig::from(&provider);
			tasks.push((provider.provider_id.clone(), async move {
				adapter.list_currencies(&config).await
			}));
		}

		for outcome in settle_all(tasks, &self.fanout).await {
			match outcome.result {
				Ok(listing) => {
					debug!(
						"Provider {} listed {} currencies",
						outcome.provider_id,
						listing.len()
					);
					results.push((outcome.provider_id, Ok(listing)));
				}
				Err(e) => {
					warn!(
						"Provider {} sat out the currency round: {}",
						outcome.provider_id, e
					);
					results.push((outcome.provider_id, Err(e.to_string())));
				}
			}
		}

		let merged = self.merge_and_rank(&results);
		self.directory.publish_round(results, merged).await;

		let snapshot = self.directory.snapshot().await;
		info!(
			"Published {} currencies from {}/{} providers",
			snapshot.coins.len(),
			snapshot.providers_offering,
			snapshot.providers_queried
		);
		snapshot
	}

	/// Union the per-provider listings by asset identity, then rank:
	/// preferred tickers first in their configured order, everything else
	/// alphabetically by display name.
	fn merge_and_rank(&self, results: &[(String, Result<Vec<SwapCoin>, String>)]) -> Vec<SwapCoin> {
		let mut merged: BTreeMap<CoinKey, SwapCoin> = BTreeMap::new();
		for (_, result) in results {
			let Ok(listing) = result else { continue };
			for coin in listing {
				match merged.entry(coin.key()) {
					Entry::Occupied(mut existing) => existing.get_mut().merge(coin.clone()),
					Entry::Vacant(slot) => {
						slot.insert(coin.clone());
					}
				}
			}
		}

		let mut coins: Vec<SwapCoin> = merged.into_values().collect();
		coins.sort_by_cached_key(|coin| self.rank(coin));
		coins
	}

	fn rank(&self, coin: &SwapCoin) -> (usize, String) {
		let preference = self
			.preferred
			.iter()
			.position(|t| t.eq_ignore_ascii_case(&coin.ticker))
			.unwrap_or(self.preferred.len());
		(preference, coin.display_name.to_lowercase())
	}
}
