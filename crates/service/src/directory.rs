//! Runtime directory of configured providers and the published coin list.
//!
//! All provider round state and the merged coin list live behind one lock, so
//! a refresh publishes atomically: readers either see the previous round or
//! the complete new one, never a half-written mix.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use swapflow_types::coins::{CoinKey, SwapCoin};
use swapflow_types::limits::SwapLimits;
use swapflow_types::providers::ProviderState;
use tokio::sync::RwLock;
use tracing::debug;

/// Point-in-time view of the aggregated coin list
#[derive(Debug, Clone, Serialize)]
pub struct CurrencySnapshot {
	/// Merged coin list, preference-ranked
	pub coins: Vec<SwapCoin>,

	/// Providers eligible for rounds when the snapshot was taken
	pub providers_queried: usize,

	/// Providers actually offering swaps in the snapshot
	pub providers_offering: usize,

	/// When the last currency round was published
	pub refreshed_at: Option<DateTime<Utc>>,
}

struct DirectoryInner {
	providers: HashMap<String, ProviderState>,
	coins: Vec<SwapCoin>,
	refreshed_at: Option<DateTime<Utc>>,
}

/// Shared registry of provider runtime state.
///
/// Aggregators mutate it between rounds; quote and checkout flows read
/// cloned-out snapshots so they never hold the lock across awaits.
pub struct ProviderDirectory {
	inner: RwLock<DirectoryInner>,
}

impl ProviderDirectory {
	pub fn new(providers: Vec<ProviderState>) -> Self {
		let providers = providers
			.into_iter()
			.map(|p| (p.provider_id.clone(), p))
			.collect();
		Self {
			inner: RwLock::new(DirectoryInner {
				providers,
				coins: Vec::new(),
				refreshed_at: None,
			}),
		}
	}

	/// Insert or replace a provider configuration
	pub async fn upsert(&self, provider: ProviderState) {
		let mut inner = self.inner.write().await;
		inner.providers.insert(provider.provider_id.clone(), provider);
	}

	pub async fn get(&self, provider_id: &str) -> Option<ProviderState> {
		let inner = self.inner.read().await;
		inner.providers.get(provider_id).cloned()
	}

	/// Providers eligible for aggregation rounds
	pub async fn active_providers(&self) -> Vec<ProviderState> {
		let inner = self.inner.read().await;
		inner
			.providers
			.values()
			.filter(|p| p.is_active())
			.cloned()
			.collect()
	}

	/// Providers currently offering swaps
	pub async fn offering_providers(&self) -> Vec<ProviderState> {
		let inner = self.inner.read().await;
		inner
			.providers
			.values()
			.filter(|p| p.is_offering())
			.cloned()
			.collect()
	}

	/// Offering providers whose last published listing covers both assets
	pub async fn providers_supporting(&self, from: &CoinKey, to: &CoinKey) -> Vec<ProviderState> {
		let inner = self.inner.read().await;
		inner
			.providers
			.values()
			.filter(|p| p.is_offering() && p.supports_pair(from, to))
			.cloned()
			.collect()
	}

	/// The published coin list from the last currency round
	pub async fn coins(&self) -> Vec<SwapCoin> {
		let inner = self.inner.read().await;
		inner.coins.clone()
	}

	pub async fn snapshot(&self) -> CurrencySnapshot {
		let inner = self.inner.read().await;
		CurrencySnapshot {
			coins: inner.coins.clone(),
			providers_queried: inner.providers.values().filter(|p| p.is_active()).count(),
			providers_offering: inner.providers.values().filter(|p| p.is_offering()).count(),
			refreshed_at: inner.refreshed_at,
		}
	}

	/// Administratively disable or re-enable a provider. Returns false when
	/// the provider is unknown.
	pub async fn set_disabled(&self, provider_id: &str, disabled: bool) -> bool {
		let mut inner = self.inner.write().await;
		match inner.providers.get_mut(provider_id) {
			Some(provider) => {
				if disabled {
					provider.disable();
				} else {
					provider.enable();
				}
				true
			}
			None => false,
		}
	}

	/// Open a currency round: reset per-round state on every active provider
	/// and hand back clones for the fan-out to work on.
	pub(crate) async fn begin_round(&self) -> Vec<ProviderState> {
		let mut inner = self.inner.write().await;
		let mut round = Vec::new();
		for provider in inner.providers.values_mut() {
			if provider.is_active() {
				provider.begin_round();
				round.push(provider.clone());
			}
		}
		round
	}

	/// Publish a finished currency round in one write: per-provider round
	/// bookkeeping plus the merged coin list.
	pub(crate) async fn publish_round(
		&self,
		results: Vec<(String, Result<Vec<SwapCoin>, String>)>,
		coins: Vec<SwapCoin>,
	) {
		let mut inner = self.inner.write().await;
		for (provider_id, result) in results {
			let Some(provider) = inner.providers.get_mut(&provider_id) else {
				debug!("Dropping round result for unknown provider {}", provider_id);
				continue;
			};
			match result {
				Ok(listing) => provider.complete_round(listing),
				Err(reason) => provider.fail_round(&reason),
			}
		}
		inner.coins = coins;
		inner.refreshed_at = Some(Utc::now());
	}

	/// Remember the last known pair limits per provider
	pub(crate) async fn cache_limits(&self, updates: Vec<(String, SwapLimits)>) {
		let mut inner = self.inner.write().await;
		for (provider_id, limits) in updates {
			if let Some(provider) = inner.providers.get_mut(&provider_id) {
				provider.limits = Some(limits);
			}
		}
	}

	pub async fn len(&self) -> usize {
		self.inner.read().await.providers.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.inner.read().await.providers.is_empty()
	}
}

impl std::fmt::Debug for ProviderDirectory {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProviderDirectory").finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn provider(id: &str) -> ProviderState {
		ProviderState::new(id, id, "https://api.example.com")
	}

	fn coin(ticker: &str, chain: &str, provider_id: &str) -> SwapCoin {
		SwapCoin::new(ticker, ticker.to_uppercase().as_str(), chain).with_provider(provider_id)
	}

	#[tokio::test]
	async fn test_upsert_and_get() {
		let directory = ProviderDirectory::new(vec![provider("changelly")]);

		assert!(directory.get("changelly").await.is_some());
		assert!(directory.get("thorswap").await.is_none());

		directory.upsert(provider("thorswap")).await;
		assert_eq!(directory.len().await, 2);
	}

	#[tokio::test]
	async fn test_begin_round_skips_disabled_providers() {
		let directory = ProviderDirectory::new(vec![
			provider("changelly"),
			provider("thorswap").with_enabled(false),
		]);

		let round = directory.begin_round().await;

		assert_eq!(round.len(), 1);
		assert_eq!(round[0].provider_id, "changelly");
	}

	#[tokio::test]
	async fn test_publish_round_updates_offer_state_atomically() {
		let directory = ProviderDirectory::new(vec![provider("changelly"), provider("thorswap")]);
		directory.begin_round().await;

		let listing = vec![coin("btc", "btc", "changelly"), coin("eth", "eth", "changelly")];
		directory
			.publish_round(
				vec![
					("changelly".to_string(), Ok(listing.clone())),
					("thorswap".to_string(), Err("connect timeout".to_string())),
				],
				listing,
			)
			.await;

		let snapshot = directory.snapshot().await;
		assert_eq!(snapshot.providers_queried, 2);
		assert_eq!(snapshot.providers_offering, 1);
		assert_eq!(snapshot.coins.len(), 2);
		assert!(snapshot.refreshed_at.is_some());

		let failed = directory.get("thorswap").await.unwrap();
		assert!(!failed.show_offer);
		assert_eq!(failed.last_error.as_deref(), Some("connect timeout"));

		// Sitting out a round is not an outage: the provider stays active
		// and rejoins the next round.
		assert!(failed.is_active());
	}

	#[tokio::test]
	async fn test_providers_supporting_requires_both_assets() {
		let directory = ProviderDirectory::new(vec![provider("changelly"), provider("thorswap")]);
		directory.begin_round().await;
		directory
			.publish_round(
				vec![
					(
						"changelly".to_string(),
						Ok(vec![coin("btc", "btc", "changelly"), coin("eth", "eth", "changelly")]),
					),
					("thorswap".to_string(), Ok(vec![coin("btc", "btc", "thorswap")])),
				],
				Vec::new(),
			)
			.await;

		let both = directory
			.providers_supporting(&CoinKey::new("btc", "btc"), &CoinKey::new("eth", "eth"))
			.await;

		assert_eq!(both.len(), 1);
		assert_eq!(both[0].provider_id, "changelly");
	}

	#[tokio::test]
	async fn test_set_disabled_removes_from_rounds() {
		let directory = ProviderDirectory::new(vec![provider("changelly")]);

		assert!(directory.set_disabled("changelly", true).await);
		assert!(directory.begin_round().await.is_empty());

		assert!(directory.set_disabled("changelly", false).await);
		assert_eq!(directory.begin_round().await.len(), 1);

		assert!(!directory.set_disabled("ghost", true).await);
	}

	#[tokio::test]
	async fn test_cached_limits_survive_on_provider_state() {
		let directory = ProviderDirectory::new(vec![provider("changelly")]);
		directory
			.cache_limits(vec![("changelly".to_string(), SwapLimits::new(Some(0.01), Some(10.0)))])
			.await;

		let provider = directory.get("changelly").await.unwrap();
		let limits = provider.limits.unwrap();
		assert_eq!(limits.min_amount, Some(0.01));
		assert_eq!(limits.max_amount, Some(10.0));
	}
}
