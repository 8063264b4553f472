//! Swappable asset model shared by all providers

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identity of a swappable asset: lowercase ticker plus the chain it lives on.
///
/// Two providers listing "USDC on Ethereum" under different casings or display
/// names collapse onto the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CoinKey {
	pub ticker: String,
	pub chain: String,
}

impl CoinKey {
	pub fn new(ticker: &str, chain: &str) -> Self {
		Self {
			ticker: ticker.trim().to_lowercase(),
			chain: chain.trim().to_lowercase(),
		}
	}
}

impl fmt::Display for CoinKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}_{}", self.ticker, self.chain)
	}
}

/// A swappable asset as seen by the aggregation layer.
///
/// Constructed by adapters from provider listings; the aggregator merges
/// instances with the same `CoinKey` by unioning their provider support sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapCoin {
	/// Asset ticker, lowercase (e.g. "btc", "usdc")
	pub ticker: String,

	/// Human-readable name (e.g. "Bitcoin", "USD Coin")
	pub display_name: String,

	/// Chain the asset lives on, lowercase (e.g. "btc", "eth", "matic")
	pub chain: String,

	/// Contract address when the asset is a token rather than the chain's
	/// native asset
	pub token_contract_address: Option<String>,

	/// Providers currently offering this asset
	pub supported_by: BTreeSet<String>,
}

impl SwapCoin {
	pub fn new(ticker: &str, display_name: &str, chain: &str) -> Self {
		Self {
			ticker: ticker.trim().to_lowercase(),
			display_name: display_name.to_string(),
			chain: chain.trim().to_lowercase(),
			token_contract_address: None,
			supported_by: BTreeSet::new(),
		}
	}

	pub fn with_token_address(mut self, address: &str) -> Self {
		self.token_contract_address = Some(address.to_string());
		self
	}

	pub fn with_provider(mut self, provider_id: &str) -> Self {
		self.supported_by.insert(provider_id.to_string());
		self
	}

	pub fn key(&self) -> CoinKey {
		CoinKey::new(&self.ticker, &self.chain)
	}

	/// Native chain asset or a token contract?
	pub fn is_token(&self) -> bool {
		self.token_contract_address.is_some()
	}

	pub fn supports(&self, provider_id: &str) -> bool {
		self.supported_by.contains(provider_id)
	}

	/// Fold another listing of the same asset into this one.
	///
	/// Support sets are unioned; a missing display name or token address is
	/// filled from the other side, existing values win otherwise.
	pub fn merge(&mut self, other: SwapCoin) {
		debug_assert_eq!(self.key(), other.key());
		self.supported_by.extend(other.supported_by);
		if self.display_name.is_empty() {
			self.display_name = other.display_name;
		}
		if self.token_contract_address.is_none() {
			self.token_contract_address = other.token_contract_address;
		}
	}
}
