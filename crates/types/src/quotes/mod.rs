//! Quote request/response model

pub mod errors;
pub use errors::QuoteError;

use crate::coins::CoinKey;
use crate::constants::DEFAULT_SLIPPAGE_PERCENT;
use crate::routes::Route;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type QuoteResult<T> = Result<T, QuoteError>;

/// Parameters for requesting a quote from a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
	pub from: CoinKey,
	pub to: CoinKey,

	/// Amount to sell, in the *from*-asset display unit
	pub amount: f64,

	/// Source/refund address on the *from* chain
	pub sender_address: String,

	/// Receive address on the *to* chain
	pub recipient_address: String,

	/// Maximum acceptable rate deviation in percent; the engine default
	/// applies when absent
	pub slippage: Option<f64>,

	/// Contract address when the *from* asset is a token
	pub from_token_address: Option<String>,

	/// Contract address when the *to* asset is a token
	pub to_token_address: Option<String>,
}

impl QuoteRequest {
	pub fn new(
		from: CoinKey,
		to: CoinKey,
		amount: f64,
		sender_address: &str,
		recipient_address: &str,
	) -> Self {
		Self {
			from,
			to,
			amount,
			sender_address: sender_address.to_string(),
			recipient_address: recipient_address.to_string(),
			slippage: None,
			from_token_address: None,
			to_token_address: None,
		}
	}

	pub fn with_slippage(mut self, slippage: f64) -> Self {
		self.slippage = Some(slippage);
		self
	}

	pub fn with_from_token_address(mut self, address: &str) -> Self {
		self.from_token_address = Some(address.to_string());
		self
	}

	pub fn with_to_token_address(mut self, address: &str) -> Self {
		self.to_token_address = Some(address.to_string());
		self
	}

	pub fn slippage_or_default(&self) -> f64 {
		self.slippage.unwrap_or(DEFAULT_SLIPPAGE_PERCENT)
	}
}

/// A provider's answer to a [`QuoteRequest`]: one or more routes, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
	/// Provider-assigned id when the provider issues one, generated otherwise
	pub quote_id: String,

	/// Provider that produced this quote
	pub provider_id: String,

	/// Amount being sold, echoed from the request
	pub sell_amount: f64,

	/// Offered routes, pre-sorted best-first by the provider
	pub routes: Vec<Route>,

	pub created_at: DateTime<Utc>,
}

impl Quote {
	pub fn new(provider_id: &str, sell_amount: f64, routes: Vec<Route>) -> Self {
		Self {
			quote_id: Uuid::new_v4().to_string(),
			provider_id: provider_id.to_string(),
			sell_amount,
			routes,
			created_at: Utc::now(),
		}
	}

	pub fn with_quote_id(mut self, quote_id: &str) -> Self {
		self.quote_id = quote_id.to_string();
		self
	}

	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_slippage_default() {
		let req = QuoteRequest::new(
			CoinKey::new("btc", "btc"),
			CoinKey::new("eth", "eth"),
			0.5,
			"bc1qsender",
			"0xrecipient",
		);
		assert_eq!(req.slippage_or_default(), DEFAULT_SLIPPAGE_PERCENT);
		assert_eq!(req.with_slippage(1.0).slippage_or_default(), 1.0);
	}

	#[test]
	fn test_quote_id_generated_unless_assigned() {
		let q = Quote::new("thorswap", 0.5, vec![]);
		assert!(!q.quote_id.is_empty());

		let q = q.with_quote_id("prov-123");
		assert_eq!(q.quote_id, "prov-123");
		assert!(q.is_empty());
	}

	#[test]
	fn test_routes_keep_provider_order() {
		let q = Quote::new(
			"thorswap",
			1.0,
			vec![Route::new("UNISWAPV3", 2.0), Route::new("ZEROX", 1.9)],
		);
		assert_eq!(q.routes[0].routing_key, "UNISWAPV3");
	}
}
