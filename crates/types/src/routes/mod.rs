//! Canonical execution route shape
//!
//! Providers disagree about field names for destinations and expiries, so
//! adapters normalize their payloads into [`Route`] at the boundary. Nothing
//! above the adapter layer ever sees a provider-specific field name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fees attached to one route, in the *from*-asset display unit
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeeBreakdown {
	/// On-chain network fee charged by the provider
	pub network_fee: f64,
	/// Provider/affiliate service fee
	pub provider_fee: f64,
	/// Total fee the user pays on top of the swap
	pub total_fee: f64,
}

impl FeeBreakdown {
	pub fn new(network_fee: f64, provider_fee: f64, total_fee: f64) -> Self {
		Self {
			network_fee,
			provider_fee,
			total_fee,
		}
	}
}

/// EVM transaction fragment a provider attaches to a route
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RouteTransaction {
	/// Target contract (spender) address
	pub to: Option<String>,
	/// ABI-encoded calldata for token swaps
	pub data: Option<String>,
	/// Provider's own gas estimate
	pub gas: Option<u64>,
}

/// One concrete execution path offered by a provider's quote.
///
/// Immutable after selection; the raw provider payload rides along for
/// diagnostics and for the payload-build step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
	/// Identifier selecting this route/spender among the quote's offers
	pub routing_key: String,

	/// Expected amount of the *to*-asset this route yields
	pub expected_output: f64,

	/// Fee breakdown for the *from*-chain
	pub fees: FeeBreakdown,

	/// Deposit/spender address, already resolved across the provider's
	/// field-name variants. `None` when the provider sent nothing usable.
	pub destination: Option<String>,

	/// Provider-supplied EVM transaction fragment, when present
	pub transaction: Option<RouteTransaction>,

	/// Absolute instant the provider considers this route stale,
	/// `None` when the provider sent none
	pub expiry: Option<DateTime<Utc>>,

	/// Untouched provider payload for this route
	pub raw_payload: serde_json::Value,
}

impl Route {
	pub fn new(routing_key: &str, expected_output: f64) -> Self {
		Self {
			routing_key: routing_key.to_string(),
			expected_output,
			fees: FeeBreakdown::default(),
			destination: None,
			transaction: None,
			expiry: None,
			raw_payload: serde_json::Value::Null,
		}
	}

	pub fn with_fees(mut self, fees: FeeBreakdown) -> Self {
		self.fees = fees;
		self
	}

	pub fn with_destination(mut self, destination: &str) -> Self {
		self.destination = non_empty(Some(destination));
		self
	}

	pub fn with_transaction(mut self, transaction: RouteTransaction) -> Self {
		self.transaction = Some(transaction);
		self
	}

	pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
		self.expiry = Some(expiry);
		self
	}

	pub fn with_raw_payload(mut self, payload: serde_json::Value) -> Self {
		self.raw_payload = payload;
		self
	}

	/// Calldata carried by the route's transaction fragment, if any
	pub fn calldata(&self) -> Option<&str> {
		self.transaction
			.as_ref()
			.and_then(|tx| tx.data.as_deref())
			.filter(|d| !d.is_empty())
	}

	/// Provider gas estimate carried by the route, if any
	pub fn provider_gas(&self) -> Option<u64> {
		self.transaction.as_ref().and_then(|tx| tx.gas)
	}
}

/// First non-empty candidate, trimmed. Adapters run destination fields
/// through this so "" and missing collapse to the same thing.
pub fn non_empty(candidate: Option<&str>) -> Option<String> {
	candidate
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
}

/// Normalize a provider expiry into an absolute instant.
///
/// Providers send either `deadline` (epoch seconds, numeric) or `expiration`
/// (epoch seconds, string). The numeric field wins when both appear.
/// Unparseable or absent values yield `None`; the checkout layer substitutes
/// its default window in that case.
pub fn expiry_from_provider_fields(
	deadline_secs: Option<i64>,
	expiration: Option<&str>,
) -> Option<DateTime<Utc>> {
	if let Some(secs) = deadline_secs {
		return DateTime::<Utc>::from_timestamp(secs, 0);
	}
	expiration
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.and_then(|s| s.parse::<i64>().ok())
		.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_expiry_deadline_wins_over_expiration() {
		let expiry = expiry_from_provider_fields(Some(1_700_000_000), Some("1_800_000_000"));
		assert_eq!(expiry.unwrap().timestamp(), 1_700_000_000);
	}

	#[test]
	fn test_expiry_from_expiration_string() {
		let expiry = expiry_from_provider_fields(None, Some("1700000123"));
		assert_eq!(expiry.unwrap().timestamp(), 1_700_000_123);
	}

	#[test]
	fn test_expiry_absent_or_garbage_is_none() {
		assert!(expiry_from_provider_fields(None, None).is_none());
		assert!(expiry_from_provider_fields(None, Some("")).is_none());
		assert!(expiry_from_provider_fields(None, Some("soon")).is_none());
	}

	#[test]
	fn test_destination_normalization_drops_blank() {
		let route = Route::new("THORCHAIN", 1.5).with_destination("  ");
		assert_eq!(route.destination, None);

		let route = Route::new("THORCHAIN", 1.5).with_destination(" 0xabc ");
		assert_eq!(route.destination.as_deref(), Some("0xabc"));
	}

	#[test]
	fn test_calldata_empty_string_is_absent() {
		let route = Route::new("UNISWAPV3", 2.0).with_transaction(RouteTransaction {
			to: Some("0xrouter".into()),
			data: Some(String::new()),
			gas: Some(120_000),
		});

		assert_eq!(route.calldata(), None);
		assert_eq!(route.provider_gas(), Some(120_000));
	}
}
