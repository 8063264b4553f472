//! Shared models for adapter communication
//! Used by ExchangeAdapter implementations for request/response data

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider-side payment instructions for a selected route.
///
/// For deposit-style providers this is the payin address the built
/// transaction pays into; for EVM aggregators it carries the spender
/// contract plus calldata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderTxPayload {
	/// Deposit address or spender contract the transaction targets
	pub payin_address: String,

	/// Memo/tag required by tag-bearing chains, when the provider issues one
	pub payin_extra_id: Option<String>,

	/// ABI-encoded calldata for token swaps
	pub calldata: Option<String>,

	/// Provider gas estimate for executing the calldata
	pub gas: Option<u64>,

	/// Exact from-amount the provider expects to receive, when echoed
	pub deposit_amount: Option<f64>,

	/// Pay-by instant for deposit-style providers that only reveal it when
	/// the transaction is created. Takes precedence over the route expiry.
	pub expiry: Option<DateTime<Utc>>,

	/// Provider-side order id issued at transaction creation. When present it
	/// supersedes the quote id for broadcast reporting and status polling.
	pub provider_order_id: Option<String>,
}

impl ProviderTxPayload {
	pub fn new(payin_address: &str) -> Self {
		Self {
			payin_address: payin_address.to_string(),
			payin_extra_id: None,
			calldata: None,
			gas: None,
			deposit_amount: None,
			expiry: None,
			provider_order_id: None,
		}
	}

	pub fn with_extra_id(mut self, extra_id: &str) -> Self {
		self.payin_extra_id = Some(extra_id.to_string());
		self
	}

	pub fn with_calldata(mut self, calldata: &str) -> Self {
		self.calldata = Some(calldata.to_string());
		self
	}

	pub fn with_gas(mut self, gas: u64) -> Self {
		self.gas = Some(gas);
		self
	}

	pub fn with_deposit_amount(mut self, amount: f64) -> Self {
		self.deposit_amount = Some(amount);
		self
	}

	pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Self {
		self.expiry = Some(expiry);
		self
	}

	pub fn with_provider_order_id(mut self, order_id: &str) -> Self {
		self.provider_order_id = Some(order_id.to_string());
		self
	}
}

/// What the coordinator sends back to the provider after a broadcast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastReport {
	/// Quote the broadcast belongs to
	pub quote_id: String,

	/// On-chain transaction hash
	pub tx_hash: String,

	/// Amount sold, in the from-asset display unit
	pub sell_amount: f64,

	/// Route that was executed, when the provider offered several
	pub routing_key: Option<String>,
}

impl BroadcastReport {
	pub fn new(quote_id: &str, tx_hash: &str, sell_amount: f64) -> Self {
		Self {
			quote_id: quote_id.to_string(),
			tx_hash: tx_hash.to_string(),
			sell_amount,
			routing_key: None,
		}
	}

	pub fn with_routing_key(mut self, routing_key: &str) -> Self {
		self.routing_key = Some(routing_key.to_string());
		self
	}
}
