//! Persisted swap records for history and status tracking

pub mod storage;
pub use storage::SwapRecordStore;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalized provider-side swap status.
///
/// Providers report progress under their own labels; adapters map them onto
/// this set. `Broadcast` is the engine's own initial status, set when the
/// transaction went out but the provider has not acknowledged it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapStatus {
	Broadcast,
	Waiting,
	Confirming,
	Exchanging,
	Sending,
	Success,
	Failed,
	Refunded,
	Expired,
}

impl SwapStatus {
	/// Map a provider's status label onto the normalized set.
	/// Unknown labels read as `Waiting` so polling keeps going.
	pub fn from_provider_label(label: &str) -> Self {
		match label.trim().to_lowercase().as_str() {
			"new" | "broadcast" => SwapStatus::Broadcast,
			"waiting" | "mempool" | "inbound" => SwapStatus::Waiting,
			"confirming" | "confirmed" => SwapStatus::Confirming,
			"exchanging" | "swapping" => SwapStatus::Exchanging,
			"sending" | "outbound" => SwapStatus::Sending,
			"finished" | "success" | "completed" => SwapStatus::Success,
			"failed" | "error" => SwapStatus::Failed,
			"refunded" | "refund" => SwapStatus::Refunded,
			"expired" | "overdue" => SwapStatus::Expired,
			_ => SwapStatus::Waiting,
		}
	}

	/// No further provider-side transitions expected?
	pub fn is_terminal(&self) -> bool {
		matches!(
			self,
			SwapStatus::Success | SwapStatus::Failed | SwapStatus::Refunded | SwapStatus::Expired
		)
	}
}

/// One completed checkout, written once on completion.
///
/// Enough to show history and keep polling the provider for progress;
/// the swap logic itself never depends on these records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapRecord {
	/// Engine-assigned order id
	pub order_id: String,

	pub provider_id: String,
	pub quote_id: String,
	pub routing_key: Option<String>,

	pub coin_from: String,
	pub chain_from: String,
	/// Amount sold, from-asset display unit
	pub amount_from: f64,

	pub coin_to: String,
	pub chain_to: String,
	/// Expected amount received, to-asset display unit
	pub amount_to: f64,

	/// Receive address on the to-chain
	pub address_to: String,

	/// Provider deposit address or spender contract the payment went to
	pub payin_address: String,
	pub payin_extra_id: Option<String>,

	/// Total provider fee, from-asset display unit
	pub total_provider_fee: Option<f64>,

	/// Slippage the quote was requested with, percent
	pub slippage: Option<f64>,

	/// On-chain transaction hash
	pub tx_hash: String,

	pub status: SwapStatus,
	pub created_at: DateTime<Utc>,
}

impl SwapRecord {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		provider_id: &str,
		quote_id: &str,
		coin_from: &str,
		chain_from: &str,
		amount_from: f64,
		coin_to: &str,
		chain_to: &str,
		amount_to: f64,
		address_to: &str,
		payin_address: &str,
		tx_hash: &str,
	) -> Self {
		Self {
			order_id: Uuid::new_v4().to_string(),
			provider_id: provider_id.to_string(),
			quote_id: quote_id.to_string(),
			routing_key: None,
			coin_from: coin_from.to_string(),
			chain_from: chain_from.to_string(),
			amount_from,
			coin_to: coin_to.to_string(),
			chain_to: chain_to.to_string(),
			amount_to,
			address_to: address_to.to_string(),
			payin_address: payin_address.to_string(),
			payin_extra_id: None,
			total_provider_fee: None,
			slippage: None,
			tx_hash: tx_hash.to_string(),
			status: SwapStatus::Broadcast,
			created_at: Utc::now(),
		}
	}

	pub fn with_routing_key(mut self, routing_key: &str) -> Self {
		self.routing_key = Some(routing_key.to_string());
		self
	}

	pub fn with_payin_extra_id(mut self, extra_id: &str) -> Self {
		self.payin_extra_id = Some(extra_id.to_string());
		self
	}

	pub fn with_total_provider_fee(mut self, fee: f64) -> Self {
		self.total_provider_fee = Some(fee);
		self
	}

	pub fn with_slippage(mut self, slippage: f64) -> Self {
		self.slippage = Some(slippage);
		self
	}

	pub fn with_status(mut self, status: SwapStatus) -> Self {
		self.status = status;
		self
	}
}
