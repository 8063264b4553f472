//! Transaction proposal model shared by the builder and the wallet boundary

use crate::wallet::{WalletError, WalletRef};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Confirmation-speed preference handed to the wallet's fee estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeLevel {
	Priority,
	#[default]
	Normal,
	Economy,
}

/// One spendable input pinned into a send-max proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
	pub tx_id: String,
	pub vout: u32,
	pub amount_sats: u64,
}

/// Wallet-computed figure for "send everything".
///
/// `amount_sats` is the exact spendable balance after the network fee, not
/// the raw balance; inputs the wallet refused to use are summarized so the
/// caller can explain the difference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxSpendInfo {
	pub amount_sats: u64,
	pub fee_sats: u64,
	pub inputs: Vec<TxInput>,
	pub excluded_utxo_count: u32,
	pub excluded_amount_sats: u64,
}

impl MaxSpendInfo {
	pub fn notice(&self) -> MaxSendNotice {
		MaxSendNotice {
			fee_sats: self.fee_sats,
			excluded_utxo_count: self.excluded_utxo_count,
			excluded_amount_sats: self.excluded_amount_sats,
		}
	}
}

/// Why a send-max amount is smaller than the raw balance, kept on the
/// proposal for later display
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxSendNotice {
	pub fee_sats: u64,
	pub excluded_utxo_count: u32,
	pub excluded_amount_sats: u64,
}

/// Where a proposal came from, for records and provider reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalMetadata {
	pub provider_id: String,
	pub quote_id: String,
	pub routing_key: Option<String>,
}

impl ProposalMetadata {
	pub fn new(provider_id: &str, quote_id: &str) -> Self {
		Self {
			provider_id: provider_id.to_string(),
			quote_id: quote_id.to_string(),
			routing_key: None,
		}
	}

	pub fn with_routing_key(mut self, routing_key: &str) -> Self {
		self.routing_key = Some(routing_key.to_string());
		self
	}
}

/// What the transaction builder asks the wallet to turn into a funded
/// proposal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalSpec {
	pub destination_address: String,

	/// Amount in the chain's smallest unit. Zero for token swaps, where
	/// value moves through calldata.
	pub amount_sats: u64,

	pub is_token_transfer: bool,

	/// Mandatory for token swaps
	pub calldata: Option<String>,

	/// Resolved gas limit for calldata execution
	pub gas_limit: Option<u64>,

	/// `None` when `fixed_fee_sats` pins the fee instead
	pub fee_level: Option<FeeLevel>,

	/// Exact fee for send-max proposals
	pub fixed_fee_sats: Option<u64>,

	/// Pinned inputs for send-max proposals
	pub inputs: Option<Vec<TxInput>>,

	/// Memo/tag for tag-bearing chains
	pub destination_tag: Option<u32>,

	pub exclude_unconfirmed_utxos: bool,

	pub max_send_notice: Option<MaxSendNotice>,

	pub metadata: ProposalMetadata,
}

impl ProposalSpec {
	pub fn new(destination_address: &str, amount_sats: u64, metadata: ProposalMetadata) -> Self {
		Self {
			destination_address: destination_address.to_string(),
			amount_sats,
			is_token_transfer: false,
			calldata: None,
			gas_limit: None,
			fee_level: Some(FeeLevel::default()),
			fixed_fee_sats: None,
			inputs: None,
			destination_tag: None,
			exclude_unconfirmed_utxos: true,
			max_send_notice: None,
			metadata,
		}
	}
}

/// A funded, signable proposal as returned by the wallet collaborator.
///
/// Built once per checkout attempt and discarded (never mutated) when the
/// amount or route changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionProposal {
	pub source_wallet: WalletRef,

	pub destination_address: String,
	pub amount_sats: u64,
	pub is_token_transfer: bool,
	pub calldata: Option<String>,
	pub gas_limit: Option<u64>,
	pub fee_level: Option<FeeLevel>,

	/// Network fee the wallet computed (or the pinned send-max fee)
	pub fee_sats: u64,

	pub inputs: Option<Vec<TxInput>>,
	pub destination_tag: Option<u32>,
	pub exclude_unconfirmed_utxos: bool,
	pub max_send_notice: Option<MaxSendNotice>,
	pub metadata: ProposalMetadata,
}

impl TransactionProposal {
	/// Wallet-side assembly of a funded proposal from the builder's spec
	pub fn from_spec(source_wallet: WalletRef, spec: ProposalSpec, fee_sats: u64) -> Self {
		Self {
			source_wallet,
			destination_address: spec.destination_address,
			amount_sats: spec.amount_sats,
			is_token_transfer: spec.is_token_transfer,
			calldata: spec.calldata,
			gas_limit: spec.gas_limit,
			fee_level: spec.fee_level,
			fee_sats: spec.fixed_fee_sats.unwrap_or(fee_sats),
			inputs: spec.inputs,
			destination_tag: spec.destination_tag,
			exclude_unconfirmed_utxos: spec.exclude_unconfirmed_utxos,
			max_send_notice: spec.max_send_notice,
			metadata: spec.metadata,
		}
	}
}

/// Build-time failures, fatal to the current attempt only
#[derive(Error, Debug)]
pub enum BuildError {
	#[error("Token swap requires calldata from the provider route")]
	MissingCalldata,

	#[error("Gas estimation failed: {reason}")]
	GasEstimationFailed { reason: String },

	#[error("Insufficient balance: need {required_sats} sats, have {available_sats} sats")]
	InsufficientBalance {
		required_sats: u64,
		available_sats: u64,
	},

	#[error("Amount below provider minimum of {min}")]
	BelowMinimum { min: f64 },

	#[error("Amount above provider maximum of {max}")]
	AboveMaximum { max: f64 },

	#[error("Invalid amount: {reason}")]
	InvalidAmount { reason: String },

	#[error("Wallet error: {0}")]
	Wallet(#[from] WalletError),
}

/// Convert a display-unit amount to the chain's smallest unit.
///
/// Rounds the scaled value so `0.29 * 1e8` style float noise lands on the
/// intended integer.
pub fn to_smallest_unit(amount: f64, decimals: u8) -> Result<u64, BuildError> {
	if !amount.is_finite() || amount < 0.0 {
		return Err(BuildError::InvalidAmount {
			reason: format!("{} is not a usable amount", amount),
		});
	}
	let scaled = amount * 10f64.powi(decimals as i32);
	if scaled > u64::MAX as f64 {
		return Err(BuildError::InvalidAmount {
			reason: format!("{} overflows the smallest unit", amount),
		});
	}
	Ok(scaled.round() as u64)
}
