//! Transaction-proposal assembly for a selected route.
//!
//! Turns a route plus the user's wallet into the proposal the wallet
//! collaborator funds and signs. The chain decides the shape: native coins
//! move value in the transaction amount, tokens move it through calldata
//! with the native amount pinned to zero, and send-max proposals carry their
//! fee and inputs pre-resolved so the signed transaction matches the
//! estimate exactly.

use crate::gas::resolve_gas_limit;
use std::sync::Arc;
use swapflow_types::limits::{AmountCheck, SwapLimits};
use swapflow_types::transactions::{
	to_smallest_unit, BuildError, FeeLevel, ProposalMetadata, ProposalSpec, TransactionProposal,
};
use swapflow_types::wallet::{WalletProvider, WalletRef};
use tracing::{debug, warn};

/// Inputs for one proposal build
#[derive(Debug, Clone)]
pub struct BuildRequest {
	pub wallet: WalletRef,

	/// Amount to sell, in the from-asset display unit
	pub amount: f64,

	/// Spend the whole balance instead of a fixed amount
	pub send_max: bool,

	/// Resolved payin destination for the swap
	pub destination: String,

	/// Provider-issued memo/tag, numeric on tag-bearing chains
	pub payin_extra_id: Option<String>,

	/// Route calldata for token swaps
	pub calldata: Option<String>,

	/// Provider gas estimate for the calldata, when given
	pub provider_gas: Option<u64>,

	/// Aggregated pair limits to pre-flight the amount against
	pub limits: Option<SwapLimits>,

	pub metadata: ProposalMetadata,
}

impl BuildRequest {
	pub fn new(wallet: WalletRef, amount: f64, destination: &str, metadata: ProposalMetadata) -> Self {
		Self {
			wallet,
			amount,
			send_max: false,
			destination: destination.to_string(),
			payin_extra_id: None,
			calldata: None,
			provider_gas: None,
			limits: None,
			metadata,
		}
	}

	pub fn with_send_max(mut self) -> Self {
		self.send_max = true;
		self
	}

	pub fn with_payin_extra_id(mut self, extra_id: &str) -> Self {
		self.payin_extra_id = Some(extra_id.to_string());
		self
	}

	pub fn with_calldata(mut self, calldata: &str) -> Self {
		self.calldata = Some(calldata.to_string());
		self
	}

	pub fn with_provider_gas(mut self, gas: u64) -> Self {
		self.provider_gas = Some(gas);
		self
	}

	pub fn with_limits(mut self, limits: SwapLimits) -> Self {
		self.limits = Some(limits);
		self
	}
}

/// Builds funded transaction proposals through the wallet collaborator.
pub struct TransactionBuilder {
	wallet_provider: Arc<dyn WalletProvider>,
}

impl TransactionBuilder {
	pub fn new(wallet_provider: Arc<dyn WalletProvider>) -> Self {
		Self { wallet_provider }
	}

	/// Assemble and fund a proposal for the request.
	///
	/// Fails fast on anything knowable without the wallet: limit violations,
	/// unusable amounts and token routes that arrived without calldata.
	pub async fn build(&self, request: BuildRequest) -> Result<TransactionProposal, BuildError> {
		if let Some(limits) = &request.limits {
			match limits.check_amount(request.amount) {
				AmountCheck::Ok => {}
				AmountCheck::BelowMinimum { min } => return Err(BuildError::BelowMinimum { min }),
				AmountCheck::AboveMaximum { max } => return Err(BuildError::AboveMaximum { max }),
			}
		}

		let converted = to_smallest_unit(request.amount, request.wallet.decimals)?;
		if converted == 0 && !request.send_max {
			return Err(BuildError::InvalidAmount {
				reason: format!("{} is below one base unit", request.amount),
			});
		}

		let is_token = request.wallet.is_token();
		let calldata = request
			.calldata
			.as_deref()
			.map(str::trim)
			.filter(|s| !s.is_empty())
			.map(str::to_string);
		if is_token && calldata.is_none() {
			return Err(BuildError::MissingCalldata);
		}

		let fee_level = fee_level_for_chain(&request.wallet.chain);

		// Send-max on a native coin pins fee and inputs up front so the
		// signed transaction cannot drift from the estimate. Token value
		// rides in calldata, so the native amount is zero there.
		let mut spec;
		if request.send_max && !is_token {
			let fee_rate = self
				.wallet_provider
				.estimate_fee_rate(&request.wallet, fee_level)
				.await?;
			let max = self
				.wallet_provider
				.estimate_max_spendable(&request.wallet, Some(fee_rate))
				.await?;
			debug!(
				"Send-max resolved to {} sats after {} sats fee ({} inputs)",
				max.amount_sats,
				max.fee_sats,
				max.inputs.len()
			);

			spec = ProposalSpec::new(&request.destination, max.amount_sats, request.metadata.clone());
			spec.fee_level = None;
			spec.fixed_fee_sats = Some(max.fee_sats);
			spec.max_send_notice = Some(max.notice());
			spec.inputs = Some(max.inputs);
		} else {
			let available = self.wallet_provider.query_balance(&request.wallet).await?;
			if converted > available {
				return Err(BuildError::InsufficientBalance {
					required_sats: converted,
					available_sats: available,
				});
			}

			let amount_sats = if is_token { 0 } else { converted };
			spec = ProposalSpec::new(&request.destination, amount_sats, request.metadata.clone());
			spec.fee_level = Some(fee_level);
		}

		if is_token {
			let routing_key = request.metadata.routing_key.as_deref().unwrap_or("");
			spec.is_token_transfer = true;
			spec.gas_limit = Some(resolve_gas_limit(
				routing_key,
				request.provider_gas,
				calldata.as_deref(),
			));
			spec.calldata = calldata;
		}

		spec.destination_tag = parse_destination_tag(request.payin_extra_id.as_deref());

		let proposal = self
			.wallet_provider
			.create_transaction_proposal(&request.wallet, spec)
			.await?;
		debug!(
			"Built proposal for {} sats to {} (fee {} sats)",
			proposal.amount_sats, proposal.destination_address, proposal.fee_sats
		);
		Ok(proposal)
	}
}

impl std::fmt::Debug for TransactionBuilder {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TransactionBuilder").finish_non_exhaustive()
	}
}

/// Confirmation-speed level per chain. Swap windows are minutes long, so
/// chains with volatile mempools get priority fees.
pub(crate) fn fee_level_for_chain(chain: &str) -> FeeLevel {
	match chain {
		"btc" | "eth" | "matic" => FeeLevel::Priority,
		_ => FeeLevel::Normal,
	}
}

fn parse_destination_tag(extra_id: Option<&str>) -> Option<u32> {
	let raw = extra_id.map(str::trim).filter(|s| !s.is_empty())?;
	match raw.parse::<u32>() {
		Ok(tag) => Some(tag),
		Err(_) => {
			warn!("Ignoring non-numeric payin extra id {:?}", raw);
			None
		}
	}
}
