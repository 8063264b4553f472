//! Wallet collaborator boundary
//!
//! The engine never touches keys, UTXOs or broadcasting itself; everything
//! goes through [`WalletProvider`]. Applications implement this against
//! their wallet stack, tests implement it with mocks.

use crate::coins::CoinKey;
use crate::hardware::HardwareTransport;
use crate::transactions::{FeeLevel, MaxSpendInfo, ProposalSpec, TransactionProposal};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use thiserror::Error;

pub type WalletResult<T> = Result<T, WalletError>;

/// Reference to one wallet the engine can build proposals for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletRef {
	pub wallet_id: String,

	/// Asset ticker, lowercase
	pub ticker: String,

	/// Chain the wallet lives on, lowercase
	pub chain: String,

	/// Token contract when this wallet holds a token, `None` for the chain's
	/// native asset
	pub token_contract_address: Option<String>,

	/// Decimals of the asset's smallest unit
	pub decimals: u8,
}

impl WalletRef {
	pub fn new(wallet_id: &str, ticker: &str, chain: &str, decimals: u8) -> Self {
		Self {
			wallet_id: wallet_id.to_string(),
			ticker: ticker.trim().to_lowercase(),
			chain: chain.trim().to_lowercase(),
			token_contract_address: None,
			decimals,
		}
	}

	pub fn with_token_address(mut self, address: &str) -> Self {
		self.token_contract_address = Some(address.to_string());
		self
	}

	pub fn is_token(&self) -> bool {
		self.token_contract_address.is_some()
	}

	pub fn coin_key(&self) -> CoinKey {
		CoinKey::new(&self.ticker, &self.chain)
	}
}

/// Failures the wallet collaborator reports back.
///
/// Credential and denial variants are retryable by re-prompting;
/// `TransportLost` feeds the hardware reconnect path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
	#[error("Wrong credential supplied")]
	WrongCredential,

	#[error("User denied the transaction")]
	UserDenied,

	#[error("Biometric check failed")]
	BiometricFailure,

	#[error("Hardware transport lost during operation")]
	TransportLost,

	#[error("Insufficient funds for transaction")]
	InsufficientFunds,

	#[error("Wallet operation failed: {reason}")]
	Other { reason: String },
}

impl WalletError {
	pub fn other(reason: impl Into<String>) -> Self {
		WalletError::Other {
			reason: reason.into(),
		}
	}
}

/// Result of a successful sign-and-broadcast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BroadcastedTx {
	pub tx_hash: String,
}

/// Wallet subsystem the engine calls into.
///
/// All operations suspend the calling flow; none of them may block.
#[async_trait]
pub trait WalletProvider: Send + Sync + Debug {
	/// Receive address for the wallet, in the wallet's own address format
	async fn derive_receive_address(&self, wallet: &WalletRef) -> WalletResult<String>;

	/// Fee rate for the given confirmation-speed level, per kilobyte in
	/// smallest units
	async fn estimate_fee_rate(&self, wallet: &WalletRef, level: FeeLevel) -> WalletResult<u64>;

	/// Exact spendable-after-fee figure for "send everything"
	async fn estimate_max_spendable(
		&self,
		wallet: &WalletRef,
		fee_rate_per_kb: Option<u64>,
	) -> WalletResult<MaxSpendInfo>;

	/// Turn a builder spec into a funded proposal
	async fn create_transaction_proposal(
		&self,
		wallet: &WalletRef,
		spec: ProposalSpec,
	) -> WalletResult<TransactionProposal>;

	/// Sign and broadcast a funded proposal, optionally through a hardware
	/// transport
	async fn sign_and_broadcast(
		&self,
		proposal: &TransactionProposal,
		transport: Option<Arc<dyn HardwareTransport>>,
	) -> WalletResult<BroadcastedTx>;

	/// Confirmed balance in smallest units
	async fn query_balance(&self, wallet: &WalletRef) -> WalletResult<u64>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_wallet_ref_normalizes() {
		let w = WalletRef::new("w-1", "USDC", "ETH", 6).with_token_address("0xa0b8...");
		assert_eq!(w.ticker, "usdc");
		assert_eq!(w.coin_key(), CoinKey::new("usdc", "eth"));
		assert!(w.is_token());
	}

	#[test]
	fn test_wallet_error_messages() {
		assert_eq!(
			WalletError::WrongCredential.to_string(),
			"Wrong credential supplied"
		);
		assert_eq!(
			WalletError::other("broadcast refused").to_string(),
			"Wallet operation failed: broadcast refused"
		);
	}
}
