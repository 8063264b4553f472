//! Signing coordination for checkout sessions.
//!
//! Drives the wallet through signing and broadcast, with or without a
//! hardware device in the loop. Hardware signing races the wallet call
//! against transport loss and retries the connection a bounded number of
//! times; the session itself is never failed by a dead cable, only by its
//! own clock. After a successful broadcast the provider is told exactly once
//! and the swap is recorded, whatever the provider says.

use crate::checkout::SessionHandle;
use crate::directory::ProviderDirectory;
use std::sync::Arc;
use std::time::Duration;
use swapflow_adapters::AdapterRegistry;
use swapflow_types::adapters::{BroadcastReport, ProviderRuntimeConfig, ProviderTxPayload};
use swapflow_types::constants::{
	DEFAULT_HARDWARE_LISTEN_TIMEOUT_MS, DEFAULT_HARDWARE_OPEN_TIMEOUT_MS,
	HARDWARE_RECONNECT_ATTEMPTS,
};
use swapflow_types::hardware::{
	HardwareConnector, HardwareError, HardwareTransport, HardwareTransportState,
};
use swapflow_types::quotes::QuoteRequest;
use swapflow_types::records::{SwapRecord, SwapStatus};
use swapflow_types::routes::Route;
use swapflow_types::sessions::SessionError;
use swapflow_types::storage::SwapStorage;
use swapflow_types::transactions::TransactionProposal;
use swapflow_types::wallet::{BroadcastedTx, WalletError, WalletProvider};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Signing failures, classified for the caller to present and retry on
#[derive(Debug, Error)]
pub enum SigningError {
	#[error("Wrong wallet credential")]
	WrongCredential,

	#[error("User declined the signing request")]
	UserDenied,

	#[error("Biometric check failed")]
	BiometricFailure,

	#[error("Hardware device disconnected; {attempts} reconnect attempts failed")]
	HardwareDisconnected { attempts: u32 },

	#[error("Hardware error: {0}")]
	Hardware(#[from] HardwareError),

	#[error("Wallet error: {reason}")]
	Wallet { reason: String },

	#[error(transparent)]
	Session(#[from] SessionError),
}

/// Hardware-signing knobs
#[derive(Debug, Clone, Copy)]
pub struct SigningConfig {
	/// Reconnect attempts after a transport loss, within one signing flow
	pub reconnect_attempts: u32,

	/// Budget for opening a device connection
	pub open_timeout: Duration,

	/// Budget for the device to start answering once open
	pub listen_timeout: Duration,
}

impl Default for SigningConfig {
	fn default() -> Self {
		Self {
			reconnect_attempts: HARDWARE_RECONNECT_ATTEMPTS,
			open_timeout: Duration::from_millis(DEFAULT_HARDWARE_OPEN_TIMEOUT_MS),
			listen_timeout: Duration::from_millis(DEFAULT_HARDWARE_LISTEN_TIMEOUT_MS),
		}
	}
}

/// Coordinates signing, broadcast, provider reporting and record keeping
/// for one engine instance.
pub struct SigningCoordinator {
	wallet: Arc<dyn WalletProvider>,
	registry: Arc<AdapterRegistry>,
	directory: Arc<ProviderDirectory>,
	storage: Arc<dyn SwapStorage>,
	config: SigningConfig,
}

impl SigningCoordinator {
	pub fn new(
		wallet: Arc<dyn WalletProvider>,
		registry: Arc<AdapterRegistry>,
		directory: Arc<ProviderDirectory>,
		storage: Arc<dyn SwapStorage>,
	) -> Self {
		Self {
			wallet,
			registry,
			directory,
			storage,
			config: SigningConfig::default(),
		}
	}

	pub fn with_config(mut self, config: SigningConfig) -> Self {
		self.config = config;
		self
	}

	/// Sign and broadcast with the wallet's own key material.
	///
	/// A failure leaves the session untouched, so the user can retry while
	/// the checkout window holds.
	pub async fn sign_direct(&self, handle: &SessionHandle) -> Result<SwapRecord, SigningError> {
		handle.ensure_signable().await?;
		let proposal = handle.proposal().await;

		match self.wallet.sign_and_broadcast(&proposal, None).await {
			Ok(tx) => self.finalize(handle, &proposal, tx).await,
			Err(e) => Err(classify_wallet_error(e)),
		}
	}

	/// Sign and broadcast through a hardware device.
	///
	/// The wallet call races transport loss; a lost link is retried with a
	/// fresh same-kind connection up to the configured attempt budget.
	/// Running out of attempts fails the signing flow but not the session.
	pub async fn sign_with_hardware(
		&self,
		handle: &SessionHandle,
		connector: Arc<dyn HardwareConnector>,
	) -> Result<SwapRecord, SigningError> {
		handle.ensure_signable().await?;
		let proposal = handle.proposal().await;
		let app = device_app_for_chain(&proposal.source_wallet.chain);

		let mut state = HardwareTransportState::new();
		let Some(transport) = self.open_transport(connector.as_ref()).await else {
			return Err(SigningError::Hardware(HardwareError::Connection {
				reason: format!("no {} device answered", connector.kind()),
			}));
		};
		self.prepare(&mut state, transport, &app).await?;

		let mut attempts_used = 0u32;
		loop {
			handle.ensure_signable().await?;
			let Some(transport) = state.transport() else {
				return Err(SigningError::Hardware(HardwareError::Connection {
					reason: "no transport attached".to_string(),
				}));
			};

			let outcome = tokio::select! {
				result = self.wallet.sign_and_broadcast(&proposal, Some(Arc::clone(&transport))) => {
					Some(result)
				}
				_ = transport.disconnected() => None,
			};

			match outcome {
				Some(Ok(tx)) => {
					state.mark_complete();
					return self.finalize(handle, &proposal, tx).await;
				}
				Some(Err(WalletError::TransportLost)) | None => {
					state.mark_disconnected();
					warn!("Hardware transport lost while signing session {}", handle.session_id());
				}
				Some(Err(e)) => return Err(classify_wallet_error(e)),
			}

			let mut replacement = None;
			while attempts_used < self.config.reconnect_attempts {
				attempts_used += 1;
				info!(
					"Reconnecting {} device, attempt {}/{}",
					connector.kind(),
					attempts_used,
					self.config.reconnect_attempts
				);
				if let Some(transport) = self.open_transport(connector.as_ref()).await {
					replacement = Some(transport);
					break;
				}
			}

			match replacement {
				Some(transport) => self.prepare(&mut state, transport, &app).await?,
				None => {
					// The session keeps running; a fresh connection attempt
					// can pick it up while the checkout window holds.
					return Err(SigningError::HardwareDisconnected {
						attempts: self.config.reconnect_attempts,
					});
				}
			}
		}
	}

	async fn open_transport(
		&self,
		connector: &dyn HardwareConnector,
	) -> Option<Arc<dyn HardwareTransport>> {
		connector
			.create(self.config.open_timeout, self.config.listen_timeout)
			.await
	}

	/// Attach a transport and walk it to the sending state
	async fn prepare(
		&self,
		state: &mut HardwareTransportState,
		transport: Arc<dyn HardwareTransport>,
		app: &str,
	) -> Result<(), SigningError> {
		state.attach_transport(Arc::clone(&transport));
		state.begin_selecting();
		transport.prepare_app(app).await?;
		state.begin_sending();
		Ok(())
	}

	/// Post-broadcast bookkeeping: close the session, tell the provider
	/// once, record the swap.
	async fn finalize(
		&self,
		handle: &SessionHandle,
		proposal: &TransactionProposal,
		tx: BroadcastedTx,
	) -> Result<SwapRecord, SigningError> {
		info!(
			"Broadcast {} for session {}",
			tx.tx_hash,
			handle.session_id()
		);
		if !handle.complete().await {
			warn!(
				"Session {} reached a terminal state while broadcasting; keeping the on-chain result",
				handle.session_id()
			);
		}

		let session = handle.session().await;
		let status = self
			.report_broadcast_once(proposal, handle.request(), &tx)
			.await;

		let record = build_record(
			&session.route,
			proposal,
			handle.request(),
			handle.payload(),
			&tx,
			status,
		);
		if let Err(e) = self.storage.add_record(record.clone()).await {
			warn!("Failed to persist swap record {}: {}", record.order_id, e);
		}
		Ok(record)
	}

	/// Tell the provider about the broadcast. Runs once per broadcast; a
	/// failure is logged and absorbed, because the transaction is already
	/// on-chain and must never look unsent.
	async fn report_broadcast_once(
		&self,
		proposal: &TransactionProposal,
		request: &QuoteRequest,
		tx: &BroadcastedTx,
	) -> SwapStatus {
		let metadata = &proposal.metadata;
		let mut report = BroadcastReport::new(&metadata.quote_id, &tx.tx_hash, request.amount);
		if let Some(key) = &metadata.routing_key {
			report = report.with_routing_key(key);
		}

		let Some(provider) = self.directory.get(&metadata.provider_id).await else {
			warn!(
				"Provider {} is gone from the directory; keeping local broadcast status",
				metadata.provider_id
			);
			return SwapStatus::Broadcast;
		};
		let Some(adapter) = self.registry.get(&provider.adapter_id) else {
			warn!(
				"Provider {} references unknown adapter {}; keeping local broadcast status",
				provider.provider_id, provider.adapter_id
			);
			return SwapStatus::Broadcast;
		};

		let config = ProviderRuntimeConfig::from(&provider);
		match adapter.report_broadcast(&report, &config).await {
			Ok(status) => {
				debug!(
					"Provider {} acknowledged broadcast {} with status {:?}",
					metadata.provider_id, tx.tx_hash, status
				);
				status
			}
			Err(e) => {
				warn!(
					"Broadcast report to {} failed, keeping local status: {}",
					metadata.provider_id, e
				);
				SwapStatus::Broadcast
			}
		}
	}
}

impl std::fmt::Debug for SigningCoordinator {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SigningCoordinator")
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

fn classify_wallet_error(e: WalletError) -> SigningError {
	match e {
		WalletError::WrongCredential => SigningError::WrongCredential,
		WalletError::UserDenied => SigningError::UserDenied,
		WalletError::BiometricFailure => SigningError::BiometricFailure,
		WalletError::TransportLost => SigningError::Hardware(HardwareError::Connection {
			reason: "transport lost".to_string(),
		}),
		e @ (WalletError::InsufficientFunds | WalletError::Other { .. }) => SigningError::Wallet {
			reason: e.to_string(),
		},
	}
}

/// Device app that signs for the chain
fn device_app_for_chain(chain: &str) -> String {
	match chain {
		"btc" => "Bitcoin".to_string(),
		"bch" => "Bitcoin Cash".to_string(),
		"eth" => "Ethereum".to_string(),
		"matic" => "Polygon".to_string(),
		"ltc" => "Litecoin".to_string(),
		"doge" => "Dogecoin".to_string(),
		"xrp" => "XRP".to_string(),
		other => {
			let mut chars = other.chars();
			match chars.next() {
				Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
				None => String::new(),
			}
		}
	}
}

fn build_record(
	route: &Route,
	proposal: &TransactionProposal,
	request: &QuoteRequest,
	payload: &ProviderTxPayload,
	tx: &BroadcastedTx,
	status: SwapStatus,
) -> SwapRecord {
	let metadata = &proposal.metadata;
	let mut record = SwapRecord::new(
		&metadata.provider_id,
		&metadata.quote_id,
		&request.from.ticker,
		&request.from.chain,
		request.amount,
		&request.to.ticker,
		&request.to.chain,
		route.expected_output,
		&request.recipient_address,
		&proposal.destination_address,
		&tx.tx_hash,
	)
	.with_slippage(request.slippage_or_default())
	.with_total_provider_fee(route.fees.total_fee)
	.with_status(status);

	if let Some(key) = &metadata.routing_key {
		record = record.with_routing_key(key);
	}
	if let Some(extra_id) = &payload.payin_extra_id {
		record = record.with_payin_extra_id(extra_id);
	}
	record
}
