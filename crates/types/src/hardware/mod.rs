//! Hardware-wallet transport lifecycle
//!
//! The signing flow drives a small pairing machine and observes transport
//! loss through [`HardwareTransport::disconnected`], a future that resolves
//! when the link drops. No presentation state is involved; reconnect policy
//! lives with the signing coordinator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Physical transport family. Reconnects always stay within the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
	Bluetooth,
	Usb,
}

impl fmt::Display for TransportKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TransportKind::Bluetooth => write!(f, "bluetooth"),
			TransportKind::Usb => write!(f, "usb"),
		}
	}
}

/// Pairing failures, already translated into something a user can act on.
/// Raw transport errors never cross this boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HardwareError {
	#[error("Wrong device app open, expected {expected}")]
	WrongApp { expected: String },

	#[error("Unsupported device: {model}")]
	UnsupportedDevice { model: String },

	#[error("Device connection failed: {reason}")]
	Connection { reason: String },
}

/// An open link to a hardware signing device
#[async_trait]
pub trait HardwareTransport: Send + Sync + Debug {
	fn kind(&self) -> TransportKind;

	/// Ask the device to open the app required to sign for `app_name`.
	/// Must classify failures into [`HardwareError`] causes.
	async fn prepare_app(&self, app_name: &str) -> Result<(), HardwareError>;

	/// Resolves when the underlying link drops. The signing flow races
	/// pending operations against this.
	async fn disconnected(&self);
}

/// Factory for opening transports of one kind
#[async_trait]
pub trait HardwareConnector: Send + Sync + Debug {
	fn kind(&self) -> TransportKind;

	/// Open a transport, bounded by the two timeouts. `None` when no device
	/// answered in time.
	async fn create(
		&self,
		open_timeout: Duration,
		listen_timeout: Duration,
	) -> Option<Arc<dyn HardwareTransport>>;
}

/// Pairing progress of a hardware signing attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingStatus {
	Idle,
	SelectingApp,
	Sending,
	Complete,
	Disconnected,
}

impl fmt::Display for PairingStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PairingStatus::Idle => write!(f, "idle"),
			PairingStatus::SelectingApp => write!(f, "selecting_app"),
			PairingStatus::Sending => write!(f, "sending"),
			PairingStatus::Complete => write!(f, "complete"),
			PairingStatus::Disconnected => write!(f, "disconnected"),
		}
	}
}

/// Transport handle plus pairing progress, owned by the signing coordinator.
///
/// A disconnect can strike from any state: it drops the handle and parks the
/// machine in `Disconnected` until a reconnect attaches a fresh transport.
#[derive(Debug)]
pub struct HardwareTransportState {
	transport: Option<Arc<dyn HardwareTransport>>,
	pairing: PairingStatus,
}

impl HardwareTransportState {
	pub fn new() -> Self {
		Self {
			transport: None,
			pairing: PairingStatus::Idle,
		}
	}

	pub fn pairing(&self) -> PairingStatus {
		self.pairing
	}

	pub fn transport(&self) -> Option<Arc<dyn HardwareTransport>> {
		self.transport.clone()
	}

	pub fn has_transport(&self) -> bool {
		self.transport.is_some()
	}

	pub fn is_sending(&self) -> bool {
		self.pairing == PairingStatus::Sending
	}

	pub fn is_disconnected(&self) -> bool {
		self.pairing == PairingStatus::Disconnected
	}

	/// Attach a fresh transport (initial connect or reconnect). Leaves the
	/// pairing status alone; the caller decides where to resume.
	pub fn attach_transport(&mut self, transport: Arc<dyn HardwareTransport>) {
		self.transport = Some(transport);
	}

	pub fn begin_selecting(&mut self) {
		self.pairing = PairingStatus::SelectingApp;
	}

	pub fn begin_sending(&mut self) {
		self.pairing = PairingStatus::Sending;
	}

	pub fn mark_complete(&mut self) {
		self.pairing = PairingStatus::Complete;
	}

	/// Link dropped: park the machine and release the dead handle so no
	/// later operation can reach it.
	pub fn mark_disconnected(&mut self) {
		self.transport = None;
		self.pairing = PairingStatus::Disconnected;
	}
}

impl Default for HardwareTransportState {
	fn default() -> Self {
		Self::new()
	}
}
