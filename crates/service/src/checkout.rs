//! Time-boxed checkout sessions.
//!
//! A checkout binds a funded proposal to a selected route for as long as the
//! provider's price holds. Every session carries an expiry: the provider's
//! own when it gave a sane one, otherwise a default window. A countdown task
//! ticks the remaining time out to subscribers and expires the session
//! exactly once; aborting or completing the session stops the task on every
//! path, including drop.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use swapflow_types::adapters::ProviderTxPayload;
use swapflow_types::constants::{COUNTDOWN_TICK_MS, DEFAULT_EXPIRY_WINDOW_SECS};
use swapflow_types::quotes::QuoteRequest;
use swapflow_types::routes::Route;
use swapflow_types::sessions::{
	CheckoutSession, ExpiryFallbackReason, ExpirySource, SessionError, SessionStatus,
};
use swapflow_types::transactions::TransactionProposal;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Checkout behavior knobs
#[derive(Debug, Clone, Copy)]
pub struct CheckoutConfig {
	/// Window substituted when the provider expiry is missing or unusable,
	/// in seconds
	pub default_expiry_secs: u64,
}

impl Default for CheckoutConfig {
	fn default() -> Self {
		Self {
			default_expiry_secs: DEFAULT_EXPIRY_WINDOW_SECS,
		}
	}
}

/// Opens checkout sessions with a resolved expiry and a running countdown.
#[derive(Debug, Clone, Default)]
pub struct CheckoutService {
	config: CheckoutConfig,
}

impl CheckoutService {
	pub fn new(config: CheckoutConfig) -> Self {
		Self { config }
	}

	/// Open a session for a funded proposal on a selected route.
	///
	/// The payload expiry wins over the route expiry when both exist, since
	/// deposit-style providers only reveal the binding deadline at
	/// transaction-creation time.
	pub fn open(
		&self,
		proposal: TransactionProposal,
		route: Route,
		request: QuoteRequest,
		payload: ProviderTxPayload,
	) -> SessionHandle {
		let now = Utc::now();
		let provider_expiry = payload.expiry.or(route.expiry);
		let window = chrono::Duration::seconds(self.config.default_expiry_secs as i64);
		let (expires_at, source) = CheckoutSession::resolve_expiry(provider_expiry, now, window);

		match source {
			ExpirySource::Provider => {
				debug!("Checkout honors the provider expiry {}", expires_at);
			}
			ExpirySource::DefaultWindow { reason } => match reason {
				ExpiryFallbackReason::Missing => info!(
					"Route carried no expiry; substituting a {}s window ending {}",
					self.config.default_expiry_secs, expires_at
				),
				ExpiryFallbackReason::TooFarAhead => warn!(
					"Provider expiry {:?} is implausibly far ahead; clamping to {}",
					provider_expiry, expires_at
				),
				ExpiryFallbackReason::AlreadyPassed => warn!(
					"Provider expiry {:?} already passed; substituting a window ending {}",
					provider_expiry, expires_at
				),
			},
		}

		let session = CheckoutSession::new(proposal, route, expires_at, source);
		info!(
			"Opened checkout session {} expiring {}",
			session.session_id, expires_at
		);
		SessionHandle::spawn(session, request, payload)
	}
}

/// One tick of a session countdown
#[derive(Debug, Clone)]
pub struct CountdownSnapshot {
	pub remaining: Duration,

	/// Display label, `mm:ss` while running and `expired` after
	pub label: String,

	pub status: SessionStatus,
}

/// Live handle to an open checkout session.
///
/// Owns the countdown task; dropping the handle stops the task.
#[derive(Debug)]
pub struct SessionHandle {
	session_id: String,
	session: Arc<RwLock<CheckoutSession>>,
	request: QuoteRequest,
	payload: ProviderTxPayload,
	deadline: Instant,
	countdown_tx: Arc<watch::Sender<CountdownSnapshot>>,
	timer: JoinHandle<()>,
}

impl SessionHandle {
	fn spawn(session: CheckoutSession, request: QuoteRequest, payload: ProviderTxPayload) -> Self {
		let session_id = session.session_id.clone();
		let remaining = session
			.remaining(Utc::now())
			.to_std()
			.unwrap_or(Duration::ZERO);

		// The countdown runs on the runtime clock. Anchoring the deadline
		// here keeps it consistent with the wall-clock expiry instant the
		// session stores.
		let deadline = Instant::now() + remaining;

		let (tx, _) = watch::channel(CountdownSnapshot {
			remaining,
			label: countdown_label(remaining),
			status: session.status,
		});
		let countdown_tx = Arc::new(tx);

		let session = Arc::new(RwLock::new(session));
		let timer = tokio::spawn(run_countdown(
			Arc::clone(&session),
			session_id.clone(),
			deadline,
			Arc::clone(&countdown_tx),
		));

		Self {
			session_id,
			session,
			request,
			payload,
			deadline,
			countdown_tx,
			timer,
		}
	}

	pub fn session_id(&self) -> &str {
		&self.session_id
	}

	pub async fn status(&self) -> SessionStatus {
		self.session.read().await.status
	}

	/// Cloned-out view of the session state
	pub async fn session(&self) -> CheckoutSession {
		self.session.read().await.clone()
	}

	pub async fn proposal(&self) -> TransactionProposal {
		self.session.read().await.proposal.clone()
	}

	pub fn request(&self) -> &QuoteRequest {
		&self.request
	}

	pub fn payload(&self) -> &ProviderTxPayload {
		&self.payload
	}

	/// Subscribe to countdown ticks. The current snapshot is observable
	/// immediately.
	pub fn subscribe(&self) -> watch::Receiver<CountdownSnapshot> {
		self.countdown_tx.subscribe()
	}

	pub fn countdown(&self) -> CountdownSnapshot {
		self.countdown_tx.borrow().clone()
	}

	/// Wall-clock signability check, run immediately before signing
	pub async fn ensure_signable(&self) -> Result<(), SessionError> {
		self.session.read().await.ensure_signable(Utc::now())
	}

	/// Abort the session. Returns false when it already reached a terminal
	/// state.
	pub async fn abort(&self) -> bool {
		let aborted = self.session.write().await.abort();
		if aborted {
			info!("Checkout session {} aborted", self.session_id);
			self.finish(SessionStatus::Aborted);
		}
		aborted
	}

	/// Mark the session completed after a successful broadcast. Returns
	/// false when it already reached a terminal state.
	pub(crate) async fn complete(&self) -> bool {
		let completed = self.session.write().await.complete();
		if completed {
			debug!("Checkout session {} completed", self.session_id);
			self.finish(SessionStatus::Completed);
		}
		completed
	}

	fn finish(&self, status: SessionStatus) {
		self.timer.abort();
		let remaining = self.deadline.saturating_duration_since(Instant::now());
		self.countdown_tx.send_replace(CountdownSnapshot {
			remaining,
			label: countdown_label(remaining),
			status,
		});
	}
}

impl Drop for SessionHandle {
	fn drop(&mut self) {
		self.timer.abort();
	}
}

async fn run_countdown(
	session: Arc<RwLock<CheckoutSession>>,
	session_id: String,
	deadline: Instant,
	tx: Arc<watch::Sender<CountdownSnapshot>>,
) {
	let mut ticker = interval(Duration::from_millis(COUNTDOWN_TICK_MS));
	ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

	loop {
		ticker.tick().await;

		let status = session.read().await.status;
		if status.is_terminal() {
			break;
		}

		if Instant::now() >= deadline {
			// The write lock arbitrates racing paths; only one caller ever
			// sees the Active -> Expired transition.
			let expired = session.write().await.expire();
			if expired {
				info!("Checkout session {} expired", session_id);
			}
			tx.send_replace(CountdownSnapshot {
				remaining: Duration::ZERO,
				label: "expired".to_string(),
				status: SessionStatus::Expired,
			});
			break;
		}

		let remaining = deadline.saturating_duration_since(Instant::now());
		tx.send_replace(CountdownSnapshot {
			remaining,
			label: countdown_label(remaining),
			status,
		});
	}
}

// Rounds up, so a freshly opened 5s window reads 00:05, not 00:04
fn countdown_label(remaining: Duration) -> String {
	let mut secs = remaining.as_secs();
	if remaining.subsec_nanos() > 0 {
		secs += 1;
	}
	format!("{:02}:{:02}", secs / 60, secs % 60)
}
