//! Checkout session state machine
//!
//! Pure state and time arithmetic only; the ticking timer that drives
//! `Active -> Expired` lives with the checkout service. Terminal states are
//! irreversible, and signing is gated here so an expired or aborted session
//! fails fast before any wallet call.

use crate::routes::Route;
use crate::transactions::TransactionProposal;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle of one checkout attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
	Active,
	Expired,
	Completed,
	Aborted,
}

impl SessionStatus {
	pub fn is_terminal(&self) -> bool {
		*self != SessionStatus::Active
	}
}

impl fmt::Display for SessionStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SessionStatus::Active => write!(f, "active"),
			SessionStatus::Expired => write!(f, "expired"),
			SessionStatus::Completed => write!(f, "completed"),
			SessionStatus::Aborted => write!(f, "aborted"),
		}
	}
}

/// Why the default checkout window replaced a provider expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryFallbackReason {
	/// The route carried no expiry at all
	Missing,
	/// The provider expiry sat beyond the recommended window
	TooFarAhead,
	/// The provider expiry was already in the past
	AlreadyPassed,
}

/// Where a session's expiry instant came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpirySource {
	Provider,
	DefaultWindow { reason: ExpiryFallbackReason },
}

/// Attempting to sign a session that can no longer be signed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
	#[error("Session expired: a fresh quote is required")]
	Expired,

	#[error("Session was aborted")]
	Aborted,

	#[error("Session already completed")]
	AlreadyCompleted,
}

/// One swap attempt from route acceptance to completion/expiry.
///
/// At most one active session exists per checkout flow; the proposal and
/// route are frozen at acceptance and a changed amount or route means a new
/// session, never a mutated one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
	pub session_id: String,
	pub proposal: TransactionProposal,
	pub route: Route,
	pub expires_at: DateTime<Utc>,
	pub expiry_source: ExpirySource,
	pub status: SessionStatus,
	pub created_at: DateTime<Utc>,
}

impl CheckoutSession {
	pub fn new(
		proposal: TransactionProposal,
		route: Route,
		expires_at: DateTime<Utc>,
		expiry_source: ExpirySource,
	) -> Self {
		Self {
			session_id: Uuid::new_v4().to_string(),
			proposal,
			route,
			expires_at,
			expiry_source,
			status: SessionStatus::Active,
			created_at: Utc::now(),
		}
	}

	/// Pick the session expiry from a route's expiry, substituting the
	/// default window for missing, already-past and beyond-window values.
	/// The caller logs the substitution reason.
	pub fn resolve_expiry(
		provider_expiry: Option<DateTime<Utc>>,
		now: DateTime<Utc>,
		default_window: Duration,
	) -> (DateTime<Utc>, ExpirySource) {
		let fallback = now + default_window;
		match provider_expiry {
			None => (
				fallback,
				ExpirySource::DefaultWindow {
					reason: ExpiryFallbackReason::Missing,
				},
			),
			Some(expiry) if expiry <= now => (
				fallback,
				ExpirySource::DefaultWindow {
					reason: ExpiryFallbackReason::AlreadyPassed,
				},
			),
			Some(expiry) if expiry > fallback => (
				fallback,
				ExpirySource::DefaultWindow {
					reason: ExpiryFallbackReason::TooFarAhead,
				},
			),
			Some(expiry) => (expiry, ExpirySource::Provider),
		}
	}

	pub fn is_active(&self) -> bool {
		self.status == SessionStatus::Active
	}

	/// Time left before expiry, floored at zero
	pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
		(self.expires_at - now).max(Duration::zero())
	}

	/// Countdown label: "mm:ss" while time remains, "expired" afterwards
	pub fn countdown_label(&self, now: DateTime<Utc>) -> String {
		if now > self.expires_at {
			return "expired".to_string();
		}
		let secs = self.remaining(now).num_seconds();
		format!("{:02}:{:02}", secs / 60, secs % 60)
	}

	/// Time-triggered transition. Returns true only on the one call that
	/// actually moved the session out of `Active`.
	pub fn expire(&mut self) -> bool {
		if self.status == SessionStatus::Active {
			self.status = SessionStatus::Expired;
			return true;
		}
		false
	}

	/// Signing succeeded
	pub fn complete(&mut self) -> bool {
		if self.status == SessionStatus::Active {
			self.status = SessionStatus::Completed;
			return true;
		}
		false
	}

	/// User or system cancel
	pub fn abort(&mut self) -> bool {
		if self.status == SessionStatus::Active {
			self.status = SessionStatus::Aborted;
			return true;
		}
		false
	}

	/// Gate every signing attempt. Checks the wall clock as well as the
	/// status so a sign racing the expiry tick still fails fast.
	pub fn ensure_signable(&self, now: DateTime<Utc>) -> Result<(), SessionError> {
		match self.status {
			SessionStatus::Active if now >= self.expires_at => Err(SessionError::Expired),
			SessionStatus::Active => Ok(()),
			SessionStatus::Expired => Err(SessionError::Expired),
			SessionStatus::Aborted => Err(SessionError::Aborted),
			SessionStatus::Completed => Err(SessionError::AlreadyCompleted),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::transactions::{ProposalMetadata, ProposalSpec};
	use crate::wallet::WalletRef;

	fn proposal() -> TransactionProposal {
		let spec = ProposalSpec::new("0xdest", 1_000, ProposalMetadata::new("thorswap", "q-1"));
		TransactionProposal::from_spec(WalletRef::new("w-1", "eth", "eth", 18), spec, 21_000)
	}

	fn session(expires_in_secs: i64) -> CheckoutSession {
		CheckoutSession::new(
			proposal(),
			Route::new("THORCHAIN", 1.0),
			Utc::now() + Duration::seconds(expires_in_secs),
			ExpirySource::Provider,
		)
	}

	#[test]
	fn test_resolve_expiry_provider_value_kept() {
		let now = Utc::now();
		let provider = now + Duration::seconds(300);
		let (expiry, source) =
			CheckoutSession::resolve_expiry(Some(provider), now, Duration::minutes(10));
		assert_eq!(expiry, provider);
		assert_eq!(source, ExpirySource::Provider);
	}

	#[test]
	fn test_resolve_expiry_substitutions() {
		let now = Utc::now();
		let window = Duration::minutes(10);

		let (expiry, source) = CheckoutSession::resolve_expiry(None, now, window);
		assert_eq!(expiry, now + window);
		assert_eq!(
			source,
			ExpirySource::DefaultWindow {
				reason: ExpiryFallbackReason::Missing
			}
		);

		let (_, source) =
			CheckoutSession::resolve_expiry(Some(now - Duration::seconds(1)), now, window);
		assert_eq!(
			source,
			ExpirySource::DefaultWindow {
				reason: ExpiryFallbackReason::AlreadyPassed
			}
		);

		let (expiry, source) =
			CheckoutSession::resolve_expiry(Some(now + Duration::hours(2)), now, window);
		assert_eq!(expiry, now + window);
		assert_eq!(
			source,
			ExpirySource::DefaultWindow {
				reason: ExpiryFallbackReason::TooFarAhead
			}
		);
	}

	#[test]
	fn test_terminal_states_are_irreversible() {
		let mut s = session(60);
		assert!(s.expire());
		assert!(!s.expire(), "expired exactly once");
		assert!(!s.complete());
		assert!(!s.abort());
		assert_eq!(s.status, SessionStatus::Expired);

		let mut s = session(60);
		assert!(s.complete());
		assert!(!s.expire());
		assert_eq!(s.status, SessionStatus::Completed);
	}

	#[test]
	fn test_countdown_labels() {
		let s = session(300);
		let label = s.countdown_label(s.expires_at - Duration::seconds(300));
		assert_eq!(label, "05:00");

		let label = s.countdown_label(s.expires_at - Duration::seconds(9));
		assert_eq!(label, "00:09");

		let label = s.countdown_label(s.expires_at + Duration::seconds(1));
		assert_eq!(label, "expired");
	}

	#[test]
	fn test_remaining_floors_at_zero() {
		let s = session(5);
		assert_eq!(
			s.remaining(s.expires_at + Duration::seconds(30)),
			Duration::zero()
		);
	}

	#[test]
	fn test_ensure_signable_gates() {
		let s = session(60);
		assert!(s.ensure_signable(Utc::now()).is_ok());

		// Wall clock past expiry fails even before the tick flips the status
		assert_eq!(
			s.ensure_signable(s.expires_at + Duration::seconds(1)),
			Err(SessionError::Expired)
		);

		let mut s = session(60);
		s.abort();
		assert_eq!(s.ensure_signable(Utc::now()), Err(SessionError::Aborted));

		let mut s = session(60);
		s.complete();
		assert_eq!(
			s.ensure_signable(Utc::now()),
			Err(SessionError::AlreadyCompleted)
		);
	}
}
