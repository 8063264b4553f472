//! Concurrent provider fan-out.
//!
//! Every aggregation round talks to all providers at once and settles every
//! task, success or failure, so one slow or broken provider can never sink a
//! round. Each task gets a per-provider deadline; the round as a whole gets a
//! global one.

use futures::future::join_all;
use std::future::Future;
use std::time::Duration;
use swapflow_types::adapters::{AdapterError, AdapterFailureKind, AdapterResult};
use swapflow_types::constants::{DEFAULT_GLOBAL_TIMEOUT_MS, DEFAULT_PROVIDER_TIMEOUT_MS};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Deadlines applied to a fan-out round
#[derive(Debug, Clone, Copy)]
pub struct FanoutConfig {
	/// Budget for each individual provider task, in milliseconds
	pub per_provider_timeout_ms: u64,

	/// Budget for the whole round, in milliseconds
	pub global_timeout_ms: u64,
}

impl Default for FanoutConfig {
	fn default() -> Self {
		Self {
			per_provider_timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
			global_timeout_ms: DEFAULT_GLOBAL_TIMEOUT_MS,
		}
	}
}

/// Why a provider task produced no value
#[derive(Debug, Error)]
pub enum ProviderFailure {
	#[error("provider did not answer within {timeout_ms}ms")]
	TimedOut { timeout_ms: u64 },

	#[error(transparent)]
	Adapter(#[from] AdapterError),

	#[error("provider task failed: {reason}")]
	Task { reason: String },
}

impl ProviderFailure {
	/// Coarse classification used by aggregation layers to branch on
	/// failure shape without matching provider-specific variants.
	pub fn failure_kind(&self) -> AdapterFailureKind {
		match self {
			ProviderFailure::TimedOut { .. } => AdapterFailureKind::ProviderUnavailable,
			ProviderFailure::Adapter(e) => e.failure_kind(),
			ProviderFailure::Task { .. } => AdapterFailureKind::InvalidResponse,
		}
	}
}

/// Settled result of one provider task
#[derive(Debug)]
pub struct ProviderOutcome<T> {
	pub provider_id: String,
	pub result: Result<T, ProviderFailure>,
}

impl<T> ProviderOutcome<T> {
	pub fn is_success(&self) -> bool {
		self.result.is_ok()
	}
}

/// Run every task concurrently and settle all of them.
///
/// Each task is spawned with its own per-provider deadline; the join across
/// all tasks runs under the global deadline. A task that misses its own
/// deadline settles as [`ProviderFailure::TimedOut`] without disturbing the
/// others. If the global deadline fires first, the stragglers are aborted and
/// every provider in the round settles as timed out.
pub async fn settle_all<T, F>(
	tasks: Vec<(String, F)>,
	config: &FanoutConfig,
) -> Vec<ProviderOutcome<T>>
where
	T: Send + 'static,
	F: Future<Output = AdapterResult<T>> + Send + 'static,
{
	if tasks.is_empty() {
		return Vec::new();
	}

	debug!("Fanning out to {} providers", tasks.len());

	let per_provider_timeout_ms = config.per_provider_timeout_ms;
	let per_provider = Duration::from_millis(per_provider_timeout_ms);
	let global = Duration::from_millis(config.global_timeout_ms);

	let mut ids = Vec::with_capacity(tasks.len());
	let mut handles = Vec::with_capacity(tasks.len());
	let mut abort_handles = Vec::with_capacity(tasks.len());

	for (provider_id, task) in tasks {
		ids.push(provider_id.clone());

		let handle = tokio::spawn(async move {
			let result = match timeout(per_provider, task).await {
				Ok(Ok(value)) => Ok(value),
				Ok(Err(e)) => Err(ProviderFailure::Adapter(e)),
				Err(_) => Err(ProviderFailure::TimedOut {
					timeout_ms: per_provider_timeout_ms,
				}),
			};
			ProviderOutcome {
				provider_id,
				result,
			}
		});
		abort_handles.push(handle.abort_handle());
		handles.push(handle);
	}

	match timeout(global, join_all(handles)).await {
		Ok(joined) => joined
			.into_iter()
			.zip(ids)
			.map(|(settled, provider_id)| match settled {
				Ok(outcome) => outcome,
				Err(e) => ProviderOutcome {
					provider_id,
					result: Err(ProviderFailure::Task {
						reason: e.to_string(),
					}),
				},
			})
			.collect(),
		Err(_) => {
			warn!(
				"Fan-out round exceeded the global budget of {}ms, settling all providers as timed out",
				config.global_timeout_ms
			);
			for abort_handle in abort_handles {
				abort_handle.abort();
			}
			ids.into_iter()
				.map(|provider_id| ProviderOutcome {
					provider_id,
					result: Err(ProviderFailure::TimedOut {
						timeout_ms: config.global_timeout_ms,
					}),
				})
				.collect()
		}
	}
}
