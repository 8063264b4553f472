//! Error types for quote and route-selection operations

use crate::adapters::AdapterError;
use thiserror::Error;

/// Errors surfaced when a quote cannot produce a usable route
#[derive(Error, Debug)]
pub enum QuoteError {
	/// The quote's route data cannot be executed: no routes, no route
	/// matching the requested key, or a route without a destination.
	/// Retryable with a fresh quote.
	#[error("Quote unusable: {reason}")]
	QuoteUnusable { reason: String },

	#[error("Provider error: {0}")]
	Adapter(#[from] AdapterError),
}

impl QuoteError {
	pub fn unusable(reason: impl Into<String>) -> Self {
		QuoteError::QuoteUnusable {
			reason: reason.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_unusable_message() {
		let err = QuoteError::unusable("no routes in quote response");
		assert_eq!(
			err.to_string(),
			"Quote unusable: no routes in quote response"
		);
	}

	#[test]
	fn test_adapter_error_passes_through() {
		let err: QuoteError = AdapterError::InvalidResponse {
			reason: "truncated body".to_string(),
		}
		.into();
		assert!(err.to_string().contains("truncated body"));
	}
}
