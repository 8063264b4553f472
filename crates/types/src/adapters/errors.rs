//! Error types for adapter operations

use thiserror::Error;

/// Validation errors for adapter descriptors
#[derive(Error, Debug)]
pub enum AdapterValidationError {
	#[error("Invalid adapter ID: {adapter_id}")]
	InvalidAdapterId { adapter_id: String },

	#[error("Invalid version format: {version}")]
	InvalidVersion { version: String },

	#[error("Missing required field: {field}")]
	MissingRequiredField { field: String },
}

/// Errors from adapter registry operations
#[derive(Error, Debug)]
pub enum AdapterRegistryError {
	#[error("Adapter already registered: {adapter_id}")]
	DuplicateAdapter { adapter_id: String },

	#[error("Adapter validation failed: {0}")]
	Validation(#[from] AdapterValidationError),

	#[error("Adapter initialization failed: {0}")]
	Initialization(#[from] AdapterError),
}

/// How a failed adapter call should be treated by the aggregation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterFailureKind {
	/// Network/HTTP trouble reaching the provider. The provider sits out the
	/// current round; nothing else fails.
	ProviderUnavailable,
	/// The provider explicitly refuses the trading pair. Actionable by the
	/// user, not transient.
	PairDisabled,
	/// The provider answered with something the adapter cannot use.
	InvalidResponse,
}

/// Adapter operation errors
#[derive(Error, Debug)]
pub enum AdapterError {
	#[error("HTTP request failed: {0}")]
	Http(#[from] reqwest::Error),

	#[error("HTTP {status}: {body}")]
	HttpStatus { status: u16, body: String },

	#[error("Timeout occurred after {timeout_ms}ms")]
	Timeout { timeout_ms: u64 },

	#[error("Invalid response format: {reason}")]
	InvalidResponse { reason: String },

	#[error("Pair {pair} not traded: {reason}")]
	PairDisabled { pair: String, reason: String },

	#[error("Operation {operation} not supported by adapter {adapter_id}")]
	UnsupportedOperation {
		adapter_id: String,
		operation: String,
	},

	#[error("Invalid adapter configuration: {reason}")]
	InvalidConfiguration { reason: String },

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

impl AdapterError {
	pub fn invalid_response(reason: impl Into<String>) -> Self {
		AdapterError::InvalidResponse {
			reason: reason.into(),
		}
	}

	pub fn pair_disabled(pair: impl Into<String>, reason: impl Into<String>) -> Self {
		AdapterError::PairDisabled {
			pair: pair.into(),
			reason: reason.into(),
		}
	}

	pub fn unsupported(adapter_id: impl Into<String>, operation: impl Into<String>) -> Self {
		AdapterError::UnsupportedOperation {
			adapter_id: adapter_id.into(),
			operation: operation.into(),
		}
	}

	pub fn http_status(status: u16, body: impl Into<String>) -> Self {
		AdapterError::HttpStatus {
			status,
			body: body.into(),
		}
	}

	/// HTTP status carried by this error, when there is one
	pub fn status_code(&self) -> Option<u16> {
		match self {
			AdapterError::HttpStatus { status, .. } => Some(*status),
			AdapterError::Http(e) => e.status().map(|s| s.as_u16()),
			_ => None,
		}
	}

	/// Classify this failure for the aggregation layer.
	///
	/// Every adapter failure lands in exactly one of the three kinds; callers
	/// branch on the kind, never on concrete variants.
	pub fn failure_kind(&self) -> AdapterFailureKind {
		match self {
			AdapterError::Http(_) | AdapterError::HttpStatus { .. } | AdapterError::Timeout { .. } => {
				AdapterFailureKind::ProviderUnavailable
			},
			AdapterError::PairDisabled { .. } => AdapterFailureKind::PairDisabled,
			AdapterError::InvalidResponse { .. }
			| AdapterError::UnsupportedOperation { .. }
			| AdapterError::InvalidConfiguration { .. }
			| AdapterError::Serialization(_) => AdapterFailureKind::InvalidResponse,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_failure_kind_classification() {
		assert_eq!(
			AdapterError::Timeout { timeout_ms: 2_000 }.failure_kind(),
			AdapterFailureKind::ProviderUnavailable
		);
		assert_eq!(
			AdapterError::http_status(503, "upstream down").failure_kind(),
			AdapterFailureKind::ProviderUnavailable
		);
		assert_eq!(
			AdapterError::pair_disabled("btc_btc/xmr_xmr", "pair delisted").failure_kind(),
			AdapterFailureKind::PairDisabled
		);
		assert_eq!(
			AdapterError::invalid_response("missing routes field").failure_kind(),
			AdapterFailureKind::InvalidResponse
		);
		assert_eq!(
			AdapterError::unsupported("thorswap", "get_swap_status").failure_kind(),
			AdapterFailureKind::InvalidResponse
		);
	}

	#[test]
	fn test_status_code_extraction() {
		assert_eq!(
			AdapterError::http_status(429, "rate limited").status_code(),
			Some(429)
		);
		assert_eq!(AdapterError::Timeout { timeout_ms: 100 }.status_code(), None);
	}

	#[test]
	fn test_error_messages() {
		let err = AdapterError::pair_disabled("usdc_eth/xmr_xmr", "asset under maintenance");
		assert_eq!(
			err.to_string(),
			"Pair usdc_eth/xmr_xmr not traded: asset under maintenance"
		);
	}
}
