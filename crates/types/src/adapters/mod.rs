//! Adapter contract: descriptor, runtime config and the provider trait

use crate::providers::ProviderState;
use std::collections::HashMap;

pub mod errors;
pub mod models;
pub mod traits;

pub use errors::{AdapterError, AdapterFailureKind, AdapterRegistryError, AdapterValidationError};
pub use models::{BroadcastReport, ProviderTxPayload};
pub use traits::ExchangeAdapter;

/// Result types for adapter operations
pub type AdapterResult<T> = Result<T, AdapterError>;
pub type AdapterValidationResult<T> = Result<T, AdapterValidationError>;

/// Minimal runtime configuration handed to adapter calls.
///
/// Carries only what an adapter needs to reach one configured provider
/// instance, keeping adapters unaware of aggregator-side bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRuntimeConfig {
	/// Unique provider instance identifier
	pub provider_id: String,

	/// Base endpoint for the provider API
	pub endpoint: String,

	/// Timeout for requests in milliseconds
	pub timeout_ms: u64,

	/// Optional custom HTTP headers for requests
	pub headers: Option<HashMap<String, String>>,

	/// API key, when the provider requires one
	pub api_key: Option<String>,

	/// API secret for request signing, when the provider requires one
	pub api_secret: Option<String>,
}

impl ProviderRuntimeConfig {
	pub fn new(provider_id: &str, endpoint: &str, timeout_ms: u64) -> Self {
		Self {
			provider_id: provider_id.to_string(),
			endpoint: endpoint.to_string(),
			timeout_ms,
			headers: None,
			api_key: None,
			api_secret: None,
		}
	}

	pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
		self.headers = Some(headers);
		self
	}

	pub fn with_api_key(mut self, api_key: &str) -> Self {
		self.api_key = Some(api_key.to_string());
		self
	}

	pub fn with_api_secret(mut self, api_secret: &str) -> Self {
		self.api_secret = Some(api_secret.to_string());
		self
	}
}

impl From<&ProviderState> for ProviderRuntimeConfig {
	fn from(provider: &ProviderState) -> Self {
		Self {
			provider_id: provider.provider_id.clone(),
			endpoint: provider.endpoint.clone(),
			timeout_ms: provider.timeout_ms,
			headers: provider.headers.clone(),
			api_key: provider
				.credentials
				.as_ref()
				.map(|c| c.api_key.clone()),
			api_secret: provider
				.credentials
				.as_ref()
				.and_then(|c| c.api_secret.clone()),
		}
	}
}

/// Descriptor for one adapter implementation
#[derive(Debug, Clone, PartialEq)]
pub struct Adapter {
	/// Unique identifier for the adapter
	pub adapter_id: String,

	/// Human-readable name
	pub name: String,

	/// Description of the adapter
	pub description: Option<String>,

	/// Version of the adapter implementation
	pub version: String,
}

impl Adapter {
	pub fn new(adapter_id: &str, name: &str, version: &str) -> Self {
		Self {
			adapter_id: adapter_id.to_string(),
			name: name.to_string(),
			description: None,
			version: version.to_string(),
		}
	}

	pub fn with_description(mut self, description: &str) -> Self {
		self.description = Some(description.to_string());
		self
	}

	/// Validate the adapter descriptor
	pub fn validate(&self) -> AdapterValidationResult<()> {
		if self.adapter_id.is_empty() {
			return Err(AdapterValidationError::MissingRequiredField {
				field: "adapter_id".to_string(),
			});
		}

		if !self
			.adapter_id
			.chars()
			.all(|c| c.is_alphanumeric() || c == '-' || c == '_')
		{
			return Err(AdapterValidationError::InvalidAdapterId {
				adapter_id: self.adapter_id.clone(),
			});
		}

		if self.name.is_empty() {
			return Err(AdapterValidationError::MissingRequiredField {
				field: "name".to_string(),
			});
		}

		if self.version.is_empty() {
			return Err(AdapterValidationError::MissingRequiredField {
				field: "version".to_string(),
			});
		}

		if !is_valid_semver(&self.version) {
			return Err(AdapterValidationError::InvalidVersion {
				version: self.version.clone(),
			});
		}

		Ok(())
	}
}

/// Basic semver check: X.Y.Z where X, Y, Z are numbers
fn is_valid_semver(version: &str) -> bool {
	let parts: Vec<&str> = version.split('.').collect();
	if parts.len() != 3 {
		return false;
	}
	parts.iter().all(|part| part.parse::<u32>().is_ok())
}
