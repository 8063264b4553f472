//! Swapflow Adapters
//!
//! Provider-specific adapters for the Swapflow orchestration engine. Each
//! adapter speaks one provider's wire protocol and normalizes it into the
//! shared quote/route/payload shapes; the registry hands out adapter
//! instances by id.

pub mod changelly_adapter;
pub mod client_cache;
pub mod thorswap_adapter;

pub use changelly_adapter::{ChangellyAdapter, CHANGELLY_FIXED_ROUTE};
pub use client_cache::{global_client_cache, AuthConfig, ClientCache, ClientConfig};
pub use swapflow_types::{AdapterError, AdapterRegistryError, AdapterResult, ExchangeAdapter};
pub use thorswap_adapter::ThorswapAdapter;

use std::collections::HashMap;
use std::sync::Arc;

/// Map a reqwest transport failure onto the adapter error surface.
///
/// Timeouts are split out from other transport failures so the aggregation
/// layer can account for them against the configured per-provider budget.
pub(crate) fn map_request_error(e: reqwest::Error, timeout_ms: u64) -> AdapterError {
	if e.is_timeout() {
		AdapterError::Timeout { timeout_ms }
	} else {
		AdapterError::Http(e)
	}
}

/// Validate a provider endpoint and normalize it for path joining.
///
/// An empty endpoint falls back to the adapter's default; anything that does
/// not parse as a URL is a configuration error, caught here rather than as a
/// garbled request downstream.
pub(crate) fn normalize_endpoint(endpoint: &str, default: &str) -> AdapterResult<String> {
	let raw = if endpoint.is_empty() { default } else { endpoint };
	let parsed = url::Url::parse(raw).map_err(|e| AdapterError::InvalidConfiguration {
		reason: format!("invalid endpoint {raw}: {e}"),
	})?;
	Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Registry of exchange adapters keyed by adapter id
///
/// Provider configurations reference adapters by id; the registry is the
/// single lookup point wiring those references to live adapter instances.
#[derive(Debug, Default)]
pub struct AdapterRegistry {
	adapters: HashMap<String, Arc<dyn ExchangeAdapter>>,
}

impl AdapterRegistry {
	/// Create an empty registry
	pub fn new() -> Self {
		Self {
			adapters: HashMap::new(),
		}
	}

	/// Create a registry preloaded with every built-in adapter
	pub fn with_defaults() -> Result<Self, AdapterRegistryError> {
		let mut registry = Self::new();
		registry.register(Arc::new(ThorswapAdapter::with_default_config()?))?;
		registry.register(Arc::new(ChangellyAdapter::with_default_config()?))?;
		Ok(registry)
	}

	/// Register an adapter, validating its descriptor first
	pub fn register(
		&mut self,
		adapter: Arc<dyn ExchangeAdapter>,
	) -> Result<(), AdapterRegistryError> {
		adapter.adapter_info().validate()?;

		let adapter_id = adapter.id().to_string();
		if self.adapters.contains_key(&adapter_id) {
			return Err(AdapterRegistryError::DuplicateAdapter { adapter_id });
		}

		self.adapters.insert(adapter_id, adapter);
		Ok(())
	}

	/// Look up an adapter by id
	pub fn get(&self, adapter_id: &str) -> Option<Arc<dyn ExchangeAdapter>> {
		self.adapters.get(adapter_id).cloned()
	}

	/// All registered adapter ids, sorted for stable output
	pub fn ids(&self) -> Vec<String> {
		let mut ids: Vec<String> = self.adapters.keys().cloned().collect();
		ids.sort();
		ids
	}

	pub fn len(&self) -> usize {
		self.adapters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.adapters.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use swapflow_types::Adapter;

	#[test]
	fn test_registry_with_defaults_carries_builtin_adapters() {
		let registry = AdapterRegistry::with_defaults().unwrap();
		assert_eq!(registry.ids(), vec!["changelly", "thorswap"]);
		assert!(registry.get("thorswap").is_some());
		assert!(registry.get("changelly").is_some());
		assert!(registry.get("unknown").is_none());
	}

	#[test]
	fn test_registry_rejects_duplicate_adapter_id() {
		let mut registry = AdapterRegistry::with_defaults().unwrap();
		let duplicate = ThorswapAdapter::with_default_config().unwrap();

		let err = registry.register(Arc::new(duplicate)).unwrap_err();
		assert!(matches!(
			err,
			AdapterRegistryError::DuplicateAdapter { ref adapter_id } if adapter_id == "thorswap"
		));
		assert_eq!(registry.len(), 2);
	}

	#[test]
	fn test_registry_rejects_invalid_descriptor() {
		let mut registry = AdapterRegistry::new();
		let invalid = ThorswapAdapter::new(Adapter::new("", "Nameless", "1.0.0")).unwrap();

		let err = registry.register(Arc::new(invalid)).unwrap_err();
		assert!(matches!(err, AdapterRegistryError::Validation(_)));
		assert!(registry.is_empty());
	}

	#[test]
	fn test_endpoint_normalization() {
		assert_eq!(
			normalize_endpoint("", "https://api.example.com").unwrap(),
			"https://api.example.com"
		);
		assert_eq!(
			normalize_endpoint("https://custom.example.com/v2/", "https://api.example.com").unwrap(),
			"https://custom.example.com/v2"
		);
		let err = normalize_endpoint("not a url", "https://api.example.com").unwrap_err();
		assert!(matches!(err, AdapterError::InvalidConfiguration { .. }));
	}
}
