//! HTTP client cache for optimized connection management
//!
//! Provides per-provider client instances with connection pooling and
//! keep-alive optimization. Clients are cached by their full configuration
//! (endpoint, provider and headers) with a TTL so stale pools get rebuilt.

use dashmap::DashMap;
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::{Duration, Instant};
use swapflow_types::{AdapterError, AdapterResult, ProviderRuntimeConfig, SecretString};
use tracing::{debug, warn};

/// Configuration for creating optimized HTTP clients
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientConfig {
	/// Base endpoint for the provider
	pub base_url: String,
	/// Provider identifier for cache differentiation
	pub provider_id: String,
	/// Maximum number of idle connections per host
	pub max_idle_per_host: usize,
	/// Connection keep-alive timeout
	pub keep_alive_timeout_ms: u64,
	/// Additional headers (for auth, etc.)
	pub headers: Vec<(String, String)>,
}

impl From<&ProviderRuntimeConfig> for ClientConfig {
	fn from(provider_config: &ProviderRuntimeConfig) -> Self {
		let mut headers = vec![
			("User-Agent".to_string(), "Swapflow/1.0".to_string()),
			("Content-Type".to_string(), "application/json".to_string()),
		];

		if let Some(provider_headers) = &provider_config.headers {
			for (key, value) in provider_headers {
				headers.push((key.clone(), value.clone()));
			}
		}

		Self {
			base_url: provider_config.endpoint.clone(),
			provider_id: provider_config.provider_id.clone(),
			max_idle_per_host: 10,
			keep_alive_timeout_ms: 90_000,
			headers,
		}
	}
}

/// Authentication baked into a cached client.
///
/// Providers that sign each request body (Changelly's HMAC scheme) use
/// `None` here and attach their signature headers per request instead.
#[derive(Debug, Clone)]
pub enum AuthConfig {
	/// No client-level authentication
	None,
	/// Static API key sent in a custom header on every request
	ApiKey { header: String, key: SecretString },
}

impl AuthConfig {
	pub fn api_key(header: &str, key: &str) -> Self {
		Self::ApiKey {
			header: header.to_string(),
			key: SecretString::from(key),
		}
	}
}

/// Cached client with creation timestamp for TTL management
#[derive(Debug, Clone)]
struct CachedClient {
	client: Arc<Client>,
	created_at: Instant,
}

impl CachedClient {
	fn new(client: Client) -> Self {
		Self {
			client: Arc::new(client),
			created_at: Instant::now(),
		}
	}

	fn is_expired(&self, ttl: Duration) -> bool {
		self.created_at.elapsed() > ttl
	}
}

/// Thread-safe cache of HTTP clients keyed by provider configuration
#[derive(Clone, Debug)]
pub struct ClientCache {
	clients: Arc<DashMap<ClientConfig, CachedClient>>,
	ttl: Duration,
}

impl ClientCache {
	/// Create a new client cache with the default 30-minute TTL
	pub fn new() -> Self {
		Self {
			clients: Arc::new(DashMap::new()),
			ttl: Duration::from_secs(30 * 60),
		}
	}

	pub fn with_ttl(ttl: Duration) -> Self {
		Self {
			clients: Arc::new(DashMap::new()),
			ttl,
		}
	}

	/// Get or create an optimized client for the given configuration
	pub fn get_client(&self, config: &ClientConfig) -> AdapterResult<Arc<Client>> {
		// Atomic check and removal of an expired entry
		self.clients.remove_if(config, |_, cached| {
			let expired = cached.is_expired(self.ttl);
			if expired {
				warn!(
					"Client cache expired for {} (age: {:?}), will create new client",
					config.base_url,
					cached.created_at.elapsed()
				);
			}
			expired
		});

		if let Some(cached) = self.clients.get(config) {
			debug!(
				"Reusing cached client for {} (age: {:?})",
				config.base_url,
				cached.created_at.elapsed()
			);
			return Ok(cached.client.clone());
		}

		debug!("Creating new optimized client for {}", config.base_url);
		let cached = CachedClient::new(self.create_optimized_client(config)?);
		let client_arc = cached.client.clone();

		// Entry API so two tasks racing on the same key share one client
		use dashmap::mapref::entry::Entry;

		match self.clients.entry(config.clone()) {
			Entry::Occupied(entry) => {
				debug!(
					"Another task created client for {}, using existing",
					config.base_url
				);
				Ok(entry.get().client.clone())
			},
			Entry::Vacant(entry) => {
				entry.insert(cached);
				Ok(client_arc)
			},
		}
	}

	/// Get or create a client with authentication applied to its headers
	pub fn get_client_with_auth(
		&self,
		provider_config: &ProviderRuntimeConfig,
		auth_config: &AuthConfig,
	) -> AdapterResult<Arc<Client>> {
		let mut config = ClientConfig::from(provider_config);

		match auth_config {
			AuthConfig::None => {},
			AuthConfig::ApiKey { header, key } => {
				config
					.headers
					.push((header.clone(), key.expose_secret().to_string()));
			},
		}

		self.get_client(&config)
	}

	fn create_optimized_client(&self, config: &ClientConfig) -> AdapterResult<Client> {
		let mut builder = ClientBuilder::new()
			.pool_max_idle_per_host(config.max_idle_per_host)
			.pool_idle_timeout(Duration::from_millis(config.keep_alive_timeout_ms))
			.http2_keep_alive_timeout(Duration::from_millis(config.keep_alive_timeout_ms))
			.tcp_keepalive(Duration::from_secs(60));

		let mut header_map = reqwest::header::HeaderMap::new();
		for (key, value) in &config.headers {
			if let (Ok(header_name), Ok(header_value)) = (
				reqwest::header::HeaderName::from_bytes(key.as_bytes()),
				reqwest::header::HeaderValue::from_str(value),
			) {
				header_map.insert(header_name, header_value);
			}
		}
		builder = builder.default_headers(header_map);

		builder.build().map_err(AdapterError::Http)
	}

	/// Remove all expired clients, returning how many were dropped
	pub fn cleanup_expired(&self) -> usize {
		let mut removed = 0;

		self.clients.retain(|config, cached| {
			let expired = cached.is_expired(self.ttl);
			if expired {
				removed += 1;
				debug!(
					"Removed expired client for {} (age: {:?})",
					config.base_url,
					cached.created_at.elapsed()
				);
			}
			!expired
		});

		if removed > 0 {
			debug!("Cleaned up {} expired clients from cache", removed);
		}

		removed
	}

	pub fn clear(&self) {
		let count = self.clients.len();
		self.clients.clear();
		debug!("Cleared all {} clients from cache", count);
	}

	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	/// Convenience constructor for adapter implementations: a handle to the
	/// process-wide cache so every adapter shares one connection pool set.
	pub fn for_adapter() -> Self {
		global_client_cache().clone()
	}
}

impl Default for ClientCache {
	fn default() -> Self {
		Self::new()
	}
}

lazy_static::lazy_static! {
	static ref GLOBAL_CLIENT_CACHE: ClientCache = ClientCache::new();
}

/// Get the global client cache instance
pub fn global_client_cache() -> &'static ClientCache {
	&GLOBAL_CLIENT_CACHE
}
