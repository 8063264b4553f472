//! Swapflow Engine
//!
//! A multi-provider swap orchestration engine: aggregated currency listings,
//! pair limits, provider quotes, time-boxed checkout sessions and signing
//! through software or hardware wallets.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

// Core domain types - the most commonly used types
pub use swapflow_types::{
	chrono,
	// External dependencies for convenience
	serde_json,
	// Core types
	Adapter,
	AdapterError,
	AdapterRegistryError,
	ApiCredentials,
	BroadcastReport,
	BroadcastedTx,
	BuildError,
	CheckoutSession,
	// Primary domain entities
	CoinKey,
	ExchangeAdapter,
	FeeBreakdown,
	// Hardware signing traits
	HardwareConnector,
	HardwareError,
	HardwareTransport,
	ProposalMetadata,
	ProviderRuntimeConfig,
	ProviderState,
	ProviderTxPayload,
	Quote,
	// Error types
	QuoteError,
	QuoteRequest,
	Route,
	SessionStatus,
	SwapCoin,
	SwapLimits,
	SwapRecord,
	SwapStatus,
	TransactionProposal,
	WalletError,
	// Wallet traits
	WalletProvider,
	WalletRef,
};

// Service layer
pub use swapflow_service::{
	CheckoutConfig, CheckoutService, CountdownSnapshot, CurrencyAggregator, CurrencySnapshot,
	FanoutConfig, LimitsAggregator, LimitsError, ProviderDirectory, SessionHandle, SigningConfig,
	SigningCoordinator, SigningError, TransactionBuilder,
};
use swapflow_service::{resolve_destination, select_route, BuildRequest};

// Storage layer
pub use swapflow_storage::MemoryStore;
pub use swapflow_types::{StorageError, StorageResult, SwapStorage};

// Adapters
pub use swapflow_adapters::{AdapterRegistry, AdapterResult, ChangellyAdapter, ThorswapAdapter};

// Config
pub use swapflow_config::{
	load_config, log_service_info, log_service_shutdown, log_startup_complete, Settings,
};

// Module aliases for backward compatibility
pub mod models {
	pub use swapflow_types::*;
}

pub mod storage {
	pub use swapflow_storage::*;
}

pub mod config {
	pub use swapflow_config::*;
}

pub mod adapters {
	pub use swapflow_adapters::*;
}

pub mod service {
	pub use swapflow_service::*;
}

pub mod mocks;

// Re-export external dependencies for examples
pub use async_trait;

/// Errors surfaced by the engine facade
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("no wallet provider configured")]
	MissingWallet,

	#[error("unknown provider '{provider_id}'")]
	UnknownProvider { provider_id: String },

	#[error("provider '{provider_id}' is not offering swaps right now")]
	NotOffering { provider_id: String },

	#[error("provider '{provider_id}' references unregistered adapter '{adapter_id}'")]
	AdapterMissing {
		provider_id: String,
		adapter_id: String,
	},

	#[error("unknown order '{order_id}'")]
	UnknownOrder { order_id: String },

	#[error(transparent)]
	Registry(#[from] AdapterRegistryError),

	#[error(transparent)]
	Quote(#[from] QuoteError),

	#[error(transparent)]
	Adapter(#[from] AdapterError),

	#[error(transparent)]
	Build(#[from] BuildError),

	#[error(transparent)]
	Limits(#[from] LimitsError),

	#[error(transparent)]
	Signing(#[from] SigningError),

	#[error(transparent)]
	Storage(#[from] StorageError),
}

/// Per-checkout knobs for [`SwapEngine::prepare_checkout`]
#[derive(Debug, Clone, Default)]
pub struct CheckoutOptions {
	/// Pin a specific route instead of taking the quote's best one
	pub routing_key: Option<String>,

	/// Sweep the source wallet instead of sending a fixed amount
	pub send_max: bool,
}

impl CheckoutOptions {
	pub fn with_routing_key(mut self, routing_key: &str) -> Self {
		self.routing_key = Some(routing_key.to_string());
		self
	}

	pub fn with_send_max(mut self) -> Self {
		self.send_max = true;
		self
	}
}

/// Builder pattern for configuring the swap engine
#[derive(Default)]
pub struct SwapEngineBuilder {
	settings: Option<Settings>,
	storage: Option<Arc<dyn SwapStorage>>,
	wallet: Option<Arc<dyn WalletProvider>>,
	adapters: Vec<Arc<dyn ExchangeAdapter>>,
	providers: Vec<ProviderState>,
}

impl SwapEngineBuilder {
	/// Create a new engine builder with default in-memory storage
	pub fn new() -> Self {
		Self::default()
	}

	/// Set custom settings
	pub fn with_settings(mut self, settings: Settings) -> Self {
		self.settings = Some(settings);
		self
	}

	/// Get the current settings
	pub fn settings(&self) -> Option<&Settings> {
		self.settings.as_ref()
	}

	/// Use a custom storage backend instead of the in-memory default
	pub fn with_storage<S>(mut self, storage: S) -> Self
	where
		S: SwapStorage + 'static,
	{
		self.storage = Some(Arc::new(storage));
		self
	}

	/// Set the wallet provider used for building, signing and broadcasting
	pub fn with_wallet<W>(mut self, wallet: W) -> Self
	where
		W: WalletProvider + 'static,
	{
		self.wallet = Some(Arc::new(wallet));
		self
	}

	/// Register a custom adapter on top of the built-in ones
	pub fn with_adapter(mut self, adapter: Arc<dyn ExchangeAdapter>) -> Self {
		self.adapters.push(adapter);
		self
	}

	/// Add a provider directly, bypassing settings
	///
	/// Providers added here win over a settings entry with the same id.
	pub fn with_provider(mut self, provider: ProviderState) -> Self {
		self.providers.push(provider);
		self
	}

	/// Resolve provider states from settings plus explicit `with_provider` calls.
	///
	/// A provider whose settings fail to convert (typically a missing
	/// credential environment variable) is skipped with a warning rather than
	/// failing the whole engine; the remaining providers still come up.
	fn provider_states(&self, settings: &Settings) -> Vec<ProviderState> {
		let mut states: HashMap<String, ProviderState> = HashMap::new();

		for (provider_id, provider_settings) in settings.enabled_providers() {
			match provider_settings.to_provider_state(&provider_id) {
				Ok(state) => {
					states.insert(state.provider_id.clone(), state);
				}
				Err(e) => {
					warn!("Skipping provider '{}': {}", provider_id, e);
				}
			}
		}

		for provider in &self.providers {
			states.insert(provider.provider_id.clone(), provider.clone());
		}

		states.into_values().collect()
	}

	/// Initialize tracing with configuration-based settings
	fn init_tracing_from_settings(&self, settings: &Settings) {
		use swapflow_config::LogFormat;

		// Create env filter using config level or environment variable
		let log_level = &settings.logging.level;
		let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

		// Initialize tracing with the configuration
		match settings.logging.format {
			LogFormat::Json => {
				let subscriber = tracing_subscriber::fmt().json().with_env_filter(env_filter);

				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).init();
				} else {
					subscriber.init();
				}
			}
			LogFormat::Pretty => {
				let subscriber = tracing_subscriber::fmt()
					.pretty()
					.with_env_filter(env_filter);

				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).init();
				} else {
					subscriber.init();
				}
			}
			LogFormat::Compact => {
				let subscriber = tracing_subscriber::fmt()
					.compact()
					.with_env_filter(env_filter);

				if settings.logging.structured {
					subscriber.with_target(true).with_thread_ids(true).init();
				} else {
					subscriber.init();
				}
			}
		}

		info!(
			"Logging configuration applied: level={}, format={:?}, structured={}",
			settings.logging.level, settings.logging.format, settings.logging.structured
		);
	}

	/// Assemble the engine from the configured pieces
	pub async fn build(self) -> Result<SwapEngine, EngineError> {
		let settings = self.settings.clone().unwrap_or_default();

		let wallet = self.wallet.clone().ok_or(EngineError::MissingWallet)?;

		let mut registry = AdapterRegistry::with_defaults()?;
		for adapter in &self.adapters {
			registry.register(Arc::clone(adapter))?;
		}
		let registry = Arc::new(registry);

		let storage = self
			.storage
			.clone()
			.unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn SwapStorage>);

		let states = self.provider_states(&settings);
		for state in &states {
			if registry.get(&state.adapter_id).is_none() {
				warn!(
					"Provider '{}' references unregistered adapter '{}'",
					state.provider_id, state.adapter_id
				);
			}
		}
		info!("Successfully initialized with {} provider(s)", states.len());

		let directory = Arc::new(ProviderDirectory::new(states));

		let fanout = FanoutConfig {
			per_provider_timeout_ms: settings.timeouts.per_provider_ms,
			global_timeout_ms: settings.timeouts.global_ms,
		};

		let currencies = CurrencyAggregator::new(Arc::clone(&directory), Arc::clone(&registry))
			.with_fanout_config(fanout)
			.with_preferred_tickers(settings.checkout.preferred_coins.clone());

		let limits = LimitsAggregator::new(Arc::clone(&directory), Arc::clone(&registry))
			.with_fanout_config(fanout);

		let tx_builder = TransactionBuilder::new(Arc::clone(&wallet));

		let checkout = CheckoutService::new(CheckoutConfig {
			default_expiry_secs: settings.checkout.default_expiry_secs,
		});

		let signing = SigningCoordinator::new(
			Arc::clone(&wallet),
			Arc::clone(&registry),
			Arc::clone(&directory),
			Arc::clone(&storage),
		)
		.with_config(SigningConfig {
			reconnect_attempts: settings.hardware.reconnect_attempts,
			open_timeout: Duration::from_millis(settings.hardware.open_timeout_ms),
			listen_timeout: Duration::from_millis(settings.hardware.listen_timeout_ms),
		});

		storage.start_background_tasks().await?;

		Ok(SwapEngine {
			directory,
			registry,
			currencies,
			limits,
			tx_builder,
			checkout,
			signing,
			storage,
			default_slippage: settings.checkout.default_slippage_percent,
		})
	}

	/// Start the complete engine with all defaults and setup
	///
	/// This method handles everything needed to run the engine, including:
	/// - Loading .env file
	/// - Loading configuration with defaults
	/// - Initializing tracing
	/// - Building the engine and starting storage background tasks
	pub async fn start(mut self) -> Result<SwapEngine, EngineError> {
		// Load .env file if it exists
		dotenvy::dotenv().ok();

		// Use provided settings or load from config with defaults
		let using_provided_settings = self.settings.is_some();
		let settings = match self.settings.take() {
			Some(settings) => settings,
			None => load_config().unwrap_or_default(),
		};

		// Initialize tracing with configuration-based settings
		self.init_tracing_from_settings(&settings);

		// Log comprehensive service startup information
		log_service_info();

		info!(
			"Using configuration: loaded from {}",
			if using_provided_settings {
				"provided settings"
			} else {
				"config file or defaults"
			}
		);
		info!(
			"Environment: {:?} (debug={})",
			settings.environment.profile,
			settings.is_debug()
		);

		// Log enabled providers
		let enabled_providers = settings.enabled_providers();
		info!("Enabled providers: {}", enabled_providers.len());
		for (id, provider) in &enabled_providers {
			info!(
				"  - {}: {} (adapter '{}')",
				id, provider.endpoint, provider.adapter_id
			);
		}

		self.settings = Some(settings);
		let engine = self.build().await?;

		// Log startup completion with comprehensive information
		log_startup_complete(engine.directory.len().await, engine.registry.len());

		Ok(engine)
	}
}

/// Facade over the aggregators, checkout and signing services.
///
/// One instance is built per process; every operation takes `&self` and the
/// engine is cheap to share behind an `Arc`.
pub struct SwapEngine {
	directory: Arc<ProviderDirectory>,
	registry: Arc<AdapterRegistry>,
	currencies: CurrencyAggregator,
	limits: LimitsAggregator,
	tx_builder: TransactionBuilder,
	checkout: CheckoutService,
	signing: SigningCoordinator,
	storage: Arc<dyn SwapStorage>,
	default_slippage: f64,
}

impl SwapEngine {
	/// Run a currency refresh round across all active providers
	pub async fn refresh_currencies(&self) -> CurrencySnapshot {
		self.currencies.refresh().await
	}

	/// Last published coin list, without triggering a new round
	pub async fn currencies(&self) -> CurrencySnapshot {
		self.directory.snapshot().await
	}

	/// Aggregate pair limits across the providers supporting the pair
	pub async fn pair_limits(
		&self,
		from: &CoinKey,
		to: &CoinKey,
	) -> Result<SwapLimits, EngineError> {
		Ok(self.limits.aggregate(from, to).await?)
	}

	/// Ask one provider for a quote.
	///
	/// The request's slippage is defaulted from settings when unset, so the
	/// quote and the later checkout see the same tolerance.
	pub async fn request_quote(
		&self,
		provider_id: &str,
		mut request: QuoteRequest,
	) -> Result<Quote, EngineError> {
		if request.slippage.is_none() {
			request.slippage = Some(self.default_slippage);
		}

		let provider =
			self.directory
				.get(provider_id)
				.await
				.ok_or_else(|| EngineError::UnknownProvider {
					provider_id: provider_id.to_string(),
				})?;
		if !provider.is_offering() {
			return Err(EngineError::NotOffering {
				provider_id: provider_id.to_string(),
			});
		}
		let adapter = self.adapter_for(&provider)?;

		let quote = adapter
			.get_quote(&request, &ProviderRuntimeConfig::from(&provider))
			.await?;
		if quote.is_empty() {
			return Err(QuoteError::unusable(format!(
				"provider {provider_id} returned no routes"
			))
			.into());
		}

		Ok(quote)
	}

	/// Turn a quote into a signable checkout session.
	///
	/// Fetches the provider's transaction payload for the selected route,
	/// builds a wallet proposal against it and opens a time-boxed session
	/// holding everything the signing step needs.
	pub async fn prepare_checkout(
		&self,
		wallet: WalletRef,
		mut request: QuoteRequest,
		quote: &Quote,
		options: CheckoutOptions,
	) -> Result<SessionHandle, EngineError> {
		if request.slippage.is_none() {
			request.slippage = Some(self.default_slippage);
		}

		let provider =
			self.directory
				.get(&quote.provider_id)
				.await
				.ok_or_else(|| EngineError::UnknownProvider {
					provider_id: quote.provider_id.clone(),
				})?;
		let adapter = self.adapter_for(&provider)?;

		let route = select_route(quote, options.routing_key.as_deref())?;
		let payload = adapter
			.build_transaction_payload(
				&request,
				quote,
				route,
				&ProviderRuntimeConfig::from(&provider),
			)
			.await?;
		let destination = resolve_destination(route, Some(&payload))?;

		// Deposit-style providers hand back their own order id with the
		// payin address; that id is what their status endpoint tracks.
		let tracking_id = payload
			.provider_order_id
			.clone()
			.unwrap_or_else(|| quote.quote_id.clone());
		let metadata = ProposalMetadata::new(&quote.provider_id, &tracking_id)
			.with_routing_key(&route.routing_key);

		let mut build = BuildRequest::new(wallet, request.amount, &destination, metadata);
		if options.send_max {
			build = build.with_send_max();
		}
		if let Some(extra_id) = payload.payin_extra_id.as_deref() {
			build = build.with_payin_extra_id(extra_id);
		}
		// Payload values win over route values; the payload is fresher.
		if let Some(calldata) = payload.calldata.as_deref().or_else(|| route.calldata()) {
			build = build.with_calldata(calldata);
		}
		if let Some(gas) = payload.gas.or_else(|| route.provider_gas()) {
			build = build.with_provider_gas(gas);
		}
		if let Some(limits) = provider.limits.clone() {
			build = build.with_limits(limits);
		}

		let proposal = self.tx_builder.build(build).await?;

		Ok(self.checkout.open(proposal, route.clone(), request, payload))
	}

	/// Sign and broadcast a checkout with the wallet's own keys
	pub async fn sign(&self, handle: &SessionHandle) -> Result<SwapRecord, EngineError> {
		Ok(self.signing.sign_direct(handle).await?)
	}

	/// Sign and broadcast a checkout through a hardware device
	pub async fn sign_with_hardware(
		&self,
		handle: &SessionHandle,
		connector: Arc<dyn HardwareConnector>,
	) -> Result<SwapRecord, EngineError> {
		Ok(self.signing.sign_with_hardware(handle, connector).await?)
	}

	/// All recorded swaps, newest first
	pub async fn swap_history(&self) -> Result<Vec<SwapRecord>, EngineError> {
		Ok(self.storage.list_records().await?)
	}

	/// Poll the provider for a swap's current status and persist changes.
	///
	/// Terminal records are returned as stored without hitting the provider.
	/// Status polling deliberately skips the `is_offering` gate: a provider
	/// sitting out a currency round must still answer for swaps in flight.
	pub async fn refresh_swap_status(&self, order_id: &str) -> Result<SwapStatus, EngineError> {
		let record = self
			.storage
			.get_record(order_id)
			.await?
			.ok_or_else(|| EngineError::UnknownOrder {
				order_id: order_id.to_string(),
			})?;

		if record.status.is_terminal() {
			return Ok(record.status);
		}

		let provider = self
			.directory
			.get(&record.provider_id)
			.await
			.ok_or_else(|| EngineError::UnknownProvider {
				provider_id: record.provider_id.clone(),
			})?;
		let adapter = self.adapter_for(&provider)?;

		let status = adapter
			.get_swap_status(&record.quote_id, &ProviderRuntimeConfig::from(&provider))
			.await?;

		if status != record.status {
			debug!(
				"Swap {} moved from {:?} to {:?}",
				order_id, record.status, status
			);
			self.storage.update_status(order_id, status).await?;
		}

		Ok(status)
	}

	/// Flip a provider's kill switch; returns false for unknown ids
	pub async fn set_provider_disabled(&self, provider_id: &str, disabled: bool) -> bool {
		self.directory.set_disabled(provider_id, disabled).await
	}

	/// Shared handle to the provider directory
	pub fn directory(&self) -> Arc<ProviderDirectory> {
		Arc::clone(&self.directory)
	}

	/// Shared handle to the record storage
	pub fn storage(&self) -> Arc<dyn SwapStorage> {
		Arc::clone(&self.storage)
	}

	/// Log the shutdown banner and close the storage backend
	pub async fn shutdown(&self) -> Result<(), EngineError> {
		log_service_shutdown();
		Ok(self.storage.close().await?)
	}

	fn adapter_for(&self, provider: &ProviderState) -> Result<Arc<dyn ExchangeAdapter>, EngineError> {
		self.registry
			.get(&provider.adapter_id)
			.ok_or_else(|| EngineError::AdapterMissing {
				provider_id: provider.provider_id.clone(),
				adapter_id: provider.adapter_id.clone(),
			})
	}
}
