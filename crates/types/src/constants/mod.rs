//! Global limits and defaults for configuration and runtime

/// Minimum allowed timeout for provider requests in milliseconds
pub const MIN_PROVIDER_TIMEOUT_MS: u64 = 100; // 100ms

/// Maximum allowed timeout for provider requests in milliseconds
pub const MAX_PROVIDER_TIMEOUT_MS: u64 = 30_000; // 30s

/// Default timeout for provider requests in milliseconds
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 2_000; // 2s

/// Default timeout for a whole aggregation round in milliseconds
pub const DEFAULT_GLOBAL_TIMEOUT_MS: u64 = 4_000; // 4s

/// Default timeout for a single HTTP request in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000; // 5s

/// Maximum allowed retry attempts for providers
pub const MAX_PROVIDER_RETRIES: u32 = 10;

/// Default maximum retry attempts for providers
pub const DEFAULT_PROVIDER_RETRIES: u32 = 3;

/// Default checkout window when a route carries no usable expiry, in seconds
pub const DEFAULT_EXPIRY_WINDOW_SECS: u64 = 600; // 10 minutes

/// Countdown tick resolution in milliseconds
pub const COUNTDOWN_TICK_MS: u64 = 1_000; // 1s

/// Default slippage applied when a quote request carries none, in percent
pub const DEFAULT_SLIPPAGE_PERCENT: f64 = 3.0;

/// Tickers pinned to the top of aggregated currency lists, in display order
pub const DEFAULT_PREFERRED_TICKERS: [&str; 7] =
	["btc", "bch", "eth", "doge", "ltc", "matic", "xrp"];

/// Safety multiplier applied to provider-supplied gas estimates
pub const GAS_SAFETY_MULTIPLIER: f64 = 1.25;

/// Lower bound for token-swap gas limits after scaling
pub const MIN_TOKEN_GAS_LIMIT: u64 = 60_000;

/// Conservative gas limit used when no estimate can be resolved
pub const DEFAULT_TOKEN_GAS_LIMIT: u64 = 350_000;

/// Reconnect attempts after a hardware transport drop
pub const HARDWARE_RECONNECT_ATTEMPTS: u32 = 2;

/// Timeout for opening a hardware transport in milliseconds
pub const DEFAULT_HARDWARE_OPEN_TIMEOUT_MS: u64 = 3_000; // 3s

/// Timeout for listening for a hardware device in milliseconds
pub const DEFAULT_HARDWARE_LISTEN_TIMEOUT_MS: u64 = 30_000; // 30s
