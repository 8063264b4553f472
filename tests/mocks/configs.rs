//! Configuration mocks and builders for tests

use std::collections::HashMap;

use swapflow::config::{
	CheckoutSettings, EnvironmentProfile, EnvironmentSettings, HardwareSettings, LogFormat,
	LoggingSettings, ProviderSettings, Settings, TimeoutSettings,
};

/// Configuration builders for tests
#[allow(dead_code)]
pub struct MockConfigs;

#[allow(dead_code)]
impl MockConfigs {
	/// Create minimal test settings: no live providers, short timeouts
	pub fn test_settings() -> Settings {
		Settings {
			providers: HashMap::new(), // Empty for testing
			timeouts: TimeoutSettings {
				per_provider_ms: 2000,
				global_ms: 5000,
				request_ms: 1000,
			},
			checkout: CheckoutSettings {
				default_expiry_secs: 600,
				default_slippage_percent: 1.5,
				preferred_coins: vec!["btc".to_string(), "eth".to_string()],
			},
			hardware: HardwareSettings {
				open_timeout_ms: 100,
				listen_timeout_ms: 100,
				reconnect_attempts: 2,
			},
			environment: EnvironmentSettings {
				profile: EnvironmentProfile::Development,
				debug: true,
			},
			logging: LoggingSettings {
				level: "debug".to_string(),
				format: LogFormat::Compact,
				structured: false,
			},
		}
	}

	/// Test settings with one provider entry wired to the given adapter
	pub fn test_settings_with_provider(provider_id: &str, adapter_id: &str) -> Settings {
		let mut settings = Self::test_settings();
		settings
			.providers
			.insert(provider_id.to_string(), Self::test_provider(adapter_id));
		settings
	}

	/// Create a test provider config
	pub fn test_provider(adapter_id: &str) -> ProviderSettings {
		ProviderSettings {
			adapter_id: adapter_id.to_string(),
			endpoint: "http://localhost:8080".to_string(),
			api_credentials: None,
			timeout_ms: Some(1000),
			max_retries: Some(1),
			headers: None,
			enabled: true,
			name: Some("Test Provider".to_string()),
			description: Some("Test provider for unit testing".to_string()),
		}
	}
}
