//! Configuration settings structures

use crate::configurable_value::{ConfigurableValue, ConfigurableValueError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use swapflow_types::constants::{
	DEFAULT_EXPIRY_WINDOW_SECS, DEFAULT_GLOBAL_TIMEOUT_MS, DEFAULT_HARDWARE_LISTEN_TIMEOUT_MS,
	DEFAULT_HARDWARE_OPEN_TIMEOUT_MS, DEFAULT_PREFERRED_TICKERS, DEFAULT_PROVIDER_TIMEOUT_MS,
	DEFAULT_REQUEST_TIMEOUT_MS, DEFAULT_SLIPPAGE_PERCENT, HARDWARE_RECONNECT_ATTEMPTS,
	MAX_PROVIDER_RETRIES, MAX_PROVIDER_TIMEOUT_MS, MIN_PROVIDER_TIMEOUT_MS,
};
use swapflow_types::{ApiCredentials, ProviderState};

/// Main application settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
	/// Swap providers keyed by provider id
	pub providers: HashMap<String, ProviderSettings>,
	pub timeouts: TimeoutSettings,
	pub checkout: CheckoutSettings,
	pub hardware: HardwareSettings,
	pub environment: EnvironmentSettings,
	pub logging: LoggingSettings,
}

/// Individual provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderSettings {
	/// Which registered adapter talks to this provider
	pub adapter_id: String,
	pub endpoint: String,
	/// Credentials for authenticated providers
	///
	/// Example configurations:
	/// - Environment variable: `{"type": "env", "value": "CHANGELLY_API_KEY"}`
	/// - Plain value: `{"type": "plain", "value": "your-key-here"}`
	pub api_credentials: Option<CredentialSettings>,
	pub timeout_ms: Option<u64>,
	pub max_retries: Option<u32>,
	pub headers: Option<HashMap<String, String>>,
	pub enabled: bool,
	// Optional descriptive metadata
	pub name: Option<String>,
	pub description: Option<String>,
}

/// API key material for one provider
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CredentialSettings {
	pub api_key: ConfigurableValue,
	pub api_secret: Option<ConfigurableValue>,
}

/// Timeout configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TimeoutSettings {
	/// Per-provider timeout in milliseconds within a fan-out round
	pub per_provider_ms: u64,
	/// Global fan-out timeout in milliseconds
	pub global_ms: u64,
	/// Request timeout for HTTP clients
	pub request_ms: u64,
}

/// Checkout session defaults
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CheckoutSettings {
	/// Expiry window in seconds applied when a provider quotes none
	pub default_expiry_secs: u64,
	pub default_slippage_percent: f64,
	/// Tickers pinned to the top of aggregated currency lists
	pub preferred_coins: Vec<String>,
}

/// Hardware signing device configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HardwareSettings {
	pub open_timeout_ms: u64,
	pub listen_timeout_ms: u64,
	pub reconnect_attempts: u32,
}

/// Environment-specific settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EnvironmentSettings {
	pub profile: EnvironmentProfile,
	pub debug: bool,
}

/// Environment profiles
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentProfile {
	Development,
	Staging,
	Production,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LoggingSettings {
	pub level: String,
	pub format: LogFormat,
	pub structured: bool,
}

/// Log format options
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Json,
	Pretty,
	Compact,
}

/// Validation errors raised while converting settings into runtime state
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
	#[error("Provider '{provider_id}': {field} must not be empty")]
	EmptyField {
		provider_id: String,
		field: &'static str,
	},

	#[error(
		"Provider '{provider_id}': timeout {timeout_ms}ms outside {}-{}ms",
		MIN_PROVIDER_TIMEOUT_MS,
		MAX_PROVIDER_TIMEOUT_MS
	)]
	TimeoutOutOfRange { provider_id: String, timeout_ms: u64 },

	#[error("Provider '{provider_id}': max_retries {max_retries} exceeds {}", MAX_PROVIDER_RETRIES)]
	RetriesOutOfRange {
		provider_id: String,
		max_retries: u32,
	},

	#[error("Provider '{provider_id}': credential resolution failed")]
	Credential {
		provider_id: String,
		#[source]
		source: ConfigurableValueError,
	},
}

impl ProviderSettings {
	/// Validate this entry and convert it into a runtime provider state.
	///
	/// Credentials resolve here, so a missing environment variable surfaces
	/// at startup rather than on the first authenticated request.
	pub fn to_provider_state(
		&self,
		provider_id: &str,
	) -> Result<ProviderState, ConfigValidationError> {
		self.validate(provider_id)?;

		let mut provider = ProviderState::new(provider_id, &self.adapter_id, &self.endpoint)
			.with_enabled(self.enabled);

		if let Some(timeout_ms) = self.timeout_ms {
			provider = provider.with_timeout_ms(timeout_ms);
		}
		if let Some(max_retries) = self.max_retries {
			provider = provider.with_max_retries(max_retries);
		}
		if let Some(headers) = &self.headers {
			provider = provider.with_headers(headers.clone());
		}
		if let Some(credentials) = &self.api_credentials {
			let api_key = credentials.api_key.resolve_for_secret().map_err(|source| {
				ConfigValidationError::Credential {
					provider_id: provider_id.to_string(),
					source,
				}
			})?;
			let mut api = ApiCredentials::new(api_key.expose_secret());
			if let Some(secret) = &credentials.api_secret {
				let api_secret = secret.resolve_for_secret().map_err(|source| {
					ConfigValidationError::Credential {
						provider_id: provider_id.to_string(),
						source,
					}
				})?;
				api = api.with_secret(api_secret.expose_secret());
			}
			provider = provider.with_credentials(api);
		}

		Ok(provider)
	}

	fn validate(&self, provider_id: &str) -> Result<(), ConfigValidationError> {
		if self.adapter_id.trim().is_empty() {
			return Err(ConfigValidationError::EmptyField {
				provider_id: provider_id.to_string(),
				field: "adapter_id",
			});
		}
		if self.endpoint.trim().is_empty() {
			return Err(ConfigValidationError::EmptyField {
				provider_id: provider_id.to_string(),
				field: "endpoint",
			});
		}
		if let Some(timeout_ms) = self.timeout_ms {
			if !(MIN_PROVIDER_TIMEOUT_MS..=MAX_PROVIDER_TIMEOUT_MS).contains(&timeout_ms) {
				return Err(ConfigValidationError::TimeoutOutOfRange {
					provider_id: provider_id.to_string(),
					timeout_ms,
				});
			}
		}
		if let Some(max_retries) = self.max_retries {
			if max_retries > MAX_PROVIDER_RETRIES {
				return Err(ConfigValidationError::RetriesOutOfRange {
					provider_id: provider_id.to_string(),
					max_retries,
				});
			}
		}
		Ok(())
	}
}

impl Default for Settings {
	fn default() -> Self {
		let mut providers = HashMap::new();

		providers.insert(
			"changelly".to_string(),
			ProviderSettings {
				adapter_id: "changelly".to_string(),
				endpoint: "https://api.changelly.com".to_string(),
				api_credentials: Some(CredentialSettings {
					api_key: ConfigurableValue::from_env("CHANGELLY_API_KEY"),
					api_secret: Some(ConfigurableValue::from_env("CHANGELLY_API_SECRET")),
				}),
				timeout_ms: None,
				max_retries: None,
				headers: None,
				enabled: true,
				name: Some("Changelly".to_string()),
				description: Some("Fixed-rate cross-chain swaps".to_string()),
			},
		);

		providers.insert(
			"thorswap".to_string(),
			ProviderSettings {
				adapter_id: "thorswap".to_string(),
				endpoint: "https://api.thorswap.finance".to_string(),
				api_credentials: None,
				timeout_ms: None,
				max_retries: None,
				headers: None,
				enabled: true,
				name: Some("Thorswap".to_string()),
				description: Some("THORChain-routed swaps with on-chain deposits".to_string()),
			},
		);

		Self {
			providers,
			timeouts: TimeoutSettings {
				per_provider_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
				global_ms: DEFAULT_GLOBAL_TIMEOUT_MS,
				request_ms: DEFAULT_REQUEST_TIMEOUT_MS,
			},
			checkout: CheckoutSettings {
				default_expiry_secs: DEFAULT_EXPIRY_WINDOW_SECS,
				default_slippage_percent: DEFAULT_SLIPPAGE_PERCENT,
				preferred_coins: DEFAULT_PREFERRED_TICKERS
					.iter()
					.map(|ticker| ticker.to_string())
					.collect(),
			},
			hardware: HardwareSettings {
				open_timeout_ms: DEFAULT_HARDWARE_OPEN_TIMEOUT_MS,
				listen_timeout_ms: DEFAULT_HARDWARE_LISTEN_TIMEOUT_MS,
				reconnect_attempts: HARDWARE_RECONNECT_ATTEMPTS,
			},
			environment: EnvironmentSettings {
				profile: EnvironmentProfile::Development,
				debug: true,
			},
			logging: LoggingSettings {
				level: "info".to_string(),
				format: LogFormat::Pretty,
				structured: false,
			},
		}
	}
}

impl Settings {
	/// Structural validation of every provider entry, enabled or not.
	/// Credential resolution is left to `to_provider_state`.
	pub fn validate(&self) -> Result<(), ConfigValidationError> {
		for (provider_id, provider) in &self.providers {
			provider.validate(provider_id)?;
		}
		Ok(())
	}

	/// Get enabled providers only
	pub fn enabled_providers(&self) -> HashMap<String, ProviderSettings> {
		self.providers
			.iter()
			.filter(|(_, provider)| provider.enabled)
			.map(|(k, v)| (k.clone(), v.clone()))
			.collect()
	}

	/// Check if running in production
	pub fn is_production(&self) -> bool {
		self.environment.profile == EnvironmentProfile::Production
	}

	/// Check if debug mode is enabled
	pub fn is_debug(&self) -> bool {
		self.environment.debug && !self.is_production()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn provider(enabled: bool) -> ProviderSettings {
		ProviderSettings {
			adapter_id: "thorswap".to_string(),
			endpoint: "https://api.example.com".to_string(),
			api_credentials: None,
			timeout_ms: None,
			max_retries: None,
			headers: None,
			enabled,
			name: None,
			description: None,
		}
	}

	#[test]
	fn test_default_settings_are_valid() {
		let settings = Settings::default();

		assert!(settings.validate().is_ok());
		assert_eq!(settings.providers.len(), 2);
		assert!(settings.providers.contains_key("changelly"));
		assert!(settings.providers.contains_key("thorswap"));
		assert_eq!(settings.timeouts.per_provider_ms, DEFAULT_PROVIDER_TIMEOUT_MS);
		assert_eq!(settings.checkout.preferred_coins[0], "btc");
		assert!(!settings.is_production());
		assert!(settings.is_debug());
	}

	#[test]
	fn test_debug_is_off_in_production() {
		let mut settings = Settings::default();
		settings.environment.profile = EnvironmentProfile::Production;
		settings.environment.debug = true;

		assert!(!settings.is_debug());
	}

	#[test]
	fn test_enabled_providers_filters_disabled() {
		let mut settings = Settings::default();
		settings
			.providers
			.insert("disabled-one".to_string(), provider(false));

		let enabled = settings.enabled_providers();
		assert_eq!(enabled.len(), 2);
		assert!(!enabled.contains_key("disabled-one"));
	}

	#[test]
	fn test_to_provider_state_applies_overrides() {
		let mut entry = provider(true);
		entry.timeout_ms = Some(1_500);
		entry.max_retries = Some(2);
		entry.api_credentials = Some(CredentialSettings {
			api_key: ConfigurableValue::from_plain("test-key"),
			api_secret: Some(ConfigurableValue::from_plain("test-secret")),
		});

		let state = entry.to_provider_state("thorswap-main").unwrap();
		assert_eq!(state.provider_id, "thorswap-main");
		assert_eq!(state.adapter_id, "thorswap");
		assert_eq!(state.timeout_ms, 1_500);
		assert_eq!(state.max_retries, 2);
		assert!(state.is_active());

		let credentials = state.credentials.unwrap();
		assert_eq!(credentials.api_key, "test-key");
		assert_eq!(credentials.api_secret.as_deref(), Some("test-secret"));
	}

	#[test]
	fn test_empty_endpoint_rejected() {
		let mut entry = provider(true);
		entry.endpoint = "  ".to_string();

		let err = entry.to_provider_state("p1").unwrap_err();
		assert!(matches!(
			err,
			ConfigValidationError::EmptyField {
				field: "endpoint",
				..
			}
		));
	}

	#[test]
	fn test_timeout_out_of_range_rejected() {
		let mut entry = provider(true);
		entry.timeout_ms = Some(50);

		let err = entry.to_provider_state("p1").unwrap_err();
		assert!(matches!(
			err,
			ConfigValidationError::TimeoutOutOfRange { timeout_ms: 50, .. }
		));
	}

	#[test]
	fn test_missing_credential_env_surfaces_at_conversion() {
		let mut entry = provider(true);
		entry.api_credentials = Some(CredentialSettings {
			api_key: ConfigurableValue::from_env("SWAPFLOW_TEST_SETTINGS_MISSING_KEY"),
			api_secret: None,
		});

		let err = entry.to_provider_state("p1").unwrap_err();
		assert!(matches!(err, ConfigValidationError::Credential { .. }));
	}

	#[test]
	fn test_profile_serde_is_lowercase() {
		let json = serde_json::to_string(&EnvironmentProfile::Production).unwrap();
		assert_eq!(json, "\"production\"");

		let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
		assert_eq!(format, LogFormat::Json);
	}
}
