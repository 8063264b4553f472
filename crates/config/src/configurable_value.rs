//! Values that resolve from the environment or from the config file directly

use serde::{Deserialize, Serialize};
use std::fmt;
use swapflow_types::SecretString;

/// Marker prefix carried by shipped placeholder values. Anything starting
/// with it is flagged at startup so it cannot reach production unnoticed.
const INSECURE_DEFAULT_MARKER: &str = "WARNING-INSECURE-DEFAULT";

/// A config value that is either an environment-variable reference or a
/// plain inline value
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConfigurableValue {
	#[serde(rename = "type")]
	pub value_type: ValueType,

	/// Environment variable name for `Env`, the literal value for `Plain`
	pub value: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
	Env,
	Plain,
}

impl ConfigurableValue {
	pub fn from_env(env_var_name: &str) -> Self {
		Self {
			value_type: ValueType::Env,
			value: env_var_name.to_string(),
		}
	}

	pub fn from_plain(plain_value: &str) -> Self {
		Self {
			value_type: ValueType::Plain,
			value: plain_value.to_string(),
		}
	}

	/// Resolve the actual value: environment lookup for `Env`, the stored
	/// value for `Plain`.
	pub fn resolve(&self) -> Result<String, ConfigurableValueError> {
		match self.value_type {
			ValueType::Env => std::env::var(&self.value).map_err(|_| {
				ConfigurableValueError::EnvironmentVariableNotFound(self.value.clone())
			}),
			ValueType::Plain => Ok(self.value.clone()),
		}
	}

	/// Resolve into a zeroizing wrapper for credential handling
	pub fn resolve_for_secret(&self) -> Result<SecretString, ConfigurableValueError> {
		Ok(SecretString::new(self.resolve()?))
	}

	/// Is this a shipped placeholder that was never overridden?
	pub fn is_insecure_default(&self) -> bool {
		self.value_type == ValueType::Plain && self.value.starts_with(INSECURE_DEFAULT_MARKER)
	}

	/// Loggable description that never leaks the value
	pub fn description(&self) -> String {
		match self.value_type {
			ValueType::Env => format!("environment variable '{}'", self.value),
			ValueType::Plain => {
				if self.is_insecure_default() {
					"insecure default value".to_string()
				} else {
					"configured plain value".to_string()
				}
			},
		}
	}
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurableValueError {
	#[error("Environment variable '{0}' not found")]
	EnvironmentVariableNotFound(String),
}

// Display never shows a plain value; logs only see the variable name or a
// redaction marker.
impl fmt::Display for ConfigurableValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.value_type {
			ValueType::Env => write!(f, "env:{}", self.value),
			ValueType::Plain => {
				if self.is_insecure_default() {
					write!(f, "plain:[INSECURE-DEFAULT]")
				} else {
					write!(f, "plain:[REDACTED]")
				}
			},
		}
	}
}

/// `"env:NAME"` strings in config shorthand an environment reference;
/// everything else is a plain value.
impl From<&str> for ConfigurableValue {
	fn from(value: &str) -> Self {
		if let Some(env_var) = value.strip_prefix("env:") {
			Self::from_env(env_var)
		} else {
			Self::from_plain(value)
		}
	}
}

impl From<String> for ConfigurableValue {
	fn from(value: String) -> Self {
		ConfigurableValue::from(value.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::env;

	#[test]
	fn test_plain_value_resolves_to_itself() {
		let config = ConfigurableValue::from_plain("test-secret");
		assert_eq!(config.value_type, ValueType::Plain);
		assert_eq!(config.resolve().unwrap(), "test-secret");
	}

	#[test]
	fn test_env_value_resolves_from_environment() {
		env::set_var("SWAPFLOW_TEST_CV_SECRET", "secret-from-env");

		let config = ConfigurableValue::from_env("SWAPFLOW_TEST_CV_SECRET");
		assert_eq!(config.resolve().unwrap(), "secret-from-env");

		env::remove_var("SWAPFLOW_TEST_CV_SECRET");
	}

	#[test]
	fn test_missing_env_value_errors() {
		let config = ConfigurableValue::from_env("SWAPFLOW_TEST_CV_NONEXISTENT");
		assert!(config.resolve().is_err());
	}

	#[test]
	fn test_env_prefix_shorthand() {
		let plain = ConfigurableValue::from("plain-value");
		assert_eq!(plain.value_type, ValueType::Plain);
		assert_eq!(plain.value, "plain-value");

		let env = ConfigurableValue::from("env:MY_SECRET");
		assert_eq!(env.value_type, ValueType::Env);
		assert_eq!(env.value, "MY_SECRET");
	}

	#[test]
	fn test_secret_resolution_wraps() {
		let config = ConfigurableValue::from_plain("test-secret");
		let secret = config.resolve_for_secret().unwrap();
		assert_eq!(secret.expose_secret(), "test-secret");
	}

	#[test]
	fn test_insecure_default_detection() {
		let insecure = ConfigurableValue::from_plain("WARNING-INSECURE-DEFAULT-demo-key");
		assert!(insecure.is_insecure_default());
		assert_eq!(insecure.description(), "insecure default value");

		let secure = ConfigurableValue::from_plain("configured-key");
		assert!(!secure.is_insecure_default());

		let env = ConfigurableValue::from_env("MY_SECRET");
		assert!(!env.is_insecure_default());
	}

	#[test]
	fn test_display_never_leaks_plain_values() {
		let plain = ConfigurableValue::from_plain("live-api-key");
		assert!(!plain.to_string().contains("live-api-key"));

		let env = ConfigurableValue::from_env("MY_SECRET");
		assert_eq!(env.to_string(), "env:MY_SECRET");
	}

	#[test]
	fn test_serde_shape() {
		let config = ConfigurableValue::from_env("MY_SECRET");

		let json = serde_json::to_string(&config).unwrap();
		assert!(json.contains("\"type\":\"env\""));
		assert!(json.contains("\"value\":\"MY_SECRET\""));

		let parsed: ConfigurableValue = serde_json::from_str(&json).unwrap();
		assert_eq!(parsed, config);
	}
}
