//! Swapflow Configuration
//!
//! Configuration management and startup utilities for the Swapflow engine.

pub mod configurable_value;
pub mod loader;
pub mod settings;
pub mod startup_logger;

pub use configurable_value::{ConfigurableValue, ConfigurableValueError, ValueType};
pub use loader::load_config;
pub use settings::{
	CheckoutSettings, ConfigValidationError, CredentialSettings, EnvironmentProfile,
	EnvironmentSettings, HardwareSettings, LogFormat, LoggingSettings, ProviderSettings, Settings,
	TimeoutSettings,
};
pub use startup_logger::{log_service_info, log_service_shutdown, log_startup_complete};
