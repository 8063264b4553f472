//! Configuration loading utilities

use crate::Settings;
use config::{Config, ConfigError, Environment, File};

/// Load configuration from defaults, file, and environment.
///
/// Sources merge in order, later ones winning:
/// 1. Built-in `Settings::default()`
/// 2. Optional `config/config.{toml,yaml,json}` file
/// 3. `SWAPFLOW_`-prefixed environment variables, `__` separating nesting
///    (e.g. `SWAPFLOW_LOGGING__LEVEL=debug`)
pub fn load_config() -> Result<Settings, ConfigError> {
	let defaults = Config::try_from(&Settings::default())?;

	let merged = Config::builder()
		.add_source(defaults)
		.add_source(File::with_name("config/config").required(false))
		.add_source(
			Environment::with_prefix("SWAPFLOW")
				.prefix_separator("_")
				.separator("__"),
		)
		.build()?;

	merged.try_deserialize()
}
