//! Swapflow Service
//!
//! Orchestration logic for the swap engine: the settle-all provider fan-out,
//! the currency and limits aggregators over the shared provider directory,
//! route selection, transaction proposal building with gas resolution,
//! time-boxed checkout sessions and the signing coordinator.

pub mod checkout;
pub mod currencies;
pub mod directory;
pub mod fanout;
pub mod gas;
pub mod limits;
pub mod proposal;
pub mod routing;
pub mod signing;

pub use checkout::{CheckoutConfig, CheckoutService, CountdownSnapshot, SessionHandle};
pub use currencies::CurrencyAggregator;
pub use directory::{CurrencySnapshot, ProviderDirectory};
pub use fanout::{settle_all, FanoutConfig, ProviderFailure, ProviderOutcome};
pub use gas::resolve_gas_limit;
pub use limits::{LimitsAggregator, LimitsError};
pub use proposal::{BuildRequest, TransactionBuilder};
pub use routing::{resolve_destination, select_route};
pub use signing::{SigningConfig, SigningCoordinator, SigningError};
