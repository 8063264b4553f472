//! Route selection within a provider quote.
//!
//! A quote ships one or more routes, best first. Selection either honors an
//! explicit routing key or falls back to the provider's top pick; a quote
//! that cannot produce an executable route is rejected here, before any
//! transaction is built.

use swapflow_types::adapters::ProviderTxPayload;
use swapflow_types::quotes::{Quote, QuoteError, QuoteResult};
use swapflow_types::routes::{non_empty, Route};

/// Pick the route a checkout should execute.
///
/// With a routing key the match is exact (case-insensitive); without one the
/// first route wins, since providers order routes best-first.
pub fn select_route<'a>(quote: &'a Quote, preference: Option<&str>) -> QuoteResult<&'a Route> {
	if quote.routes.is_empty() {
		return Err(QuoteError::unusable("quote carries no routes"));
	}

	match preference {
		Some(key) => quote
			.routes
			.iter()
			.find(|route| route.routing_key.eq_ignore_ascii_case(key))
			.ok_or_else(|| {
				QuoteError::unusable(format!("no route matches routing key {}", key))
			}),
		None => Ok(&quote.routes[0]),
	}
}

/// Resolve the address the swap transaction must pay into.
///
/// The payload's payin address wins when the provider issued one at
/// transaction-creation time; otherwise the route's own destination is used.
/// A route with neither cannot be executed.
pub fn resolve_destination(
	route: &Route,
	payload: Option<&ProviderTxPayload>,
) -> QuoteResult<String> {
	if let Some(payload) = payload {
		if let Some(address) = non_empty(Some(payload.payin_address.as_str())) {
			return Ok(address);
		}
	}

	non_empty(route.destination.as_deref()).ok_or_else(|| {
		QuoteError::unusable(format!(
			"route {} carries no destination address",
			route.routing_key
		))
	})
}
