//! Gas-limit resolution for EVM token swaps.
//!
//! Three tiers, most specific first: a provider estimate (padded and
//! floored), a table of audited per-venue method costs keyed by the calldata
//! selector, and a generous default for anything unrecognized. Running out of
//! gas mid-swap strands funds in the router, so every tier rounds up.

use swapflow_types::constants::{
	DEFAULT_TOKEN_GAS_LIMIT, GAS_SAFETY_MULTIPLIER, MIN_TOKEN_GAS_LIMIT,
};
use tracing::debug;

/// Known method costs per venue family. The family is matched against the
/// route's routing key, the method against the calldata selector.
const KNOWN_METHOD_GAS: &[(&str, &str, u64)] = &[
	("THORCHAIN", "depositWithExpiry", 90_000),
	("UNISWAPV2", "swapExactTokensForTokens", 200_000),
	("UNISWAPV2", "swapExactETHForTokens", 180_000),
	("SUSHISWAP", "swapExactTokensForTokens", 200_000),
	("UNISWAPV3", "exactInputSingle", 220_000),
	("UNISWAPV3", "multicall", 350_000),
	("ZEROX", "transformERC20", 330_000),
	("ONEINCH", "swap", 300_000),
];

/// Gas limit for a token-swap transaction.
///
/// A provider estimate always wins, padded by the safety multiplier and
/// floored at the minimum token gas limit. Without one, the calldata
/// selector is looked up in the per-venue method table; an unknown method
/// falls through to the default limit.
pub fn resolve_gas_limit(routing_key: &str, provider_gas: Option<u64>, calldata: Option<&str>) -> u64 {
	if let Some(gas) = provider_gas {
		let padded = (gas as f64 * GAS_SAFETY_MULTIPLIER).ceil() as u64;
		return padded.max(MIN_TOKEN_GAS_LIMIT);
	}

	if let Some(method) = calldata.and_then(decode_selector) {
		let key = routing_key.to_uppercase();
		for (family, name, gas) in KNOWN_METHOD_GAS {
			if key.contains(family) && *name == method {
				debug!("Resolved gas for {} {} from the method table: {}", family, name, gas);
				return *gas;
			}
		}
	}

	DEFAULT_TOKEN_GAS_LIMIT
}

/// Map a calldata selector to the method it invokes
fn decode_selector(calldata: &str) -> Option<&'static str> {
	let data = calldata.trim();
	let data = data
		.strip_prefix("0x")
		.or_else(|| data.strip_prefix("0X"))
		.unwrap_or(data);
	let selector = data.get(..8)?.to_lowercase();

	match selector.as_str() {
		"38ed1739" => Some("swapExactTokensForTokens"),
		"7ff36ab5" => Some("swapExactETHForTokens"),
		"415565b0" => Some("transformERC20"),
		"44bc937b" => Some("depositWithExpiry"),
		"12aa3caf" => Some("swap"),
		"04e45aaf" => Some("exactInputSingle"),
		"5ae401dc" => Some("multicall"),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_provider_estimate_is_padded() {
		assert_eq!(resolve_gas_limit("UNISWAPV3", Some(100_000), None), 125_000);
	}

	#[test]
	fn test_padded_estimate_is_floored() {
		// 10_000 * 1.25 = 12_500, below the floor
		assert_eq!(resolve_gas_limit("UNISWAPV3", Some(10_000), None), 60_000);
		assert_eq!(resolve_gas_limit("UNISWAPV3", Some(0), None), 60_000);
	}

	#[test]
	fn test_selector_table_by_venue_family() {
		let deposit = "0x44bc937b000000000000000000000000000000aa";
		assert_eq!(resolve_gas_limit("THORCHAIN", None, Some(deposit)), 90_000);

		let exact_input = "0x04e45aaf000000000000000000000000000000aa";
		assert_eq!(resolve_gas_limit("UNISWAPV3", None, Some(exact_input)), 220_000);

		// Multi-hop key matches whichever family row carries the method
		assert_eq!(
			resolve_gas_limit("THORCHAIN_UNISWAPV3", None, Some(exact_input)),
			220_000
		);
	}

	#[test]
	fn test_known_method_on_unknown_venue_uses_default() {
		let swap_tokens = "0x38ed1739000000000000000000000000000000aa";
		assert_eq!(
			resolve_gas_limit("PANCAKESWAP", None, Some(swap_tokens)),
			DEFAULT_TOKEN_GAS_LIMIT
		);
	}

	#[test]
	fn test_unknown_selector_uses_default() {
		assert_eq!(
			resolve_gas_limit("UNISWAPV3", None, Some("0xdeadbeef00")),
			DEFAULT_TOKEN_GAS_LIMIT
		);
		assert_eq!(resolve_gas_limit("UNISWAPV3", None, None), DEFAULT_TOKEN_GAS_LIMIT);
	}

	#[test]
	fn test_selector_parsing_is_prefix_and_case_tolerant() {
		assert_eq!(decode_selector("38ED1739aabbcc"), Some("swapExactTokensForTokens"));
		assert_eq!(decode_selector("0X7FF36AB5aabbcc"), Some("swapExactETHForTokens"));
		assert_eq!(decode_selector("0x44bc"), None);
	}
}
