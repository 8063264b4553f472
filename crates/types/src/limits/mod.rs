//! Trade limit bounds and the rules for combining them across providers

use serde::{Deserialize, Serialize};

/// Min/max tradable amount for a pair, in the *from*-asset display unit.
///
/// `None` means "no known limit" and is never the same thing as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SwapLimits {
	pub min_amount: Option<f64>,
	pub max_amount: Option<f64>,
}

impl SwapLimits {
	pub fn new(min_amount: Option<f64>, max_amount: Option<f64>) -> Self {
		Self {
			min_amount,
			max_amount,
		}
	}

	/// Combine per-provider limits into the aggregate bound.
	///
	/// A bound is defined only when every contributor defined it; the engine
	/// cannot claim a floor or ceiling some provider never stated. When all
	/// contributors agree a bound exists, the most permissive span wins:
	/// min of mins, max of maxes. The two bounds are combined independently.
	pub fn combine<I>(limits: I) -> Self
	where
		I: IntoIterator<Item = SwapLimits>,
	{
		let mut combined = SwapLimits::default();
		let mut first = true;

		for l in limits {
			if first {
				combined = l;
				first = false;
				continue;
			}
			combined.min_amount = match (combined.min_amount, l.min_amount) {
				(Some(a), Some(b)) => Some(a.min(b)),
				_ => None,
			};
			combined.max_amount = match (combined.max_amount, l.max_amount) {
				(Some(a), Some(b)) => Some(a.max(b)),
				_ => None,
			};
		}

		combined
	}

	/// Pre-flight validation of an entered amount against this bound.
	pub fn check_amount(&self, amount: f64) -> AmountCheck {
		if let Some(min) = self.min_amount {
			if amount < min {
				return AmountCheck::BelowMinimum { min };
			}
		}
		if let Some(max) = self.max_amount {
			if amount > max {
				return AmountCheck::AboveMaximum { max };
			}
		}
		AmountCheck::Ok
	}

	pub fn is_unbounded(&self) -> bool {
		self.min_amount.is_none() && self.max_amount.is_none()
	}
}

/// Outcome of validating an amount against a [`SwapLimits`] bound
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountCheck {
	Ok,
	BelowMinimum { min: f64 },
	AboveMaximum { max: f64 },
}

impl AmountCheck {
	pub fn is_ok(&self) -> bool {
		matches!(self, AmountCheck::Ok)
	}
}
