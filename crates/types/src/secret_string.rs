//! Zeroizing wrapper for provider API secrets
//!
//! API keys and HMAC signing secrets travel through config, provider state
//! and adapter requests. `SecretString` keeps them out of logs (Debug,
//! Display and Serialize all redact) and wipes the backing memory on drop.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A string that redacts itself everywhere except [`expose_secret`] and
/// zeroizes its buffer when dropped.
///
/// [`expose_secret`]: SecretString::expose_secret
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
	value: String,
}

impl SecretString {
	pub fn new(secret: String) -> Self {
		Self { value: secret }
	}

	/// Borrow the raw secret. Call sites should hand the value straight to
	/// whatever needs it (a header, an HMAC key) and let the borrow end.
	pub fn expose_secret(&self) -> &str {
		&self.value
	}

	pub fn len(&self) -> usize {
		self.value.len()
	}

	pub fn is_empty(&self) -> bool {
		self.value.is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SecretString")
			.field("value", &"[REDACTED]")
			.finish()
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[REDACTED]")
	}
}

impl From<String> for SecretString {
	fn from(secret: String) -> Self {
		Self::new(secret)
	}
}

impl From<&str> for SecretString {
	fn from(secret: &str) -> Self {
		Self::new(secret.to_string())
	}
}

// Serialized form is always the redaction marker so a dumped Settings or
// ProviderState never carries live credentials.
impl Serialize for SecretString {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str("[REDACTED]")
	}
}

impl<'de> Deserialize<'de> for SecretString {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let secret = String::deserialize(deserializer)?;
		Ok(SecretString::new(secret))
	}
}

impl PartialEq for SecretString {
	fn eq(&self, other: &Self) -> bool {
		constant_time_eq(self.value.as_bytes(), other.value.as_bytes())
	}
}

impl Eq for SecretString {}

/// Comparison that does not short-circuit on the first differing byte
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
	if a.len() != b.len() {
		return false;
	}
	let mut diff = 0u8;
	for (x, y) in a.iter().zip(b.iter()) {
		diff |= x ^ y;
	}
	diff == 0
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_expose_returns_original_value() {
		let secret = SecretString::from("changelly-hmac-secret");
		assert_eq!(secret.expose_secret(), "changelly-hmac-secret");
		assert_eq!(secret.len(), 21);
		assert!(!secret.is_empty());
	}

	#[test]
	fn test_debug_and_display_redact() {
		let secret = SecretString::from("live-api-key");
		assert!(!format!("{:?}", secret).contains("live-api-key"));
		assert_eq!(format!("{}", secret), "[REDACTED]");
	}

	#[test]
	fn test_serialize_redacts_deserialize_keeps() {
		let secret = SecretString::from("api-key");
		assert_eq!(serde_json::to_string(&secret).unwrap(), "\"[REDACTED]\"");

		let parsed: SecretString = serde_json::from_str("\"from-config\"").unwrap();
		assert_eq!(parsed.expose_secret(), "from-config");
	}

	#[test]
	fn test_equality() {
		assert_eq!(SecretString::from("k1"), SecretString::from("k1"));
		assert_ne!(SecretString::from("k1"), SecretString::from("k2"));
		assert_ne!(SecretString::from("k1"), SecretString::from("k11"));
	}
}
