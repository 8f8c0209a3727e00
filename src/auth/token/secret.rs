//! Redacting wrapper for access, refresh, and OAuth1 token secrets.

// self
use crate::_prelude::*;

/// Token secret that keeps sensitive material out of `Debug`/`Display` output.
///
/// Serialization is transparent so host hooks can persist or forward the raw value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Returns true when the provider handed back an empty value.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl From<String> for TokenSecret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn secret_serializes_as_plain_string() {
		let secret: TokenSecret = serde_json::from_str("\"raw-token\"")
			.expect("Secret should deserialize from a string.");

		assert_eq!(secret.expose(), "raw-token");
		assert_eq!(
			serde_json::to_string(&secret).expect("Secret should serialize."),
			"\"raw-token\""
		);
	}
}
