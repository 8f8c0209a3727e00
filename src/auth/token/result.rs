//! Normalized token payload handed to the host's link hook.

// crates.io
use serde::{Deserializer, de::Error as DeError};
use serde_json::Value;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Tokens issued by a provider after a successful exchange.
///
/// Only constructed once the response status has been validated. Fields that are not part of
/// the common OAuth shape are kept in [`extra`](Self::extra).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenResult {
	/// Credential used against the provider's protected resources.
	pub access_token: TokenSecret,
	/// Credential that mints new access tokens without re-authorization.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub refresh_token: Option<TokenSecret>,
	/// OAuth1 token secret paired with [`access_token`](Self::access_token).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub secret_token: Option<TokenSecret>,
	/// Token type reported by the provider (usually `bearer`).
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub token_type: Option<String>,
	/// Lifetime of the access token in seconds.
	#[serde(
		default,
		deserialize_with = "deserialize_expires_in",
		skip_serializing_if = "Option::is_none"
	)]
	pub expires_in: Option<u64>,
	/// Scope string granted by the provider, when echoed.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scope: Option<String>,
	/// State recovered from the OAuth1 temporary credential, for hosts that verify it.
	#[serde(skip)]
	pub state: Option<String>,
	/// Provider-specific extension fields.
	#[serde(flatten)]
	pub extra: BTreeMap<String, Value>,
}
impl AccessTokenResult {
	/// Creates a result carrying only an access token.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: None,
			secret_token: None,
			token_type: None,
			expires_in: None,
			scope: None,
			state: None,
			extra: BTreeMap::new(),
		}
	}

	/// Attaches a refresh token.
	pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(refresh_token));

		self
	}

	/// Attaches an OAuth1 token secret.
	pub fn with_secret_token(mut self, secret_token: impl Into<String>) -> Self {
		self.secret_token = Some(TokenSecret::new(secret_token));

		self
	}

	/// Looks up a provider-specific extension field.
	pub fn extension(&self, key: &str) -> Option<&Value> {
		self.extra.get(key)
	}
}

fn deserialize_expires_in<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<Value>::deserialize(deserializer)? {
		None | Some(Value::Null) => Ok(None),
		Some(Value::Number(n)) =>
			n.as_u64().map(Some).ok_or_else(|| DeError::custom("expires_in must be non-negative")),
		Some(Value::String(s)) => s.trim().parse().map(Some).map_err(DeError::custom),
		Some(other) => Err(DeError::custom(format!("unsupported expires_in value: {other}"))),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn deserializes_standard_payload_with_extensions() {
		let payload = concat!(
			r#"{"access_token":"at","refresh_token":"rt","token_type":"bearer","#,
			r#""expires_in":"3600","id_token":"jwt"}"#,
		);
		let result: AccessTokenResult =
			serde_json::from_str(payload).expect("Token payload should deserialize.");

		assert_eq!(result.access_token.expose(), "at");
		assert_eq!(result.refresh_token.as_ref().map(TokenSecret::expose), Some("rt"));
		assert_eq!(result.expires_in, Some(3600));
		assert_eq!(result.extension("id_token"), Some(&Value::String("jwt".into())));
	}

	#[test]
	fn missing_access_token_is_rejected() {
		assert!(serde_json::from_str::<AccessTokenResult>(r#"{"refresh_token":"rt"}"#).is_err());
	}

	#[test]
	fn debug_output_redacts_secrets() {
		let result = AccessTokenResult::new("at").with_secret_token("oauth-secret");
		let rendered = format!("{result:?}");

		assert!(!rendered.contains("oauth-secret"));
		assert!(!rendered.contains("\"at\""));
	}
}
