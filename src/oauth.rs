//! Token exchange client: serializes token requests, sends them, and normalizes responses.
//!
//! Every provider error shape is folded into one contract, checked in order:
//! transport failure ([`Error::Transport`]), HTTP status outside `200..300`
//! ([`Error::UnexpectedStatus`]), then a JSON body carrying an `error` field
//! ([`Error::ProviderToken`]), which covers providers that report failures with a 200.

pub use oauth2;

// crates.io
use serde::{Serializer, ser::SerializeMap};
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	auth::AccessTokenResult,
	error::ConfigError,
	http::{HttpRequest, HttpResponse, Method, Request, TokenHttpClient, header},
	provider::{BodyEncoding, ProviderDescriptor},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

const BODY_PREVIEW_LIMIT: usize = 256;

/// Ordered token request fields.
///
/// Field order is preserved in both encodings so request bodies are deterministic.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenPayload(Vec<(String, String)>);
impl TokenPayload {
	/// Authorization-code exchange payload.
	pub fn authorization_code(
		descriptor: &ProviderDescriptor,
		code: &str,
		redirect_uri: &Url,
	) -> Self {
		Self::default()
			.with("code", code)
			.with("redirect_uri", redirect_uri.as_str())
			.with("client_id", descriptor.client_id.as_str())
			.with("client_secret", descriptor.client_secret.expose())
			.with("grant_type", "authorization_code")
	}

	/// Refresh-token payload.
	pub fn refresh_token(descriptor: &ProviderDescriptor, refresh_token: &str) -> Self {
		Self::default()
			.with("refresh_token", refresh_token)
			.with("client_id", descriptor.client_id.as_str())
			.with("client_secret", descriptor.client_secret.expose())
			.with("grant_type", "refresh_token")
	}

	/// Appends one field.
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.push((key.into(), value.into()));

		self
	}

	/// Returns the value of the first field named `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
	}

	/// Serializes the payload for `encoding`.
	pub fn encode(&self, encoding: BodyEncoding) -> Result<Vec<u8>, ConfigError> {
		match encoding {
			BodyEncoding::Json => Ok(serde_json::to_vec(self)?),
			BodyEncoding::FormUrlencoded => {
				let mut form = url::form_urlencoded::Serializer::new(String::new());

				for (key, value) in &self.0 {
					form.append_pair(key, value);
				}

				Ok(form.finish().into_bytes())
			},
		}
	}
}
impl Serialize for TokenPayload {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		let mut map = serializer.serialize_map(Some(self.0.len()))?;

		for (key, value) in &self.0 {
			map.serialize_entry(key, value)?;
		}

		map.end()
	}
}

/// Client that performs outbound token and profile calls for every flow.
///
/// Cheap to clone; clones share the same transport.
#[derive(Clone)]
pub struct TokenExchangeClient {
	http_client: Arc<dyn TokenHttpClient>,
}
impl TokenExchangeClient {
	/// Wraps a transport.
	pub fn new(http_client: impl TokenHttpClient) -> Self {
		Self { http_client: Arc::new(http_client) }
	}

	/// Reuses an already shared transport.
	pub fn from_shared(http_client: Arc<dyn TokenHttpClient>) -> Self {
		Self { http_client }
	}

	/// Exchanges an authorization code at the descriptor's token endpoint.
	pub async fn exchange_code(
		&self,
		descriptor: &ProviderDescriptor,
		code: &str,
		redirect_uri: &Url,
	) -> Result<AccessTokenResult> {
		let payload = TokenPayload::authorization_code(descriptor, code, redirect_uri);

		self.exchange(&descriptor.endpoints.token, descriptor.encoding, &payload).await
	}

	/// Exchanges a refresh token at the descriptor's token endpoint.
	pub async fn refresh_token(
		&self,
		descriptor: &ProviderDescriptor,
		refresh_token: &str,
	) -> Result<AccessTokenResult> {
		let payload = TokenPayload::refresh_token(descriptor, refresh_token);

		self.exchange(&descriptor.endpoints.token, descriptor.encoding, &payload).await
	}

	/// Sends one token POST and normalizes the response.
	pub async fn exchange(
		&self,
		url: &Url,
		encoding: BodyEncoding,
		payload: &TokenPayload,
	) -> Result<AccessTokenResult> {
		let request = Request::builder()
			.method(Method::POST)
			.uri(url.as_str())
			.header(header::CONTENT_TYPE, encoding.content_type())
			.header(header::ACCEPT, "application/json")
			.body(payload.encode(encoding)?)
			.map_err(ConfigError::from)?;
		let response = self.send(request).await?;

		parse_token_response(&response)
	}

	/// Performs an authenticated GET and returns the JSON body.
	pub async fn fetch_json(&self, url: &Url, authorization: &str) -> Result<Value> {
		let request = Request::builder()
			.method(Method::GET)
			.uri(url.as_str())
			.header(header::AUTHORIZATION, authorization)
			.header(header::ACCEPT, "application/json")
			.body(Vec::new())
			.map_err(ConfigError::from)?;
		let response = self.send(request).await?;

		ensure_success(&response)?;

		let status = response.status().as_u16();
		let mut de = serde_json::Deserializer::from_slice(response.body());

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| Error::TokenResponseParse { source, status })
	}

	/// Sends a prepared request through the transport.
	pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
		Ok(self.http_client.execute(request).await?)
	}
}
#[cfg(feature = "reqwest")]
impl Default for TokenExchangeClient {
	fn default() -> Self {
		Self::new(ReqwestHttpClient::default())
	}
}
impl Debug for TokenExchangeClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("TokenExchangeClient(..)")
	}
}

/// Fails with [`Error::UnexpectedStatus`] unless the response status is in `200..300`.
pub fn ensure_success(response: &HttpResponse) -> Result<()> {
	let status = response.status();

	if status.is_success() {
		Ok(())
	} else {
		let body = body_preview(response.body());

		Err(Error::UnexpectedStatus { status: status.as_u16(), body })
	}
}

/// Normalizes a token endpoint response into an [`AccessTokenResult`].
pub fn parse_token_response(response: &HttpResponse) -> Result<AccessTokenResult> {
	ensure_success(response)?;

	let status = response.status().as_u16();
	let mut de = serde_json::Deserializer::from_slice(response.body());
	let value: Value = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| Error::TokenResponseParse { source, status })?;

	if let Some(error) = value.get("error").filter(|error| !error.is_null()) {
		let error = match error {
			Value::String(s) => s.clone(),
			other => other.to_string(),
		};
		let description =
			value.get("error_description").and_then(Value::as_str).map(str::to_owned);

		return Err(Error::ProviderToken { error, description });
	}

	serde_path_to_error::deserialize(value)
		.map_err(|source| Error::TokenResponseParse { source, status })
}

fn body_preview(body: &[u8]) -> Option<String> {
	if body.is_empty() {
		return None;
	}

	let text = String::from_utf8_lossy(body);

	if text.chars().count() <= BODY_PREVIEW_LIMIT {
		return Some(text.into_owned());
	}

	let mut buf = text.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	Some(buf)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::ProviderId, http::StatusCode};

	fn descriptor(encoding: BodyEncoding) -> ProviderDescriptor {
		ProviderDescriptor::builder(
			ProviderId::new("mock").expect("Provider fixture should be valid."),
		)
		.client_id("cid")
		.client_secret("secret")
		.authorization_endpoint(
			Url::parse("https://example.com/auth").expect("Authorization URL should parse."),
		)
		.token_endpoint(Url::parse("https://example.com/token").expect("Token URL should parse."))
		.encoding(encoding)
		.build()
		.expect("Descriptor fixture should build.")
	}

	fn response(status: u16, body: &str) -> HttpResponse {
		let mut response = HttpResponse::new(body.as_bytes().to_vec());

		*response.status_mut() =
			StatusCode::from_u16(status).expect("Status fixture should be valid.");

		response
	}

	#[test]
	fn form_payload_keeps_field_order() {
		let redirect = Url::parse("https://app.example.com/oauth/mock")
			.expect("Redirect URI should parse.");
		let payload = TokenPayload::authorization_code(
			&descriptor(BodyEncoding::FormUrlencoded),
			"abc",
			&redirect,
		);
		let body = payload
			.encode(BodyEncoding::FormUrlencoded)
			.expect("Form payload should serialize.");

		assert_eq!(
			String::from_utf8(body).expect("Form body should be UTF-8."),
			concat!(
				"code=abc&redirect_uri=https%3A%2F%2Fapp.example.com%2Foauth%2Fmock",
				"&client_id=cid&client_secret=secret&grant_type=authorization_code",
			)
		);
	}

	#[test]
	fn json_payload_is_compact() {
		let payload = TokenPayload::refresh_token(&descriptor(BodyEncoding::Json), "rt");
		let body = payload.encode(BodyEncoding::Json).expect("JSON payload should serialize.");

		assert_eq!(
			String::from_utf8(body).expect("JSON body should be UTF-8."),
			concat!(
				r#"{"refresh_token":"rt","client_id":"cid","#,
				r#""client_secret":"secret","grant_type":"refresh_token"}"#,
			)
		);
	}

	#[test]
	fn normalization_checks_status_before_error_field() {
		let err = parse_token_response(&response(401, r#"{"error":"invalid_client"}"#))
			.expect_err("Non-2xx responses must fail.");

		assert!(matches!(err, Error::UnexpectedStatus { status: 401, .. }));

		let err = parse_token_response(&response(200, r#"{"error":"invalid_grant"}"#))
			.expect_err("Error bodies must fail even with a 200.");

		assert!(matches!(err, Error::ProviderToken { ref error, .. } if error == "invalid_grant"));
	}

	#[test]
	fn malformed_success_bodies_report_parse_errors() {
		let err = parse_token_response(&response(200, "not json"))
			.expect_err("Non-JSON bodies must fail.");

		assert!(matches!(err, Error::TokenResponseParse { status: 200, .. }));

		let err = parse_token_response(&response(200, r#"{"access_token":42}"#))
			.expect_err("Wrongly typed fields must fail.");

		match err {
			Error::TokenResponseParse { source, .. } =>
				assert_eq!(source.path().to_string(), "access_token"),
			other => panic!("Unexpected error variant: {other:?}."),
		}
	}

	#[test]
	fn successful_bodies_become_token_results() {
		let tokens =
			parse_token_response(&response(200, r#"{"access_token":"at","refresh_token":"rt"}"#))
				.expect("Valid token bodies should parse.");

		assert_eq!(tokens.access_token.expose(), "at");
		assert_eq!(tokens.refresh_token.as_ref().map(|secret| secret.expose()), Some("rt"));
	}

	#[test]
	fn long_bodies_are_truncated_in_previews() {
		let preview = body_preview("x".repeat(BODY_PREVIEW_LIMIT + 10).as_bytes())
			.expect("Non-empty bodies should produce a preview.");

		assert_eq!(preview.chars().count(), BODY_PREVIEW_LIMIT + 1);
		assert!(body_preview(&[]).is_none());
	}
}
